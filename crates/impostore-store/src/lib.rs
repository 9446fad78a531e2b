//! Shared room store boundary for Impostore.
//!
//! Every client of a game talks to the others only through a shared,
//! hosted key-value store. This crate is the seam to that store:
//!
//! - [`RoomStore`]: the operations the coordinator needs (create, read,
//!   atomic multi-path update, delete, subscribe, scan). Implement it for
//!   your hosted database.
//! - [`MemoryStore`]: an in-process implementation with the same
//!   semantics, for tests and single-device play.
//! - [`Subscription`]: a per-room stream of full snapshots.
//!
//! The store owns no game rules; it only knows records and paths.

#![allow(async_fn_in_trait)]

mod error;
mod memory;
mod store;
mod subscription;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use store::RoomStore;
pub use subscription::{RoomUpdate, Subscription};
