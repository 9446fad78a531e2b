//! Room lifecycle coordination for Impostore.
//!
//! This crate drives a room through its states on top of any
//! [`RoomStore`](impostore_store::RoomStore):
//!
//! 1. **Lifecycle** ([`RoomCoordinator`]): create, join, settings, start,
//!    end, reveal, heartbeat, sweep and delete.
//! 2. **Role assignment** ([`assign_roles`], [`select_first_player`]):
//!    pure functions over an injected RNG.
//! 3. **Time** ([`Clock`]): wall-clock milliseconds, swappable in tests.
//!
//! # How it fits in the stack
//!
//! ```text
//! Host / player clients (above)  ← call coordinator operations
//!     ↕
//! Session Layer (this crate)     ← validates transitions, builds patches
//!     ↕
//! Store Layer (below)            ← applies patches atomically, notifies
//! ```
//!
//! ```text
//!  create ──→ [waiting] ──start──→ [active] ──end──→ [waiting]
//!                 │                    │
//!                 └──── delete / sweep ┴──→ (deleted)
//! ```

mod clock;
mod config;
mod coordinator;
mod error;
mod roles;
mod settings;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::SessionConfig;
pub use coordinator::RoomCoordinator;
pub use error::SessionError;
pub use roles::{assign_roles, select_first_player};
pub use settings::SettingsUpdate;
