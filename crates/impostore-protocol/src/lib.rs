//! Room record model for Impostore.
//!
//! This crate defines the shape of the data that lives in the shared store:
//!
//! - **Types** ([`Room`], [`Player`], [`Role`], [`RoomStatus`], …): the
//!   persisted room record and its per-participant entries.
//! - **Identifiers** ([`RoomCode`], [`ParticipantId`]): validated newtypes.
//! - **Patches** ([`FieldPath`], [`RoomPatch`]): field-level, multi-path
//!   updates where `None` at a path means "remove".
//! - **Errors** ([`ProtocolError`]): what can go wrong while encoding,
//!   decoding or addressing a record.
//!
//! # Architecture
//!
//! ```text
//! Session (coordinator) → Protocol (Room, RoomPatch) → Store (record tree)
//! ```
//!
//! Nothing here performs I/O; it only knows how records are shaped and
//! addressed.

mod error;
mod ids;
mod patch;
mod types;

pub use error::ProtocolError;
pub use ids::{ParticipantId, RoomCode};
pub use patch::{FieldPath, RoomPatch, decode_room, encode_room, fields};
pub use types::{Player, Role, RoleCard, Room, RoomSettings, RoomStatus};
