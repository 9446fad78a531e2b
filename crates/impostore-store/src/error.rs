//! Error types for the store layer.

use impostore_protocol::{ProtocolError, RoomCode};

/// Errors a [`RoomStore`](crate::RoomStore) can report.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// `create` was called with a code that is already live.
    #[error("room {0} already exists")]
    AlreadyExists(RoomCode),

    /// The room is absent. Patches are never applied to absent rooms, so
    /// a late write cannot resurrect a deleted room as a partial record.
    #[error("room {0} not found")]
    RoomNotFound(RoomCode),

    /// A patch or record was malformed, or a patch would leave the room
    /// undecodable. Nothing was written.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The backend could not be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
