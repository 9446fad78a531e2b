//! Error types for the session layer.

use impostore_protocol::{ParticipantId, ProtocolError, RoomCode};
use impostore_store::StoreError;

/// Errors returned by [`RoomCoordinator`](crate::RoomCoordinator)
/// operations.
///
/// A failed transition is never retried automatically; the room keeps
/// whatever state it had before the call.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The room does not exist (never created, deleted, or swept).
    #[error("room {0} not found")]
    RoomNotFound(RoomCode),

    /// The operation needs a waiting room but a round is in progress.
    #[error("room {0} has a round in progress")]
    GameInProgress(RoomCode),

    /// A round cannot start without at least one participant.
    #[error("no participants to assign roles to")]
    NoParticipants,

    /// The participant has no entry in the room.
    #[error("{0} is not in room {1}")]
    NotInRoom(ParticipantId, RoomCode),

    /// A setting is out of range (e.g. fewer than one impostor).
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Every generated room code collided with an existing room.
    #[error("room {0} already exists")]
    AlreadyExists(RoomCode),

    /// The word-list provider could not produce a list.
    #[error("word list provider unavailable: {0}")]
    WordProviderUnavailable(String),

    /// A record value could not be encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Any other backend fault.
    #[error(transparent)]
    Store(StoreError),
}

/// Lifts the store's addressing errors into first-class session errors so
/// callers match on one variant regardless of which layer noticed.
impl From<StoreError> for SessionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::RoomNotFound(code) => Self::RoomNotFound(code),
            StoreError::AlreadyExists(code) => Self::AlreadyExists(code),
            other => Self::Store(other),
        }
    }
}
