//! Error types for the protocol layer.
//!
//! Each crate in Impostore defines its own error enum. A `ProtocolError`
//! always means the problem is in the shape of a record or an identifier,
//! never in the store or the game rules.

/// Errors that can occur while encoding, decoding or addressing records.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Turning a model type into a record tree failed.
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// A record tree does not describe a valid room.
    ///
    /// Common causes: a required field (`status`, `hostId`) was removed
    /// by a patch, or a field holds a value of the wrong type.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A room code is not 6 characters of `A-Z0-9`.
    #[error("invalid room code: {0:?}")]
    InvalidRoomCode(String),

    /// A participant id is empty or contains a path-reserved character.
    #[error("invalid participant id: {0:?}")]
    InvalidParticipantId(String),

    /// A field path is empty, has an empty segment, or points inside a
    /// value that is not an object.
    #[error("invalid field path: {0}")]
    InvalidPath(String),
}
