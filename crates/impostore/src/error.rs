//! Unified error type for Impostore.

use impostore_protocol::ProtocolError;
use impostore_session::SessionError;
use impostore_store::StoreError;
use impostore_words::WordsError;

/// Top-level error that wraps every crate-specific error.
///
/// The `#[from]` attributes let `?` convert sub-crate errors directly.
#[derive(Debug, thiserror::Error)]
pub enum ImpostoreError {
    /// Malformed id, room code or record.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Catalog or word-list provider failure.
    #[error(transparent)]
    Words(#[from] WordsError),

    /// Backend failure outside a coordinator call.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A lifecycle operation was refused or failed.
    #[error(transparent)]
    Session(#[from] SessionError),
}
