//! Error types for the word catalog.

/// Errors raised while replacing or generating a catalog.
#[derive(Debug, thiserror::Error)]
pub enum WordsError {
    /// A catalog must hold at least one word, otherwise no round could
    /// ever be dealt.
    #[error("word catalog cannot be empty")]
    EmptyCatalog,

    /// The word-list provider failed or replied with something that is
    /// not a word → hint object. Not retried.
    #[error("word list provider unavailable: {0}")]
    ProviderUnavailable(String),
}
