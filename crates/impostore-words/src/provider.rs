//! Topic-specific word lists from an external provider.
//!
//! Impostore doesn't generate word lists itself. A provider (usually a
//! generative model behind an HTTP API) receives a free-text topic and
//! replies with a JSON object of `"word": "hint"` pairs. This module
//! defines the [`WordListProvider`] hook and the parser that turns the
//! raw reply into something the catalog can install.
//!
//! Providers are slow and fallible. They are only consulted between
//! rounds, to replace the catalog, never while a round is being dealt.

use std::future::Future;

use serde_json::Value;

use crate::{WordList, WordsError};

/// Upper bound on words taken from one generated list.
pub const MAX_GENERATED_WORDS: usize = 20;

/// What a provider produced for a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordListOutcome {
    /// A usable list.
    Generated(WordList),
    /// The provider understood the request but had nothing usable; the
    /// caller should fall back to the built-in catalog.
    Fallback,
}

/// Produces a word list for a topic.
///
/// # Trait bounds
///
/// `Send + Sync + 'static` so one provider can be shared by every task
/// of a host client.
pub trait WordListProvider: Send + Sync + 'static {
    /// Generates up to [`MAX_GENERATED_WORDS`] word → hint pairs.
    ///
    /// # Errors
    /// [`WordsError::ProviderUnavailable`] when the provider cannot be
    /// reached or replies with something unparsable.
    fn generate(
        &self,
        topic: &str,
    ) -> impl Future<Output = Result<WordListOutcome, WordsError>> + Send;
}

/// Parses a provider reply.
///
/// Models like to wrap JSON in Markdown fences, so ```` ```json ```` and
/// ```` ``` ```` markers are stripped first. Hints are cut to their first
/// word; blank hints become `None`; blank words are dropped. At most
/// [`MAX_GENERATED_WORDS`] are kept, taken in reply order. An empty
/// object means "topic not understood" and yields
/// [`WordListOutcome::Fallback`].
pub fn parse_word_list(reply: &str) -> Result<WordListOutcome, WordsError> {
    let cleaned = reply.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();

    let object: serde_json::Map<String, Value> = serde_json::from_str(cleaned)
        .map_err(|e| WordsError::ProviderUnavailable(format!("unparsable word list: {e}")))?;

    let words: WordList = object
        .into_iter()
        .filter_map(|(word, hint)| {
            let word = word.trim().to_string();
            if word.is_empty() {
                return None;
            }
            let hint = hint
                .as_str()
                .and_then(|h| h.split_whitespace().next())
                .map(str::to_string);
            Some((word, hint))
        })
        .take(MAX_GENERATED_WORDS)
        .collect();

    if words.is_empty() {
        tracing::info!("provider returned no words, falling back to default catalog");
        return Ok(WordListOutcome::Fallback);
    }
    Ok(WordListOutcome::Generated(words))
}

/// A provider that replays a fixed reply for every topic.
///
/// Useful offline, in demos, and in tests of the catalog-replacement flow.
#[derive(Debug, Clone)]
pub struct CannedProvider {
    reply: Result<String, String>,
}

impl CannedProvider {
    /// Always answers with `reply`, parsed by [`parse_word_list`].
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
        }
    }

    /// Always fails with [`WordsError::ProviderUnavailable`].
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            reply: Err(reason.into()),
        }
    }
}

impl WordListProvider for CannedProvider {
    async fn generate(&self, topic: &str) -> Result<WordListOutcome, WordsError> {
        tracing::debug!(topic, "canned provider asked for word list");
        match &self.reply {
            Ok(reply) => parse_word_list(reply),
            Err(reason) => Err(WordsError::ProviderUnavailable(reason.clone())),
        }
    }
}
