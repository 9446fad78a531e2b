//! The active word catalog and its anti-repeat selection policy.

use std::collections::{BTreeMap, HashSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{WordListOutcome, WordsError, default_word_list};

/// Secret word → optional single-word hint.
pub type WordList = BTreeMap<String, Option<String>>;

/// Where the active catalog came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    /// The built-in list.
    Default,
    /// A list supplied by the host or generated for a topic.
    Custom,
}

/// The active catalog plus the words already dealt from it.
///
/// Words dealt since the last catalog change are not dealt again until
/// every word has been used; then the history is cleared and the whole
/// catalog becomes eligible again. `next_word` therefore never fails as
/// long as the catalog is non-empty, which every constructor and setter
/// guarantees.
pub struct WordCatalog {
    words: WordList,
    used: HashSet<String>,
    source: CatalogSource,
    rng: StdRng,
}

impl WordCatalog {
    /// The built-in catalog with an OS-seeded RNG.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// The built-in catalog with a deterministic RNG.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            words: default_word_list(),
            used: HashSet::new(),
            source: CatalogSource::Default,
            rng,
        }
    }

    /// Replaces the catalog wholesale and clears the history.
    ///
    /// # Errors
    /// [`WordsError::EmptyCatalog`] if `words` is empty; the active
    /// catalog is left untouched.
    pub fn set_catalog(&mut self, words: WordList) -> Result<(), WordsError> {
        if words.is_empty() {
            return Err(WordsError::EmptyCatalog);
        }
        tracing::info!(words = words.len(), "word catalog replaced");
        self.words = words;
        self.used.clear();
        self.source = CatalogSource::Custom;
        Ok(())
    }

    /// Restores the built-in catalog and clears the history.
    pub fn reset_to_default(&mut self) {
        self.words = default_word_list();
        self.used.clear();
        self.source = CatalogSource::Default;
        tracing::info!(words = self.words.len(), "word catalog reset to default");
    }

    /// Installs a provider result: a generated list replaces the catalog,
    /// a fallback (or an empty list) restores the default. Returns the
    /// resulting source.
    pub fn apply_outcome(&mut self, outcome: WordListOutcome) -> CatalogSource {
        match outcome {
            WordListOutcome::Generated(words) if !words.is_empty() => {
                tracing::info!(words = words.len(), "word catalog replaced");
                self.words = words;
                self.used.clear();
                self.source = CatalogSource::Custom;
            }
            _ => self.reset_to_default(),
        }
        self.source
    }

    /// Deals a word.
    ///
    /// Picks uniformly among words not dealt since the last reset and not
    /// equal to `exclude`. When none is left the history is cleared and
    /// the full catalog (still minus `exclude`) is used; `exclude` is only
    /// ignored when it is the catalog's sole word.
    pub fn next_word(&mut self, exclude: Option<&str>) -> String {
        let not_excluded = |word: &&String| Some(word.as_str()) != exclude;

        let mut pool: Vec<&String> = self
            .words
            .keys()
            .filter(|w| !self.used.contains(*w))
            .filter(not_excluded)
            .collect();

        if pool.is_empty() {
            tracing::debug!(words = self.words.len(), "word catalog exhausted, clearing history");
            self.used.clear();
            pool = self.words.keys().filter(not_excluded).collect();
        }
        if pool.is_empty() {
            pool = self.words.keys().collect();
        }

        let word = pool[self.rng.random_range(0..pool.len())].clone();
        self.used.insert(word.clone());
        word
    }

    /// Case-insensitive hint lookup.
    pub fn hint_for(&self, word: &str) -> Option<String> {
        let wanted = word.to_lowercase();
        self.words
            .iter()
            .find(|(w, _)| w.to_lowercase() == wanted)
            .and_then(|(_, hint)| hint.clone())
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains_key(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// How many words have been dealt since the last reset.
    pub fn used_count(&self) -> usize {
        self.used.len()
    }

    pub fn source(&self) -> CatalogSource {
        self.source
    }
}

impl Default for WordCatalog {
    fn default() -> Self {
        Self::new()
    }
}
