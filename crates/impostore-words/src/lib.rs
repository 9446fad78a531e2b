//! Secret-word catalog for Impostore.
//!
//! - [`WordCatalog`]: the active word → hint mapping, with per-catalog
//!   anti-repeat selection and a built-in default.
//! - [`WordListProvider`]: the hook for topic-specific word lists
//!   (typically a generative model behind an HTTP API).
//! - [`parse_word_list`]: turns a provider's raw JSON reply into a
//!   [`WordListOutcome`].
//!
//! The catalog is an owned value. Two coordinators (or two tests) never
//! share one unless they are handed the same instance.

mod catalog;
mod defaults;
mod error;
mod provider;

pub use catalog::{CatalogSource, WordCatalog, WordList};
pub use defaults::default_word_list;
pub use error::WordsError;
pub use provider::{CannedProvider, MAX_GENERATED_WORDS, WordListOutcome, WordListProvider, parse_word_list};
