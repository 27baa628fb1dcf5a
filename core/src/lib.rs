//! Shared data model, index builder and query engine for a single-site
//! search engine.
//!
//! The crawler produces [`Document`]s, [`build_index`] turns them into an
//! immutable [`InvertedIndex`], and [`search`] answers ranked free-text
//! queries against it. [`IndexHandle`] lets a server swap in a rebuilt
//! index without disturbing readers.

pub mod builder;
pub mod handle;
pub mod index;
pub mod persist;
pub mod query;
pub mod tokenizer;

use thiserror::Error;

pub use builder::build_index;
pub use handle::IndexHandle;
pub use index::{DocId, Document, Field, InvertedIndex, Posting, TermId};
pub use query::{search, ScoredResult, DEFAULT_LIMIT};
pub use tokenizer::{tokenize, TokenizerConfig};

/// Failures that leave no index to serve.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("too many {what} for one index generation (limit {limit})")]
    Capacity { what: &'static str, limit: u32 },

    #[error("index I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("index encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("index metadata error: {0}")]
    Meta(#[from] serde_json::Error),

    #[error("unsupported index version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },
}

pub type Result<T> = std::result::Result<T, IndexError>;
