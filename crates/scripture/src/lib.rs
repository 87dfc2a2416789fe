//! Immutable scripture index for canonical Gurbani retrieval.
//!
//! The index loads the corpus once (SGGS primary, Dasam Granth secondary)
//! and serves three operations for the whole pipeline run:
//! - fuzzy search by Gurmukhi text
//! - exact retrieval by line id
//! - shabad-context retrieval around a line
//!
//! All structures are read-only after load; concurrent readers share the
//! index through `Arc` without locks.

pub mod index;
pub mod normalize;
pub mod store;

pub use index::{ScriptureIndex, SearchHit};
pub use normalize::{normalize_gurmukhi_query, tokenize};

use thiserror::Error;

/// Scripture layer errors.
#[derive(Error, Debug)]
pub enum ScriptureError {
    #[error("scripture database not found: {path}")]
    NotFound { path: String },

    #[error("failed to open scripture database {path}: {reason}")]
    Open { path: String, reason: String },

    #[error("no usable lines table in {path} (tables: {tables:?})")]
    NoLinesTable { path: String, tables: Vec<String> },

    #[error("line not found: {0}")]
    LineNotFound(String),
}

impl From<ScriptureError> for katha_core::Error {
    fn from(err: ScriptureError) -> Self {
        match &err {
            ScriptureError::LineNotFound(id) => {
                katha_core::Error::QuoteMatch(format!("line not found: {id}"))
            }
            ScriptureError::NotFound { path }
            | ScriptureError::Open { path, .. }
            | ScriptureError::NoLinesTable { path, .. } => katha_core::Error::ScriptureUnavailable {
                path: path.clone(),
                reason: err.to_string(),
            },
        }
    }
}
