//! Core data types for the document question-answering engine.
//!
//! All of these are request-scoped: they are created fresh for one query and
//! discarded once the answer is returned. The engine keeps no state between
//! queries.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::errors::ApiError;

/// A contiguous slice of the source document used as a retrieval unit.
///
/// `start`/`end` are **character** offsets into the document, half-open.
/// Passages are produced in increasing start order and consecutive passages
/// overlap by the configured amount (the final one may be shorter).
#[derive(Debug, Clone, PartialEq)]
pub struct Passage {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// A passage paired with its similarity score and 1-based relevance rank.
#[derive(Debug, Clone)]
pub struct ScoredPassage {
    pub passage: Passage,
    pub score: f32,
    pub rank: usize,
}

/// A pointer from the answer back into the source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    pub text: String,
    pub start_index: usize,
    pub end_index: usize,
}

/// The generated answer plus its citations, most relevant first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub answer: String,
    pub citations: Vec<Citation>,
}

/// Engine tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Passage size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive passages in characters
    pub chunk_overlap: usize,
    /// Number of passages to retrieve
    pub top_k: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 5,
        }
    }
}

impl RagConfig {
    /// Read the `rag` section out of the loaded config, falling back to
    /// defaults for missing keys.
    pub fn from_config(config: &Value) -> Self {
        let defaults = Self::default();
        let section = config.get("rag");

        let read = |key: &str, fallback: usize| -> usize {
            section
                .and_then(|v| v.get(key))
                .and_then(|v| v.as_u64())
                .map(|v| v as usize)
                .unwrap_or(fallback)
        };

        Self {
            chunk_size: read("chunk_size", defaults.chunk_size),
            chunk_overlap: read("chunk_overlap", defaults.chunk_overlap),
            top_k: read("top_k", defaults.top_k),
        }
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.chunk_size == 0 {
            return Err(ApiError::InvalidConfiguration(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(ApiError::InvalidConfiguration(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(ApiError::InvalidConfiguration(
                "top_k must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
