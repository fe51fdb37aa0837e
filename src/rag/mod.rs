//! Retrieval-augmented document question answering.
//!
//! Pipeline per query: segment the document into overlapping passages, embed
//! passages and question, rank passages by similarity, and generate a
//! context-grounded answer with citations back into the document.

pub mod composer;
pub mod engine;
pub mod retriever;
pub mod segmenter;
pub mod types;

pub use engine::RagEngine;
pub use types::{Answer, Citation, RagConfig};
