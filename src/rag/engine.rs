//! The query pipeline: segment, embed, retrieve, compose.

use std::sync::Arc;

use crate::core::errors::ApiError;
use crate::llm::{EmbeddingModel, GenerativeModel};

use super::composer;
use super::retriever::{self, DotProductScorer, Scorer};
use super::segmenter;
use super::types::{Answer, RagConfig};

/// Answers one question against one document. Holds only configuration and
/// collaborator handles; everything produced during a query is request-scoped.
pub struct RagEngine {
    config: RagConfig,
    embedder: Arc<dyn EmbeddingModel>,
    generator: Arc<dyn GenerativeModel>,
    scorer: Box<dyn Scorer>,
}

impl std::fmt::Debug for RagEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RagEngine {
    pub fn new(
        config: RagConfig,
        embedder: Arc<dyn EmbeddingModel>,
        generator: Arc<dyn GenerativeModel>,
    ) -> Result<Self, ApiError> {
        config.validate()?;
        Ok(Self {
            config,
            embedder,
            generator,
            scorer: Box::new(DotProductScorer),
        })
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Run the full pipeline. Input validation happens before any network
    /// call; the passage batch and the question embed concurrently and join
    /// before retrieval; generation runs strictly after retrieval.
    pub async fn answer(&self, question: &str, document: &str) -> Result<Answer, ApiError> {
        if question.trim().is_empty() {
            return Err(ApiError::EmptyInput("question".to_string()));
        }
        if document.trim().is_empty() {
            return Err(ApiError::EmptyInput("documentText".to_string()));
        }

        let passages = segmenter::segment(document, self.config.chunk_size, self.config.chunk_overlap)?;
        tracing::debug!(
            passages = passages.len(),
            chunk_size = self.config.chunk_size,
            "Segmented document"
        );

        let texts: Vec<String> = passages.iter().map(|p| p.text.clone()).collect();
        let (passage_vectors, question_vector) = tokio::try_join!(
            self.embedder.embed_batch(&texts),
            self.embedder.embed_one(question)
        )?;

        if passage_vectors.len() != passages.len() {
            return Err(ApiError::Internal(format!(
                "Embedder returned {} vectors for {} passages",
                passage_vectors.len(),
                passages.len()
            )));
        }

        let pairs = passages.into_iter().zip(passage_vectors).collect();
        let ranked = retriever::retrieve(
            pairs,
            &question_vector,
            self.config.top_k,
            self.scorer.as_ref(),
        )?;
        tracing::debug!(retrieved = ranked.len(), "Selected context passages");

        composer::compose(question, &ranked, document, self.generator.as_ref()).await
    }
}
