//! Single-shot generative flows over the full document: summarization and
//! action-item extraction. No retrieval involved; both share the generator
//! collaborator with the question-answering engine.

pub mod action_items;
pub mod summary;

use std::sync::Arc;

use crate::core::errors::ApiError;
use crate::llm::GenerativeModel;

#[derive(Clone)]
pub struct AnalysisService {
    generator: Arc<dyn GenerativeModel>,
}

impl AnalysisService {
    pub fn new(generator: Arc<dyn GenerativeModel>) -> Self {
        Self { generator }
    }

    pub async fn summarize(&self, document_text: &str) -> Result<String, ApiError> {
        summary::summarize(document_text, self.generator.as_ref()).await
    }

    pub async fn extract_action_items(&self, document_text: &str) -> Result<Vec<String>, ApiError> {
        action_items::extract_action_items(document_text, self.generator.as_ref()).await
    }
}
