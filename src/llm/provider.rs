use async_trait::async_trait;
use serde_json::Value;

use crate::core::errors::ApiError;

/// Embedding collaborator. Turns text into fixed-dimension vectors; the
/// engine never retries a failed call, retry policy belongs to the caller.
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    /// return the embedding model identifier (e.g. "text-embedding-004")
    fn model_id(&self) -> &str;

    /// embed a batch of texts; one vector per input, same order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ApiError>;

    /// embed a single text
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, ApiError>;
}

/// Generative collaborator. Given a prompt and an output schema, returns a
/// JSON object conforming to that schema.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// return the generation model identifier (e.g. "gemini-2.0-flash")
    fn model_id(&self) -> &str;

    /// structured generation: returns the parsed JSON object
    async fn generate(&self, prompt: &str, output_schema: &Value) -> Result<Value, ApiError>;
}
