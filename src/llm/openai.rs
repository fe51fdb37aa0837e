//! OpenAI-compatible HTTP provider for embeddings and structured generation.
//!
//! Targets any server exposing `/v1/embeddings` and `/v1/chat/completions`
//! (Google's OpenAI-compatible surface by default; a local llama.cpp or
//! LM Studio endpoint drops in via `models.base_url`).

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{json, Value};

use super::provider::{EmbeddingModel, GenerativeModel};
use crate::core::errors::ApiError;

#[derive(Clone)]
pub struct OpenAiCompatProvider {
    base_url: String,
    api_key: Option<String>,
    embedding_model: String,
    generation_model: String,
    client: Client,
}

impl OpenAiCompatProvider {
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        embedding_model: String,
        generation_model: String,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            embedding_model,
            generation_model,
            client: Client::new(),
        }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) if !key.is_empty() => request.bearer_auth(key),
            _ => request,
        }
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let res = self
            .authorize(self.client.post(&url).json(body))
            .send()
            .await
            .map_err(|err| ApiError::ServiceUnavailable(format!("{}: {}", path, err)))?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(map_http_error(path, status, &text));
        }

        res.json().await.map_err(ApiError::internal)
    }

    async fn embed_texts(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        let body = json!({
            "model": self.embedding_model,
            "input": inputs,
        });

        let payload = self.post_json("/v1/embeddings", &body).await?;
        parse_embedding_response(&payload)
    }
}

fn map_http_error(path: &str, status: StatusCode, body: &str) -> ApiError {
    if status.is_client_error() {
        ApiError::BadRequest(format!("{} rejected ({}): {}", path, status, body))
    } else {
        ApiError::ServiceUnavailable(format!("{} failed ({}): {}", path, status, body))
    }
}

#[async_trait]
impl EmbeddingModel for OpenAiCompatProvider {
    fn model_id(&self) -> &str {
        &self.embedding_model
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        self.embed_texts(texts).await
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, ApiError> {
        let input = [text.to_string()];
        let embeddings = self.embed_texts(&input).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Internal("Embedding response is empty".to_string()))
    }
}

#[async_trait]
impl GenerativeModel for OpenAiCompatProvider {
    fn model_id(&self) -> &str {
        &self.generation_model
    }

    async fn generate(&self, prompt: &str, output_schema: &Value) -> Result<Value, ApiError> {
        let full_prompt = format!(
            "{}\n\nRespond with a single JSON object conforming to this JSON schema, \
             and output nothing else:\n{}",
            prompt, output_schema
        );

        let body = json!({
            "model": self.generation_model,
            "messages": [{ "role": "user", "content": full_prompt }],
            "stream": false,
        });

        let payload = self.post_json("/v1/chat/completions", &body).await?;
        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default();

        extract_json_object(content).ok_or_else(|| {
            ApiError::Internal(format!(
                "Generation response is not a JSON object: {}",
                truncate_for_log(content)
            ))
        })
    }
}

fn parse_embedding_response(payload: &Value) -> Result<Vec<Vec<f32>>, ApiError> {
    let Some(data) = payload.get("data").and_then(|v| v.as_array()) else {
        return Err(ApiError::Internal(
            "Embedding response missing data array".to_string(),
        ));
    };

    let mut indexed_embeddings = Vec::with_capacity(data.len());
    for (fallback_idx, item) in data.iter().enumerate() {
        let Some(values) = item.get("embedding").and_then(|v| v.as_array()) else {
            return Err(ApiError::Internal(
                "Embedding response item missing embedding array".to_string(),
            ));
        };

        let mut embedding = Vec::with_capacity(values.len());
        for value in values {
            let Some(float_value) = value.as_f64() else {
                return Err(ApiError::Internal(
                    "Embedding contains non-numeric value".to_string(),
                ));
            };
            embedding.push(float_value as f32);
        }

        let index = item
            .get("index")
            .and_then(|v| v.as_u64())
            .map(|v| v as usize)
            .unwrap_or(fallback_idx);
        indexed_embeddings.push((index, embedding));
    }

    indexed_embeddings.sort_by_key(|(idx, _)| *idx);
    Ok(indexed_embeddings
        .into_iter()
        .map(|(_, embedding)| embedding)
        .collect())
}

/// Pull a JSON object out of model text, tolerating code fences and prose
/// around it.
fn extract_json_object(text: &str) -> Option<Value> {
    let trimmed = text.trim();

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if value.is_object() {
            return Some(value);
        }
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&trimmed[start..=end]) {
        Ok(value) if value.is_object() => Some(value),
        _ => None,
    }
}

fn truncate_for_log(text: &str) -> String {
    const MAX: usize = 200;
    if text.chars().count() <= MAX {
        return text.to_string();
    }
    let head: String = text.chars().take(MAX).collect();
    format!("{}…", head)
}
