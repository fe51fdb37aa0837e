use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::errors::ApiError;
use crate::llm::GenerativeModel;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
struct SummaryOutput {
    summary: String,
}

fn summary_schema() -> Value {
    serde_json::to_value(schemars::schema_for!(SummaryOutput)).unwrap_or_default()
}

fn build_prompt(document_text: &str) -> String {
    format!(
        "You are an expert document analyst. Summarize the following document concisely, \
         capturing its key points.\n\
         \n\
         Document Text: {}\n\
         \n\
         Summary:",
        document_text
    )
}

/// One-shot summarization over the full document text, no retrieval.
pub async fn summarize(
    document_text: &str,
    generator: &dyn GenerativeModel,
) -> Result<String, ApiError> {
    if document_text.trim().is_empty() {
        return Err(ApiError::EmptyInput("documentText".to_string()));
    }

    let output = generator
        .generate(&build_prompt(document_text), &summary_schema())
        .await?;

    output
        .get("summary")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
        .ok_or_else(|| ApiError::Internal("Generator returned no summary".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedGenerator {
        output: Value,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GenerativeModel for FixedGenerator {
        fn model_id(&self) -> &str {
            "fixed"
        }

        async fn generate(&self, _: &str, _: &Value) -> Result<Value, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.output.clone())
        }
    }

    #[tokio::test]
    async fn returns_summary_field() {
        let generator = FixedGenerator {
            output: json!({ "summary": "a short summary" }),
            calls: AtomicUsize::new(0),
        };
        let summary = summarize("some document", &generator).await.unwrap();
        assert_eq!(summary, "a short summary");
    }

    #[tokio::test]
    async fn empty_document_fails_without_calling_generator() {
        let generator = FixedGenerator {
            output: json!({ "summary": "x" }),
            calls: AtomicUsize::new(0),
        };
        let err = summarize("  ", &generator).await.unwrap_err();
        assert!(matches!(err, ApiError::EmptyInput(_)));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_summary_field_is_an_internal_error() {
        let generator = FixedGenerator {
            output: json!({}),
            calls: AtomicUsize::new(0),
        };
        let err = summarize("doc", &generator).await.unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
