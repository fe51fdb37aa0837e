use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::errors::ApiError;
use crate::llm::GenerativeModel;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct ActionItemsOutput {
    action_items: Vec<String>,
}

fn action_items_schema() -> Value {
    serde_json::to_value(schemars::schema_for!(ActionItemsOutput)).unwrap_or_default()
}

fn build_prompt(document_text: &str) -> String {
    format!(
        "You are an expert at identifying actionable items from text.\n\
         \n\
         Analyze the following document text and extract a list of actionable items that a \
         user might need to complete. Each item should be a clear, concise task.\n\
         \n\
         Document Text: {}\n\
         \n\
         Action Items:",
        document_text
    )
}

/// Extract a task list from the full document text, no retrieval.
pub async fn extract_action_items(
    document_text: &str,
    generator: &dyn GenerativeModel,
) -> Result<Vec<String>, ApiError> {
    if document_text.trim().is_empty() {
        return Err(ApiError::EmptyInput("documentText".to_string()));
    }

    let output = generator
        .generate(&build_prompt(document_text), &action_items_schema())
        .await?;

    let items = output
        .get("actionItems")
        .and_then(|v| v.as_array())
        .ok_or_else(|| ApiError::Internal("Generator returned no actionItems".to_string()))?;

    Ok(items
        .iter()
        .filter_map(|item| item.as_str())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
        .collect())
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
    async fn returns_items_in_order() {
        let generator = FixedGenerator {
            output: json!({ "actionItems": ["send report", "  book room  ", ""] }),
            calls: AtomicUsize::new(0),
        };
        let items = extract_action_items("doc", &generator).await.unwrap();
        assert_eq!(items, vec!["send report", "book room"]);
    }

    #[tokio::test]
    async fn empty_document_fails_without_calling_generator() {
        let generator = FixedGenerator {
            output: json!({ "actionItems": [] }),
            calls: AtomicUsize::new(0),
        };
        let err = extract_action_items("", &generator).await.unwrap_err();
        assert!(matches!(err, ApiError::EmptyInput(_)));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_field_is_an_internal_error() {
        let generator = FixedGenerator {
            output: json!({ "tasks": [] }),
            calls: AtomicUsize::new(0),
        };
        let err = extract_action_items("doc", &generator).await.unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[test]
    fn schema_uses_camel_case_field() {
        let schema = action_items_schema();
        assert!(schema["properties"]["actionItems"].is_object());
    }
}
