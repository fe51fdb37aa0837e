//! Builds the grounded prompt, invokes the generator, and maps the result
//! back to source passages as citations.
//!
//! Citations are drawn from every passage that was sent as context, whether
//! or not the model actually used it. They mean "sent", not "used".

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::errors::ApiError;
use crate::llm::GenerativeModel;

use super::types::{Answer, Citation, ScoredPassage};

pub const CONTEXT_DELIMITER: &str = "\n\n---\n\n";
pub const FALLBACK_ANSWER: &str = "No answer could be derived from the document.";

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
struct AnswerOutput {
    answer: String,
}

pub fn answer_schema() -> Value {
    serde_json::to_value(schemars::schema_for!(AnswerOutput)).unwrap_or_default()
}

/// Pure prompt assembly, independent of any model client.
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "You are an expert document analyst. Answer the user's question based *only* on the \
         provided context from the document. If the context is insufficient to answer, say \
         that you cannot answer from the document.\n\
         \n\
         CONTEXT:\n\
         ---\n\
         {}\n\
         ---\n\
         \n\
         QUESTION: {}\n\
         \n\
         ANSWER:",
        context, question
    )
}

pub async fn compose(
    question: &str,
    ranked: &[ScoredPassage],
    document: &str,
    generator: &dyn GenerativeModel,
) -> Result<Answer, ApiError> {
    let context = ranked
        .iter()
        .map(|scored| scored.passage.text.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_DELIMITER);

    let prompt = build_prompt(&context, question);
    let schema = answer_schema();

    let output = generator.generate(&prompt, &schema).await?;
    let answer = output
        .get("answer")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string());

    if answer.is_none() {
        tracing::warn!("Generator returned no usable answer field, using fallback");
    }

    Ok(Answer {
        answer: answer.unwrap_or_else(|| FALLBACK_ANSWER.to_string()),
        citations: ranked
            .iter()
            .map(|scored| cite(document, scored))
            .collect(),
    })
}

/// Build a citation for one passage, recovering offsets via first-occurrence
/// substring search (char offsets). With heavy repetition the first
/// occurrence may precede the passage's own position; the search cannot miss
/// entirely since every passage was sliced out of this document, but the
/// passage's own offsets stand in if it somehow does.
fn cite(document: &str, scored: &ScoredPassage) -> Citation {
    let text = &scored.passage.text;
    match document.find(text.as_str()) {
        Some(byte_pos) => {
            let start_index = document[..byte_pos].chars().count();
            let end_index = start_index + text.chars().count();
            Citation {
                text: text.clone(),
                start_index,
                end_index,
            }
        }
        None => Citation {
            text: text.clone(),
            start_index: scored.passage.start,
            end_index: scored.passage.end,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::types::Passage;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedGenerator {
        output: Value,
        calls: AtomicUsize,
    }

    impl FixedGenerator {
        fn new(output: Value) -> Self {
            Self {
                output,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl GenerativeModel for FixedGenerator {
        fn model_id(&self) -> &str {
            "fixed"
        }

        async fn generate(&self, _prompt: &str, _schema: &Value) -> Result<Value, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.output.clone())
        }
    }

    struct PromptCapturingGenerator {
        seen: std::sync::Mutex<String>,
    }

    #[async_trait]
    impl GenerativeModel for PromptCapturingGenerator {
        fn model_id(&self) -> &str {
            "capture"
        }

        async fn generate(&self, prompt: &str, _schema: &Value) -> Result<Value, ApiError> {
            *self.seen.lock().unwrap() = prompt.to_string();
            Ok(json!({ "answer": "ok" }))
        }
    }

    fn scored(text: &str, start: usize, score: f32, rank: usize) -> ScoredPassage {
        ScoredPassage {
            passage: Passage {
                text: text.to_string(),
                start,
                end: start + text.chars().count(),
            },
            score,
            rank,
        }
    }

    #[test]
    fn prompt_embeds_context_and_question() {
        let prompt = build_prompt("some context", "what is it?");
        assert!(prompt.contains("some context"));
        assert!(prompt.contains("QUESTION: what is it?"));
        assert!(prompt.contains("*only*"));
    }

    #[test]
    fn answer_schema_describes_answer_field() {
        let schema = answer_schema();
        assert!(schema["properties"]["answer"].is_object());
    }

    #[tokio::test]
    async fn compose_returns_generated_answer_with_citations() {
        let document = "alpha beta gamma delta";
        let ranked = vec![scored("beta gamma", 6, 0.9, 1), scored("alpha", 0, 0.5, 2)];
        let generator = FixedGenerator::new(json!({ "answer": "it is beta" }));

        let answer = compose("q", &ranked, document, &generator).await.unwrap();

        assert_eq!(answer.answer, "it is beta");
        assert_eq!(answer.citations.len(), 2);
        // citations follow rank order, most relevant first
        assert_eq!(answer.citations[0].text, "beta gamma");
        assert_eq!(answer.citations[1].text, "alpha");
    }

    #[tokio::test]
    async fn citation_offsets_round_trip() {
        let document = "héllo wörld, héllo again";
        let passage_text: String = document.chars().skip(6).take(5).collect(); // "wörld"
        let ranked = vec![scored(&passage_text, 6, 1.0, 1)];
        let generator = FixedGenerator::new(json!({ "answer": "x" }));

        let answer = compose("q", &ranked, document, &generator).await.unwrap();

        let citation = &answer.citations[0];
        let sliced: String = document
            .chars()
            .skip(citation.start_index)
            .take(citation.end_index - citation.start_index)
            .collect();
        assert_eq!(sliced, citation.text);
    }

    #[tokio::test]
    async fn repeated_text_cites_first_occurrence() {
        let document = "dup dup";
        let ranked = vec![scored("dup", 4, 1.0, 1)];
        let generator = FixedGenerator::new(json!({ "answer": "x" }));

        let answer = compose("q", &ranked, document, &generator).await.unwrap();
        assert_eq!(answer.citations[0].start_index, 0);
        assert_eq!(answer.citations[0].end_index, 3);
    }

    #[tokio::test]
    async fn missing_answer_field_falls_back_with_citations() {
        let document = "some document text";
        let ranked = vec![scored("some document", 0, 0.8, 1)];
        let generator = FixedGenerator::new(json!({ "something_else": true }));

        let answer = compose("q", &ranked, document, &generator).await.unwrap();

        assert_eq!(answer.answer, FALLBACK_ANSWER);
        assert_eq!(answer.citations.len(), 1);
    }

    #[tokio::test]
    async fn empty_answer_field_falls_back() {
        let generator = FixedGenerator::new(json!({ "answer": "   " }));
        let ranked = vec![scored("text", 0, 0.5, 1)];

        let answer = compose("q", &ranked, "text", &generator).await.unwrap();
        assert_eq!(answer.answer, FALLBACK_ANSWER);
    }

    #[tokio::test]
    async fn generator_failure_propagates() {
        struct FailingGenerator;

        #[async_trait]
        impl GenerativeModel for FailingGenerator {
            fn model_id(&self) -> &str {
                "failing"
            }

            async fn generate(&self, _: &str, _: &Value) -> Result<Value, ApiError> {
                Err(ApiError::ServiceUnavailable("down".to_string()))
            }
        }

        let ranked = vec![scored("text", 0, 0.5, 1)];
        let err = compose("q", &ranked, "text", &FailingGenerator)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::ServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn context_joins_passages_in_rank_order() {
        let generator = PromptCapturingGenerator {
            seen: std::sync::Mutex::new(String::new()),
        };
        let ranked = vec![scored("second half", 10, 0.9, 1), scored("first half", 0, 0.4, 2)];

        compose("q", &ranked, "first half second half", &generator)
            .await
            .unwrap();

        let prompt = generator.seen.lock().unwrap().clone();
        let ctx_a = prompt.find("second half").unwrap();
        let ctx_b = prompt.find("first half").unwrap();
        assert!(ctx_a < ctx_b);
        assert!(prompt.contains(CONTEXT_DELIMITER));
    }
}
