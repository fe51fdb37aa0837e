use std::env;
use std::sync::Arc;

use serde_json::Value;

use crate::analysis::AnalysisService;
use crate::core::config::validation::validate_config;
use crate::core::config::{AppPaths, ConfigService};
use crate::core::errors::ApiError;
use crate::llm::{EmbeddingModel, GenerativeModel, OpenAiCompatProvider};
use crate::rag::{RagConfig, RagEngine};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-004";
const DEFAULT_GENERATION_MODEL: &str = "gemini-2.0-flash";

/// Application state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub config: ConfigService,
    pub engine: Arc<RagEngine>,
    pub analysis: AnalysisService,
}

impl AppState {
    /// Builds paths, loads and validates configuration, and wires the model
    /// provider into the engine and analysis service.
    pub fn initialize() -> Result<Arc<Self>, ApiError> {
        let paths = Arc::new(AppPaths::new());
        let config = ConfigService::new(paths.clone());

        let loaded = config.load_config()?;
        validate_config(&loaded)?;

        let provider = Arc::new(build_provider(&loaded));
        let embedder: Arc<dyn EmbeddingModel> = provider.clone();
        let generator: Arc<dyn GenerativeModel> = provider;

        let rag_config = RagConfig::from_config(&loaded);
        let engine = Arc::new(RagEngine::new(
            rag_config,
            embedder,
            generator.clone(),
        )?);
        let analysis = AnalysisService::new(generator);

        Ok(Arc::new(AppState {
            paths,
            config,
            engine,
            analysis,
        }))
    }
}

fn build_provider(config: &Value) -> OpenAiCompatProvider {
    let models = config.get("models");

    let read = |key: &str, fallback: &str| -> String {
        models
            .and_then(|v| v.get(key))
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .unwrap_or(fallback)
            .to_string()
    };

    let api_key = models
        .and_then(|v| v.get("api_key"))
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
        .or_else(|| env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()));

    OpenAiCompatProvider::new(
        read("base_url", DEFAULT_BASE_URL),
        api_key,
        read("embedding_model", DEFAULT_EMBEDDING_MODEL),
        read("generation_model", DEFAULT_GENERATION_MODEL),
    )
}
