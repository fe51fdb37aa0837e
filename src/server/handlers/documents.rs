use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub question: String,
    pub document_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRequest {
    pub document_text: String,
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let answer = state
        .engine
        .answer(&payload.question, &payload.document_text)
        .await?;
    Ok(Json(answer))
}

pub async fn summary(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DocumentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state.analysis.summarize(&payload.document_text).await?;
    Ok(Json(json!({ "summary": summary })))
}

pub async fn action_items(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DocumentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .analysis
        .extract_action_items(&payload.document_text)
        .await?;
    Ok(Json(json!({ "actionItems": items })))
}
