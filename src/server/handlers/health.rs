use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let rag = state.engine.config();
    Json(json!({
        "status": "ok",
        "rag": {
            "chunk_size": rag.chunk_size,
            "chunk_overlap": rag.chunk_overlap,
            "top_k": rag.top_k
        }
    }))
}
