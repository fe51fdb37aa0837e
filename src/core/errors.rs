use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("empty input: {0}")]
    EmptyInput(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            ApiError::EmptyInput(msg) => {
                (StatusCode::BAD_REQUEST, format!("Empty input: {}", msg))
            }
            ApiError::InvalidConfiguration(msg) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid configuration: {}", msg),
            ),
            ApiError::DimensionMismatch(msg) => (
                StatusCode::BAD_GATEWAY,
                format!("Dimension mismatch: {}", msg),
            ),
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("Service unavailable: {}", msg),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}
