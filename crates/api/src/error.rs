//! API Errors

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use survey_data::ValidationError;
use thiserror::Error;
use tracing::error;

/// Detail sent to clients for any unexpected failure
pub const ERR_UNEXPECTED: &str = "ERR_UNEXPECTED";

/// Errors returned by handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body missing, malformed, or out of range
    #[error("{0}")]
    Validation(String),
    /// Anything else; details are logged, not returned
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<Vec<ValidationError>> for ApiError {
    fn from(errors: Vec<ValidationError>) -> Self {
        let detail = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        ApiError::Validation(detail)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(detail) => {
                error!("422 Validation Error: {}", detail);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({ "detail": detail })),
                )
                    .into_response()
            }
            ApiError::Unexpected(detail) => {
                error!("Error handling request: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": ERR_UNEXPECTED })),
                )
                    .into_response()
            }
        }
    }
}
