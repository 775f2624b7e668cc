//! API error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lcx_common::ValidationErrors;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors returned by store handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Submission failed field validation
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Malformed request (bad JSON, bad query parameter)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Database or record decoding failure
    #[error(transparent)]
    Store(#[from] lcx_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Validation failed",
                    "fields": fields,
                })),
            )
                .into_response(),
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": message })),
            )
                .into_response(),
            ApiError::Store(e) => {
                error!("Store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": e.to_string() })),
                )
                    .into_response()
            }
        }
    }
}
