//! Error types for qdrill-api
//!
//! Every failure leaves the service as `{"error": {"code", "message"}}`.
//! Validation failures add `details`, the field-path → messages map, so a
//! client can tell bad input (400) from a system failure (500).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use qdrill_common::FieldErrors;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Payload failed validation (400)
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// qdrill-common error
    #[error("Common error: {0}")]
    Common(#[from] qdrill_common::Error),
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None),
            ApiError::Validation(errors) => validation_parts(errors),
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg, None)
            }
            ApiError::Common(err) => match err {
                qdrill_common::Error::NotFound(msg) => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None)
                }
                qdrill_common::Error::Validation(errors) => validation_parts(errors),
                qdrill_common::Error::Database(ref db_err) => {
                    error!("Database error: {}", db_err);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "DATABASE_ERROR",
                        "Failed to access storage".to_string(),
                        None,
                    )
                }
                other => {
                    error!("Common error: {}", other);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        other.to_string(),
                        None,
                    )
                }
            },
        };

        let mut error = json!({
            "code": error_code,
            "message": message,
        });
        if let Some(details) = details {
            error["details"] = details;
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

fn validation_parts(
    errors: FieldErrors,
) -> (StatusCode, &'static str, String, Option<serde_json::Value>) {
    let message = format!("{} invalid field(s)", errors.len());
    let details = serde_json::to_value(&errors).ok();
    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message, details)
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
