//! Error types for the FormFill API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use formfill_engine::EngineError;
use serde::Serialize;
use thiserror::Error;

/// Server error types
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Validation failed for field '{field_id}': {reason}")]
    ValidationFailed { field_id: String, reason: String },

    #[error("Submission targets field '{got}' but field '{expected}' is being asked")]
    FieldMismatch { expected: String, got: String },

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Session is closed")]
    SessionClosed,

    #[error("Session is not complete")]
    NotComplete,

    #[error("Collaborator service unavailable: {0}")]
    CollaboratorUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
    /// True when retrying with different input can succeed
    retryable: bool,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, retryable, message) = match &self {
            ApiError::SessionNotFound(id) => (
                StatusCode::NOT_FOUND,
                "SESSION_NOT_FOUND",
                false,
                format!("Session not found: {}", id),
            ),
            ApiError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", false, msg.clone())
            }
            ApiError::ValidationFailed { field_id, reason } => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_FAILED",
                true,
                format!("Field '{}': {}", field_id, reason),
            ),
            ApiError::FieldMismatch { expected, got } => (
                StatusCode::CONFLICT,
                "FIELD_MISMATCH",
                false,
                format!("Expected a value for '{}', got one for '{}'", expected, got),
            ),
            ApiError::UnknownField(id) => (
                StatusCode::NOT_FOUND,
                "UNKNOWN_FIELD",
                false,
                format!("Unknown field: {}", id),
            ),
            ApiError::SessionClosed => (
                StatusCode::GONE,
                "SESSION_CLOSED",
                false,
                "Session has been cancelled".to_string(),
            ),
            ApiError::NotComplete => (
                StatusCode::CONFLICT,
                "NOT_COMPLETE",
                false,
                "Required fields are still unanswered".to_string(),
            ),
            ApiError::CollaboratorUnavailable(msg) => {
                tracing::error!("Collaborator failure: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    false,
                    "A required service is unavailable, try again later".to_string(),
                )
            }
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    false,
                    "Internal error".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: code.to_string(),
            retryable,
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::ValidationFailed { field_id, reason } => {
                ApiError::ValidationFailed { field_id, reason }
            }
            EngineError::FieldMismatch { expected, got } => {
                ApiError::FieldMismatch { expected, got }
            }
            EngineError::UnknownField(id) => ApiError::UnknownField(id),
            EngineError::SessionClosed => ApiError::SessionClosed,
            EngineError::NotComplete => ApiError::NotComplete,
        }
    }
}
