//! Error types for the fill-session engine

use thiserror::Error;

/// Errors surfaced by session operations.
///
/// `ValidationFailed` is retryable with different input; the remaining kinds
/// indicate the caller is misusing the session protocol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("Validation failed for field '{field_id}': {reason}")]
    ValidationFailed { field_id: String, reason: String },

    #[error("Submission targets field '{got}' but field '{expected}' is being asked")]
    FieldMismatch { expected: String, got: String },

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Session is closed")]
    SessionClosed,

    #[error("Session is not complete; required fields are still unanswered")]
    NotComplete,
}
