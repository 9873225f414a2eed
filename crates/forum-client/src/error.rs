//! Forum error types.

use thiserror::Error;

/// Forum error type.
#[derive(Error, Debug)]
pub enum ForumError {
    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the forum API
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Member does not exist
    #[error("Member not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias using ForumError.
pub type ForumResult<T> = Result<T, ForumError>;
