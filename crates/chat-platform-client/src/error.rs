//! Chat platform error types.

use thiserror::Error;

/// Chat platform error type.
#[derive(Error, Debug)]
pub enum ChatError {
    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the platform API
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Anything a non-HTTP implementation needs to surface
    #[error("{0}")]
    Other(String),
}

/// Result type alias using ChatError.
pub type ChatResult<T> = Result<T, ChatError>;
