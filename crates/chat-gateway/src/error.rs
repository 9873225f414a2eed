//! Gateway error types.

use thiserror::Error;

/// Gateway error type.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// WebSocket error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Protocol violation (missing hello, malformed payload)
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The gateway closed the connection with a non-recoverable code
    #[error("Gateway closed the session: {code} {reason}")]
    Fatal { code: u16, reason: String },

    /// Gave up reconnecting
    #[error("Gave up after {0} reconnect attempts")]
    ReconnectExhausted(u32),
}

/// Result type alias using GatewayError.
pub type GatewayResult<T> = Result<T, GatewayError>;
