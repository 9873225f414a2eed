//! Router error types.

use chat_platform_client::ChatError;
use thiserror::Error;

/// Error type returned by command handlers and collaborators living in other crates.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Router error type.
#[derive(Error, Debug)]
pub enum RouterError {
    /// Two commands share a trigger (case-insensitively)
    #[error("Duplicate command trigger: {0}")]
    DuplicateTrigger(String),

    /// Could not classify the source channel
    #[error("Failed to classify channel {channel_id}: {source}")]
    ChannelLookup {
        channel_id: String,
        #[source]
        source: ChatError,
    },

    /// Verification status lookup failed
    #[error("Failed to check verification status for {user_id}: {source}")]
    VerificationCheck {
        user_id: String,
        #[source]
        source: HandlerError,
    },

    /// Typing indicator failed
    #[error("Failed to signal typing in {channel_id}: {source}")]
    Typing {
        channel_id: String,
        #[source]
        source: ChatError,
    },

    /// Sending a reply failed
    #[error("Failed to reply in {channel_id}: {source}")]
    Reply {
        channel_id: String,
        #[source]
        source: ChatError,
    },

    /// The command handler failed
    #[error("Command '{trigger}' failed: {source}")]
    Handler {
        trigger: String,
        #[source]
        source: HandlerError,
    },
}

/// Result type alias using RouterError.
pub type RouterResult<T> = Result<T, RouterError>;
