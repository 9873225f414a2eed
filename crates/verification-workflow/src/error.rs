//! Verification error types.

use chat_platform_client::ChatError;
use command_router::HandlerError;
use forum_client::ForumError;
use linked_user_store::UserStoreError;
use std::fmt;
use thiserror::Error;

/// Errors that end a `verify` invocation before a session starts.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// The forum could not resolve the requested account
    #[error("Failed to look up forum member {forum_id}: {source}")]
    ForumLookup {
        forum_id: String,
        #[source]
        source: ForumError,
    },

    /// User store error
    #[error("User store error: {0}")]
    Store(#[from] UserStoreError),

    /// Chat platform error
    #[error("Chat error: {0}")]
    Chat(#[from] ChatError),
}

/// Result type alias using VerifyError.
pub type VerifyResult<T> = Result<T, VerifyError>;

/// Linking step that failed after a code matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStep {
    StoreRecord,
    GrantRole,
    Confirm,
}

impl fmt::Display for LinkStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self {
            Self::StoreRecord => "storing linked user",
            Self::GrantRole => "granting verified role",
            Self::Confirm => "sending confirmation",
        };
        f.write_str(step)
    }
}

/// A linking failure, tagged with the step it happened in.
#[derive(Error, Debug)]
#[error("{step} failed: {source}")]
pub struct LinkError {
    pub step: LinkStep,
    #[source]
    pub source: HandlerError,
}

impl LinkError {
    pub fn new(step: LinkStep, source: impl Into<HandlerError>) -> Self {
        Self {
            step,
            source: source.into(),
        }
    }
}
