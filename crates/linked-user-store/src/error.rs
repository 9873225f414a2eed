//! User store error types.

use thiserror::Error;

/// Which unique key a rejected write collided with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateKey {
    ChatId,
    ForumId,
}

impl std::fmt::Display for DuplicateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ChatId => f.write_str("chat_id"),
            Self::ForumId => f.write_str("forum_id"),
        }
    }
}

/// User store error type.
#[derive(Error, Debug)]
pub enum UserStoreError {
    /// A record with the same chat or forum identity already exists
    #[error("Duplicate {0}")]
    Duplicate(DuplicateKey),

    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Executor thread / connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// Not found error
    #[error("Not found: {0}")]
    NotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl UserStoreError {
    /// True when the write was rejected by a uniqueness constraint.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }
}

/// Result type alias using UserStoreError.
pub type UserStoreResult<T> = Result<T, UserStoreError>;
