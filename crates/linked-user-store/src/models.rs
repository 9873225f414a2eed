//! Linked user record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat identity linked to a forum account.
///
/// Both identities are globally unique across all records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedUser {
    pub chat_id: String,
    pub forum_id: String,
    pub linked_at: DateTime<Utc>,
}

/// Input for creating a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLinkedUser {
    pub chat_id: String,
    pub forum_id: String,
}

impl NewLinkedUser {
    pub fn new(chat_id: impl Into<String>, forum_id: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            forum_id: forum_id.into(),
        }
    }
}
