//! In-memory store for tests and local runs.

use crate::{DuplicateKey, LinkedUser, NewLinkedUser, UserStore, UserStoreError, UserStoreResult};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;

/// Vec-backed [`UserStore`] enforcing the same uniqueness rules as SQLite.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<Vec<LinkedUser>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record, bypassing uniqueness checks.
    pub fn with_user(self, chat_id: &str, forum_id: &str) -> Self {
        self.lock().push(LinkedUser {
            chat_id: chat_id.to_string(),
            forum_id: forum_id.to_string(),
            linked_at: Utc::now(),
        });
        self
    }

    /// Snapshot of every stored record.
    pub fn users(&self) -> Vec<LinkedUser> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LinkedUser>> {
        self.users.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create_user(&self, user: NewLinkedUser) -> UserStoreResult<LinkedUser> {
        let mut users = self.lock();
        if users.iter().any(|u| u.chat_id == user.chat_id) {
            return Err(UserStoreError::Duplicate(DuplicateKey::ChatId));
        }
        if users.iter().any(|u| u.forum_id == user.forum_id) {
            return Err(UserStoreError::Duplicate(DuplicateKey::ForumId));
        }

        let created = LinkedUser {
            chat_id: user.chat_id,
            forum_id: user.forum_id,
            linked_at: Utc::now(),
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn get_user_by_chat(&self, chat_id: &str) -> UserStoreResult<Option<LinkedUser>> {
        Ok(self.lock().iter().find(|u| u.chat_id == chat_id).cloned())
    }

    async fn get_user_by_forum(&self, forum_id: &str) -> UserStoreResult<Option<LinkedUser>> {
        Ok(self.lock().iter().find(|u| u.forum_id == forum_id).cloned())
    }

    async fn update_user(&self, user: &LinkedUser) -> UserStoreResult<()> {
        let mut users = self.lock();
        if users
            .iter()
            .any(|u| u.forum_id == user.forum_id && u.chat_id != user.chat_id)
        {
            return Err(UserStoreError::Duplicate(DuplicateKey::ForumId));
        }
        let existing = users
            .iter_mut()
            .find(|u| u.chat_id == user.chat_id)
            .ok_or_else(|| {
                UserStoreError::NotFound(format!("no linked user with chat id {}", user.chat_id))
            })?;
        existing.forum_id = user.forum_id.clone();
        existing.linked_at = user.linked_at;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_uniqueness_matches_sqlite() {
        let store = InMemoryUserStore::new().with_user("1001", "21");

        assert!(matches!(
            store.create_user(NewLinkedUser::new("1001", "99")).await,
            Err(UserStoreError::Duplicate(DuplicateKey::ChatId))
        ));
        assert!(matches!(
            store.create_user(NewLinkedUser::new("1002", "21")).await,
            Err(UserStoreError::Duplicate(DuplicateKey::ForumId))
        ));

        store
            .create_user(NewLinkedUser::new("1002", "22"))
            .await
            .unwrap();
        assert_eq!(store.users().len(), 2);
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let store = InMemoryUserStore::new();
        let user = LinkedUser {
            chat_id: "1001".to_string(),
            forum_id: "21".to_string(),
            linked_at: Utc::now(),
        };
        assert!(matches!(
            store.update_user(&user).await,
            Err(UserStoreError::NotFound(_))
        ));
    }
}
