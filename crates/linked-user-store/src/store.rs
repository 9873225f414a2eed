//! The durable link store seam.

use crate::{queries, AsyncDatabase, LinkedUser, NewLinkedUser, UserStoreResult};
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

/// Durable record of which chat identity owns which forum identity.
///
/// Implementations must reject a create whose chat or forum identity is
/// already present with [`UserStoreError::Duplicate`](crate::UserStoreError::Duplicate).
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, user: NewLinkedUser) -> UserStoreResult<LinkedUser>;

    async fn get_user_by_chat(&self, chat_id: &str) -> UserStoreResult<Option<LinkedUser>>;

    async fn get_user_by_forum(&self, forum_id: &str) -> UserStoreResult<Option<LinkedUser>>;

    /// Replace the forum identity of the record owned by `user.chat_id`.
    async fn update_user(&self, user: &LinkedUser) -> UserStoreResult<()>;
}

/// SQLite-backed store.
#[derive(Clone)]
pub struct SqliteUserStore {
    db: AsyncDatabase,
}

impl SqliteUserStore {
    pub fn new(db: AsyncDatabase) -> Self {
        Self { db }
    }

    pub async fn open(path: &Path) -> UserStoreResult<Self> {
        Ok(Self::new(AsyncDatabase::open(path).await?))
    }

    pub fn database(&self) -> &AsyncDatabase {
        &self.db
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn create_user(&self, user: NewLinkedUser) -> UserStoreResult<LinkedUser> {
        let created = self
            .db
            .call(move |conn| queries::insert_user(conn, &user))
            .await?;
        debug!(chat_id = %created.chat_id, forum_id = %created.forum_id, "Linked user stored");
        Ok(created)
    }

    async fn get_user_by_chat(&self, chat_id: &str) -> UserStoreResult<Option<LinkedUser>> {
        let chat_id = chat_id.to_string();
        self.db
            .call(move |conn| queries::get_user_by_chat(conn, &chat_id))
            .await
    }

    async fn get_user_by_forum(&self, forum_id: &str) -> UserStoreResult<Option<LinkedUser>> {
        let forum_id = forum_id.to_string();
        self.db
            .call(move |conn| queries::get_user_by_forum(conn, &forum_id))
            .await
    }

    async fn update_user(&self, user: &LinkedUser) -> UserStoreResult<()> {
        let user = user.clone();
        self.db.call(move |conn| queries::update_user(conn, &user)).await
    }
}
