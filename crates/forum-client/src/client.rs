//! The forum seam.

use crate::{ForumMember, ForumResult};
use async_trait::async_trait;

/// Read and write access to forum member profiles.
#[async_trait]
pub trait ForumClient: Send + Sync {
    async fn get_member(&self, id: &str) -> ForumResult<ForumMember>;

    /// Persist every populated custom field of `member`.
    async fn update_member(&self, member: &ForumMember) -> ForumResult<()>;
}
