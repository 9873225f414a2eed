//! The chat platform seam.

use crate::{ChannelKind, ChatResult, Role};
use async_trait::async_trait;

/// Operations the bot performs against the chat platform.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Post `text` to a channel.
    async fn send_message(&self, channel_id: &str, text: &str) -> ChatResult<()>;

    /// Look up what kind of channel `channel_id` is.
    async fn channel_kind(&self, channel_id: &str) -> ChatResult<ChannelKind>;

    async fn grant_role(&self, guild_id: &str, user_id: &str, role_id: &str) -> ChatResult<()>;

    /// Show the typing indicator in a channel.
    async fn signal_typing(&self, channel_id: &str) -> ChatResult<()>;

    async fn guild_roles(&self, guild_id: &str) -> ChatResult<Vec<Role>>;

    /// Open (or fetch) the direct channel with a user and return its id.
    async fn open_direct_channel(&self, user_id: &str) -> ChatResult<String>;
}
