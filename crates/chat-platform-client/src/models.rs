//! Chat platform types shared with the gateway and the command layer.

use serde::{Deserialize, Serialize};

/// Kind of channel a message arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelKind {
    /// One-to-one conversation with the bot.
    Direct,
    /// Group conversation outside any guild.
    Group,
    /// Any channel that belongs to a guild.
    Guild,
}

impl ChannelKind {
    /// Map a Discord channel `type` number.
    pub fn from_discord_type(kind: u8) -> Self {
        match kind {
            1 => Self::Direct,
            3 => Self::Group,
            _ => Self::Guild,
        }
    }

    /// Only one-to-one conversations count; group DMs have other listeners.
    pub fn is_private(self) -> bool {
        matches!(self, Self::Direct)
    }
}

/// A message delivered to the bot. Read-only once received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub id: String,
    pub author_id: String,
    pub author_name: String,
    pub channel_id: String,
    pub guild_id: Option<String>,
    pub content: String,
    #[serde(default)]
    pub mentions: Vec<String>,
}

/// Guild role as listed by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
}
