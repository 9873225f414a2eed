//! Discord gateway client.
//!
//! Keeps one websocket session alive (identify, heartbeat, reconnect with
//! exponential backoff) and forwards the events the bot cares about as
//! [`GatewayEvent`]s on an mpsc channel.

mod client;
mod error;
pub mod payload;

use chat_platform_client::IncomingMessage;

pub use client::{backoff_delay, GatewayClient, GatewayConfig, DISCORD_GATEWAY_URL};
pub use error::{GatewayError, GatewayResult};

/// Events forwarded to the bot runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    Ready { user_id: String, session_id: String },
    MessageCreate(IncomingMessage),
    MemberJoined {
        guild_id: String,
        user_id: String,
        username: String,
    },
}
