//! Gateway wire payloads.

use crate::{GatewayError, GatewayEvent, GatewayResult};
use chat_platform_client::IncomingMessage;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Gateway opcodes the client understands.
pub mod opcode {
    pub const DISPATCH: u8 = 0;
    pub const HEARTBEAT: u8 = 1;
    pub const IDENTIFY: u8 = 2;
    pub const RECONNECT: u8 = 7;
    pub const INVALID_SESSION: u8 = 9;
    pub const HELLO: u8 = 10;
    pub const HEARTBEAT_ACK: u8 = 11;
}

/// Gateway intent bits.
pub mod intents {
    pub const GUILDS: u64 = 1;
    pub const GUILD_MEMBERS: u64 = 1 << 1;
    pub const GUILD_MESSAGES: u64 = 1 << 9;
    pub const DIRECT_MESSAGES: u64 = 1 << 12;
    pub const MESSAGE_CONTENT: u64 = 1 << 15;

    /// Everything the bot subscribes to.
    pub const DEFAULT: u64 =
        GUILDS | GUILD_MEMBERS | GUILD_MESSAGES | DIRECT_MESSAGES | MESSAGE_CONTENT;
}

/// Close codes after which reconnecting cannot help.
const FATAL_CLOSE_CODES: [u16; 6] = [4004, 4010, 4011, 4012, 4013, 4014];

pub fn is_fatal_close(code: u16) -> bool {
    FATAL_CLOSE_CODES.contains(&code)
}

/// Envelope shared by every gateway frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayPayload {
    pub op: u8,
    #[serde(default)]
    pub d: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

impl GatewayPayload {
    pub fn from_json(text: &str) -> GatewayResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> GatewayResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn heartbeat(sequence: Option<u64>) -> Self {
        Self {
            op: opcode::HEARTBEAT,
            d: sequence.map(Value::from).unwrap_or(Value::Null),
            s: None,
            t: None,
        }
    }

    pub fn identify(token: &str, intents: u64) -> Self {
        Self {
            op: opcode::IDENTIFY,
            d: serde_json::json!({
                "token": token,
                "intents": intents,
                "properties": {
                    "os": std::env::consts::OS,
                    "browser": "maccer",
                    "device": "maccer",
                },
            }),
            s: None,
            t: None,
        }
    }

    /// Heartbeat period announced by a HELLO frame.
    pub fn heartbeat_interval_ms(&self) -> GatewayResult<u64> {
        if self.op != opcode::HELLO {
            return Err(GatewayError::Protocol(format!(
                "expected HELLO, got opcode {}",
                self.op
            )));
        }
        self.d
            .get("heartbeat_interval")
            .and_then(Value::as_u64)
            .ok_or_else(|| GatewayError::Protocol("HELLO without heartbeat_interval".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
    #[serde(default)]
    username: String,
}

#[derive(Debug, Deserialize)]
struct ReadyPayload {
    user: UserPayload,
    session_id: String,
}

#[derive(Debug, Deserialize)]
struct MessagePayload {
    id: String,
    channel_id: String,
    #[serde(default)]
    guild_id: Option<String>,
    #[serde(default)]
    content: String,
    author: UserPayload,
    #[serde(default)]
    mentions: Vec<UserPayload>,
}

#[derive(Debug, Deserialize)]
struct MemberAddPayload {
    guild_id: String,
    user: UserPayload,
}

/// Translate a DISPATCH frame into an event. Unhandled event types yield `None`.
pub fn parse_dispatch(kind: &str, data: Value) -> GatewayResult<Option<GatewayEvent>> {
    let event = match kind {
        "READY" => {
            let ready: ReadyPayload = serde_json::from_value(data)?;
            GatewayEvent::Ready {
                user_id: ready.user.id,
                session_id: ready.session_id,
            }
        }
        "MESSAGE_CREATE" => {
            let message: MessagePayload = serde_json::from_value(data)?;
            GatewayEvent::MessageCreate(IncomingMessage {
                id: message.id,
                author_id: message.author.id,
                author_name: message.author.username,
                channel_id: message.channel_id,
                guild_id: message.guild_id,
                content: message.content,
                mentions: message.mentions.into_iter().map(|u| u.id).collect(),
            })
        }
        "GUILD_MEMBER_ADD" => {
            let member: MemberAddPayload = serde_json::from_value(data)?;
            GatewayEvent::MemberJoined {
                guild_id: member.guild_id,
                user_id: member.user.id,
                username: member.user.username,
            }
        }
        _ => return Ok(None),
    };
    Ok(Some(event))
}
