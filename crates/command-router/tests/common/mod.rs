#![allow(dead_code)]

use async_trait::async_trait;
use chat_platform_client::{ChannelKind, IncomingMessage, RecordingChatClient};
use command_router::{
    ChannelConfig, Command, CommandHandler, CommandRegistry, CommandSource, HandlerError, Router,
    VerificationCheck,
};
use std::sync::{Arc, Mutex};

pub const ADMIN_CHANNEL: &str = "400";
pub const PRIMARY_CHANNEL: &str = "500";
pub const DM_CHANNEL: &str = "dm-1001";
pub const OTHER_CHANNEL: &str = "777";
pub const GROUP_DM_CHANNEL: &str = "888";

/// What a [`ScriptedHandler`] answers.
#[derive(Clone, Copy)]
pub enum Reply {
    Success,
    Unusable,
    Fail,
}

/// Handler that records its arguments and answers a fixed reply.
pub struct ScriptedHandler {
    reply: Reply,
    calls: Mutex<Vec<String>>,
}

impl ScriptedHandler {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandHandler for ScriptedHandler {
    async fn run(&self, args: &str, _message: &IncomingMessage) -> Result<bool, HandlerError> {
        self.calls.lock().unwrap().push(args.to_string());
        match self.reply {
            Reply::Success => Ok(true),
            Reply::Unusable => Ok(false),
            Reply::Fail => Err("forum unreachable".into()),
        }
    }
}

/// Verification check backed by a fixed list of verified users.
pub struct FixedVerification {
    verified: Vec<String>,
    fail: bool,
}

impl FixedVerification {
    pub fn of(users: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            verified: users.iter().map(|u| u.to_string()).collect(),
            fail: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            verified: Vec::new(),
            fail: true,
        })
    }
}

#[async_trait]
impl VerificationCheck for FixedVerification {
    async fn is_verified(&self, user_id: &str) -> Result<bool, HandlerError> {
        if self.fail {
            return Err("store offline".into());
        }
        Ok(self.verified.iter().any(|u| u == user_id))
    }
}

pub fn chat() -> Arc<RecordingChatClient> {
    Arc::new(
        RecordingChatClient::new()
            .with_channel(DM_CHANNEL, ChannelKind::Direct)
            .with_channel(OTHER_CHANNEL, ChannelKind::Guild)
            .with_channel(GROUP_DM_CHANNEL, ChannelKind::Group),
    )
}

pub fn channels() -> ChannelConfig {
    ChannelConfig {
        administrative_channel: ADMIN_CHANNEL.to_string(),
        primary_channel: PRIMARY_CHANNEL.to_string(),
    }
}

pub fn router(
    commands: Vec<Command>,
    chat: Arc<RecordingChatClient>,
    verification: Arc<FixedVerification>,
) -> Router {
    Router::new(
        CommandRegistry::new(commands).expect("registry"),
        chat,
        channels(),
        verification,
        tracing::Span::none(),
    )
}

pub fn message(channel_id: &str, content: &str) -> IncomingMessage {
    IncomingMessage {
        id: "900".to_string(),
        author_id: "1001".to_string(),
        author_name: "alice".to_string(),
        channel_id: channel_id.to_string(),
        guild_id: None,
        content: content.to_string(),
        mentions: Vec::new(),
    }
}

pub fn verify_command(handler: Arc<ScriptedHandler>) -> Command {
    Command::new("verify", CommandSource::Private, handler)
        .parameters(1, 1)
        .usage("verify <profile url>")
        .description("Link your forum account")
        .example("verify https://forum.example.com/profile/21-alice/")
}
