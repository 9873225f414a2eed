#![allow(dead_code)]

use async_trait::async_trait;
use chat_platform_client::{
    ChannelKind, IncomingMessage, RecordingChatClient, RecordingErrorReporter,
};
use command_router::{ChannelConfig, CommandRegistry, HandlerError, Router, VerificationCheck};
use forum_client::{ForumMember, StaticForumClient};
use linked_user_store::InMemoryUserStore;
use std::sync::Arc;
use tokio::sync::mpsc;
use verification_workflow::{
    Collaborators, SessionReport, VerificationConfig, VerificationWorkflow,
};

pub const DM_CHANNEL: &str = "dm-alice";
pub const GUILD: &str = "200";
pub const ROLE: &str = "300";
pub const REQUESTER: &str = "alice#0001";
pub const PROFILE_URL: &str = "https://forum.example.com/profile/21-alice/";

pub const CONFIRMATION: &str = "Your accounts have been linked and you have been verified!";
pub const EXPIRED: &str = "Your time has expired, please try again.";

struct NoVerificationNeeded;

#[async_trait]
impl VerificationCheck for NoVerificationNeeded {
    async fn is_verified(&self, _user_id: &str) -> Result<bool, HandlerError> {
        Ok(false)
    }
}

pub struct Harness {
    pub chat: Arc<RecordingChatClient>,
    pub forum: Arc<StaticForumClient>,
    pub store: Arc<InMemoryUserStore>,
    pub reporter: Arc<RecordingErrorReporter>,
    pub workflow: Arc<VerificationWorkflow>,
    pub router: Router,
    pub reports: mpsc::Receiver<SessionReport>,
}

/// Profile of forum account 21 with the verification field group.
pub fn member(code: Option<&str>) -> ForumMember {
    ForumMember::new("21", "alice")
        .with_field("3", "Discord", "7", "Verification Code", code)
        .with_field("3", "Discord", "8", "Discord Username", None)
        .with_field("3", "Discord", "9", "Discord ID", None)
}

pub fn harness() -> Harness {
    harness_with(InMemoryUserStore::new(), StaticForumClient::with_member(member(None)))
}

pub fn harness_with(store: InMemoryUserStore, forum: StaticForumClient) -> Harness {
    let chat = Arc::new(RecordingChatClient::new().with_channel(DM_CHANNEL, ChannelKind::Direct));
    let forum = Arc::new(forum);
    let store = Arc::new(store);
    let reporter = Arc::new(RecordingErrorReporter::new());
    let (report_tx, reports) = mpsc::channel(16);

    let workflow = Arc::new(VerificationWorkflow::new(
        Collaborators {
            chat: chat.clone(),
            forum: forum.clone(),
            store: store.clone(),
            reporter: reporter.clone(),
        },
        VerificationConfig::new(GUILD, ROLE),
        report_tx,
        tracing::Span::none(),
    ));

    let router = Router::new(
        CommandRegistry::new([workflow.command()]).expect("registry"),
        chat.clone(),
        ChannelConfig {
            administrative_channel: "400".to_string(),
            primary_channel: "500".to_string(),
        },
        Arc::new(NoVerificationNeeded),
        tracing::Span::none(),
    );

    Harness {
        chat,
        forum,
        store,
        reporter,
        workflow,
        router,
        reports,
    }
}

pub fn dm(content: &str) -> IncomingMessage {
    IncomingMessage {
        id: "900".to_string(),
        author_id: REQUESTER.to_string(),
        author_name: "alice".to_string(),
        channel_id: DM_CHANNEL.to_string(),
        guild_id: None,
        content: content.to_string(),
        mentions: Vec::new(),
    }
}

impl Harness {
    pub fn replies(&self) -> Vec<String> {
        self.chat.messages_to(DM_CHANNEL)
    }

    /// The code from the most recent announcement.
    pub fn issued_code(&self) -> String {
        self.replies()
            .iter()
            .rev()
            .find(|text| text.starts_with("Verification --"))
            .and_then(|text| text.split('`').nth(1))
            .expect("no code announced")
            .to_string()
    }

    pub fn mismatch_replies(&self) -> Vec<String> {
        self.replies()
            .into_iter()
            .filter(|text| text.starts_with("The codes did not match"))
            .collect()
    }

    pub async fn start_verification(&self) {
        let outcome = self
            .router
            .process(&dm(&format!("verify {}", PROFILE_URL)))
            .await;
        assert!(outcome.exists);
        assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
    }

    pub fn grants(&self) -> Vec<(String, String, String)> {
        self.chat.grants()
    }
}

pub fn grant(guild: &str, user: &str, role: &str) -> (String, String, String) {
    (guild.to_string(), user.to_string(), role.to_string())
}
