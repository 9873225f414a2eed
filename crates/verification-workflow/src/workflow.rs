//! The `verify` command and session bookkeeping.

use crate::config::describe_duration;
use crate::{
    generate_code, parse_profile_url, SessionReport, VerificationConfig, VerificationSession,
    VerifyError, VerifyResult,
};
use async_trait::async_trait;
use chat_platform_client::{ChatClient, ErrorReporter, IncomingMessage};
use command_router::{Command, CommandHandler, CommandSource, HandlerError};
use forum_client::ForumClient;
use linked_user_store::UserStore;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tracing::{debug, info, warn, Instrument, Span};

/// External systems the workflow talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub chat: Arc<dyn ChatClient>,
    pub forum: Arc<dyn ForumClient>,
    pub store: Arc<dyn UserStore>,
    pub reporter: Arc<dyn ErrorReporter>,
}

/// Everything a running session needs, shared read-only between sessions.
pub struct WorkflowContext {
    pub chat: Arc<dyn ChatClient>,
    pub forum: Arc<dyn ForumClient>,
    pub store: Arc<dyn UserStore>,
    pub reporter: Arc<dyn ErrorReporter>,
    pub config: VerificationConfig,
}

type ActiveSet = Arc<Mutex<HashSet<String>>>;

fn lock(active: &ActiveSet) -> MutexGuard<'_, HashSet<String>> {
    active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Holds a requester's slot in the active set until dropped.
struct ActiveGuard {
    active: ActiveSet,
    user_id: String,
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        lock(&self.active).remove(&self.user_id);
    }
}

/// Starts verification sessions in response to `verify <profile url>`.
pub struct VerificationWorkflow {
    ctx: Arc<WorkflowContext>,
    active: ActiveSet,
    report_tx: mpsc::Sender<SessionReport>,
    span: Span,
}

impl VerificationWorkflow {
    pub fn new(
        collaborators: Collaborators,
        config: VerificationConfig,
        report_tx: mpsc::Sender<SessionReport>,
        span: Span,
    ) -> Self {
        let Collaborators {
            chat,
            forum,
            store,
            reporter,
        } = collaborators;

        Self {
            ctx: Arc::new(WorkflowContext {
                chat,
                forum,
                store,
                reporter,
                config,
            }),
            active: Arc::new(Mutex::new(HashSet::new())),
            report_tx,
            span,
        }
    }

    /// Registry entry for this workflow.
    pub fn command(self: &Arc<Self>) -> Command {
        Command::new("verify", CommandSource::Private, self.clone())
            .parameters(1, 1)
            .usage("verify <forum profile url>")
            .description("Verify you are the owner of a forum account and link it to your chat account")
            .example(format!("verify {}", self.ctx.config.profile_example))
    }

    /// True while `user_id` has a session polling.
    pub fn is_active(&self, user_id: &str) -> bool {
        lock(&self.active).contains(user_id)
    }

    fn try_claim(&self, user_id: &str) -> Option<ActiveGuard> {
        let mut active = lock(&self.active);
        if !active.insert(user_id.to_string()) {
            return None;
        }
        Some(ActiveGuard {
            active: self.active.clone(),
            user_id: user_id.to_string(),
        })
    }

    /// Handle one `verify` invocation.
    ///
    /// `Ok(false)` when the argument is not a profile URL. On success a
    /// session task is running by the time this returns.
    pub async fn start(&self, args: &str, message: &IncomingMessage) -> VerifyResult<bool> {
        let ctx = &self.ctx;
        let channel_id = message.channel_id.as_str();
        info!(user_id = %message.author_id, "Verification request received");

        let Some(forum_id) = parse_profile_url(args) else {
            debug!(args, "Argument is not a profile URL");
            ctx.chat
                .send_message(
                    channel_id,
                    &format!(
                        "That doesn't look like a forum profile link. It should look like: {}",
                        ctx.config.profile_example
                    ),
                )
                .await?;
            return Ok(false);
        };

        if ctx.store.get_user_by_chat(&message.author_id).await?.is_some() {
            ctx.chat
                .send_message(channel_id, "You are already verified!")
                .await?;
            return Ok(true);
        }

        if ctx.store.get_user_by_forum(&forum_id).await?.is_some() {
            ctx.chat
                .send_message(
                    channel_id,
                    "That forum account is already linked to another chat account.",
                )
                .await?;
            return Ok(true);
        }

        let Some(guard) = self.try_claim(&message.author_id) else {
            ctx.chat
                .send_message(
                    channel_id,
                    "You already have a verification in progress, finish that one first.",
                )
                .await?;
            return Ok(true);
        };

        let member = ctx
            .forum
            .get_member(&forum_id)
            .await
            .map_err(|source| VerifyError::ForumLookup {
                forum_id: forum_id.clone(),
                source,
            })?;
        debug!(forum_id = %forum_id, forum_name = %member.name, "Forum member found");

        let now = chrono::Utc::now();
        let expires_at = chrono::Duration::from_std(ctx.config.session_timeout)
            .map(|d| now + d)
            .unwrap_or(now);
        let session = VerificationSession {
            requester_id: message.author_id.clone(),
            requester_name: message.author_name.clone(),
            channel_id: channel_id.to_string(),
            forum_id: forum_id.clone(),
            code: generate_code(),
            expires_at,
        };

        ctx.chat
            .send_message(channel_id, &self.announcement(&session.code))
            .await?;

        self.spawn_session(session, guard);
        Ok(true)
    }

    fn announcement(&self, code: &str) -> String {
        let config = &self.ctx.config;
        format!(
            "Verification --\nPlease paste this unique token into the **{}** > **{}** section of your forum profile (Edit Profile). You have {}.\n\n`{}`",
            config.field_group,
            config.code_field,
            describe_duration(config.session_timeout),
            code
        )
    }

    fn spawn_session(&self, session: VerificationSession, guard: ActiveGuard) {
        let ctx = self.ctx.clone();
        let report_tx = self.report_tx.clone();
        let span = tracing::info_span!(
            parent: &self.span,
            "verification_session",
            user_id = %session.requester_id,
            forum_id = %session.forum_id,
        );

        tokio::spawn(
            async move {
                let requester = session.requester_id.clone();
                let forum_id = session.forum_id.clone();
                info!(expires_at = %session.expires_at, "Verification session started");

                let outcome = session.run(&ctx).await;
                drop(guard);
                info!(outcome = %outcome, "Verification session ended");

                let report = SessionReport {
                    requester,
                    forum_id,
                    outcome,
                };
                if report_tx.send(report).await.is_err() {
                    warn!("Session report receiver dropped");
                }
            }
            .instrument(span),
        );
    }
}

#[async_trait]
impl CommandHandler for VerificationWorkflow {
    async fn run(&self, args: &str, message: &IncomingMessage) -> Result<bool, HandlerError> {
        self.start(args, message)
            .instrument(self.span.clone())
            .await
            .map_err(Into::into)
    }
}
