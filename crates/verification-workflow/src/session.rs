//! A single verification session and its polling loop.
//!
//! The session is owned by one spawned task. Each tick fetches the forum
//! profile and compares the pasted value with the issued code; a separate
//! deadline ends the session. Both timers are raced with a biased select so
//! that a tick landing on the deadline is never processed, and a profile
//! fetch still in flight at the deadline is abandoned. Linking after a match
//! runs to completion.

use crate::error::{LinkError, LinkStep};
use crate::WorkflowContext;
use chrono::{DateTime, Utc};
use forum_client::ForumMember;
use linked_user_store::NewLinkedUser;
use std::fmt;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Matched,
    Expired,
    Failed(String),
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Matched => f.write_str("matched"),
            Self::Expired => f.write_str("expired"),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Sent once per session when it ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub requester: String,
    pub forum_id: String,
    pub outcome: SessionOutcome,
}

/// An in-flight verification.
#[derive(Debug, Clone)]
pub struct VerificationSession {
    pub requester_id: String,
    pub requester_name: String,
    pub channel_id: String,
    pub forum_id: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

enum Tick {
    Continue,
    Done(SessionOutcome),
}

impl VerificationSession {
    /// Poll until the code shows up, something breaks, or time runs out.
    pub async fn run(self, ctx: &WorkflowContext) -> SessionOutcome {
        let period = ctx.config.poll_interval;
        let start = Instant::now();
        let expires = start + ctx.config.session_timeout;
        let deadline = tokio::time::sleep_until(expires);
        tokio::pin!(deadline);

        let mut ticker = interval_at(start + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut last_mismatch: Option<String> = None;

        loop {
            tokio::select! {
                biased;

                _ = &mut deadline => return self.expire(ctx).await,
                _ = ticker.tick() => {
                    match self.check(ctx, expires, &mut last_mismatch).await {
                        Tick::Continue => {}
                        Tick::Done(outcome) => return outcome,
                    }
                }
            }
        }
    }

    async fn expire(&self, ctx: &WorkflowContext) -> SessionOutcome {
        info!("Verification session expired");
        self.tell(ctx, "Your time has expired, please try again.").await;
        SessionOutcome::Expired
    }

    async fn check(
        &self,
        ctx: &WorkflowContext,
        expires: Instant,
        last_mismatch: &mut Option<String>,
    ) -> Tick {
        let config = &ctx.config;

        let fetched = tokio::time::timeout_at(expires, ctx.forum.get_member(&self.forum_id)).await;
        let member = match fetched {
            Ok(Ok(member)) => member,
            Err(_) => {
                warn!(forum_id = %self.forum_id, "Forum profile fetch still pending at deadline");
                return Tick::Done(self.expire(ctx).await);
            }
            Ok(Err(e)) => {
                let reason = format!("loading forum profile {}: {}", self.forum_id, e);
                return Tick::Done(self.fail_internal(ctx, reason).await);
            }
        };

        let Some(group) = member.group(&config.field_group) else {
            let reason = format!(
                "forum profile {} has no '{}' field group",
                self.forum_id, config.field_group
            );
            return Tick::Done(self.fail_internal(ctx, reason).await);
        };

        let pasted = group
            .fields
            .get(&config.code_field)
            .and_then(|field| field.value.as_deref())
            .map(str::trim)
            .unwrap_or_default();

        if pasted.len() < config.min_code_len {
            debug!("Verification code not pasted yet");
            return Tick::Continue;
        }

        if pasted == self.code {
            info!("Verification code matched");
            return Tick::Done(self.link(ctx, &member).await);
        }

        if last_mismatch.as_deref() != Some(pasted) {
            debug!("Verification code mismatch");
            self.tell(
                ctx,
                &format!(
                    "The codes did not match, the code you were given was '{}' and the code on your profile was '{}'",
                    self.code, pasted
                ),
            )
            .await;
            *last_mismatch = Some(pasted.to_string());
        }
        Tick::Continue
    }

    async fn link(&self, ctx: &WorkflowContext, member: &ForumMember) -> SessionOutcome {
        match self.try_link(ctx, member).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let reason = e.to_string();
                ctx.reporter
                    .report(&format!(
                        "Verification of user {} with forum account {} failed: {}",
                        self.requester_id, self.forum_id, reason
                    ))
                    .await;
                if e.step != LinkStep::Confirm {
                    self.tell(
                        ctx,
                        "Something went wrong while linking your accounts. The staff have been notified.",
                    )
                    .await;
                }
                SessionOutcome::Failed(reason)
            }
        }
    }

    async fn try_link(
        &self,
        ctx: &WorkflowContext,
        member: &ForumMember,
    ) -> Result<SessionOutcome, LinkError> {
        let config = &ctx.config;

        let record = NewLinkedUser::new(self.requester_id.clone(), self.forum_id.clone());
        match ctx.store.create_user(record).await {
            Ok(_) => {}
            Err(e) if e.is_duplicate() => {
                info!(error = %e, "Identity already linked");
                self.tell(
                    ctx,
                    "That chat account or forum account is already linked to someone else.",
                )
                .await;
                return Ok(SessionOutcome::Failed(format!("already linked ({})", e)));
            }
            Err(e) => return Err(LinkError::new(LinkStep::StoreRecord, e)),
        }

        let mut confirmed = member.clone();
        let wrote_name =
            confirmed.set_field(&config.field_group, &config.username_field, &self.requester_name);
        let wrote_id =
            confirmed.set_field(&config.field_group, &config.chat_id_field, &self.requester_id);
        if wrote_name || wrote_id {
            if let Err(e) = ctx.forum.update_member(&confirmed).await {
                warn!(error = %e, "Failed to write chat identity to forum profile");
            }
        } else {
            debug!("Forum profile has no chat identity fields to fill");
        }

        ctx.chat
            .grant_role(&config.guild_id, &self.requester_id, &config.verified_role)
            .await
            .map_err(|e| LinkError::new(LinkStep::GrantRole, e))?;

        ctx.chat
            .send_message(
                &self.channel_id,
                "Your accounts have been linked and you have been verified!",
            )
            .await
            .map_err(|e| LinkError::new(LinkStep::Confirm, e))?;

        Ok(SessionOutcome::Matched)
    }

    async fn fail_internal(&self, ctx: &WorkflowContext, reason: String) -> SessionOutcome {
        warn!(reason = %reason, "Verification session failed");
        ctx.reporter
            .report(&format!(
                "Verification of user {} failed: {}",
                self.requester_id, reason
            ))
            .await;
        self.tell(
            ctx,
            "There was an error while loading your profile information. The staff have been notified, please try again later.",
        )
        .await;
        SessionOutcome::Failed(reason)
    }

    async fn tell(&self, ctx: &WorkflowContext, text: &str) {
        if let Err(e) = ctx.chat.send_message(&self.channel_id, text).await {
            warn!(error = %e, "Failed to message verification requester");
        }
    }
}
