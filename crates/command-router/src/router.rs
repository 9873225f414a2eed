//! Message classification and command dispatch.

use crate::{CommandRegistry, CommandSource, HandlerError, RouterError, RouterResult};
use async_trait::async_trait;
use chat_platform_client::{ChatClient, IncomingMessage};
use std::sync::Arc;
use tracing::{debug, info, Instrument, Span};

/// Channel ids that carry a fixed [`CommandSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    pub administrative_channel: String,
    pub primary_channel: String,
}

/// Answers whether a chat user has completed verification.
#[async_trait]
pub trait VerificationCheck: Send + Sync {
    async fn is_verified(&self, user_id: &str) -> Result<bool, HandlerError>;
}

/// What happened to one inbound message.
///
/// The channel is classified only after the trigger matches a registered
/// command, so plain chat never costs a channel lookup. As a consequence an
/// unmatched message has no `source`, and a lookup failure is only ever
/// surfaced for messages that name a command.
#[derive(Debug, Default)]
pub struct ProcessOutcome {
    /// A command matched the trigger.
    pub exists: bool,
    /// Classified source. `None` when no command matched.
    pub source: Option<CommandSource>,
    pub errors: Vec<RouterError>,
}

/// Resolves inbound messages to commands and runs them.
pub struct Router {
    registry: CommandRegistry,
    chat: Arc<dyn ChatClient>,
    channels: ChannelConfig,
    verification: Arc<dyn VerificationCheck>,
    span: Span,
}

/// Split `text` into a lowercase trigger and the untouched remainder.
pub fn split_trigger(text: &str) -> (String, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(idx) => {
            let (trigger, rest) = text.split_at(idx);
            let first_len = rest.chars().next().map(char::len_utf8).unwrap_or(0);
            (trigger.to_lowercase(), &rest[first_len..])
        }
        None => (text.to_lowercase(), ""),
    }
}

/// Number of whitespace-separated arguments in `args`.
pub fn parameter_count(args: &str) -> usize {
    args.split_whitespace().count()
}

impl Router {
    pub fn new(
        registry: CommandRegistry,
        chat: Arc<dyn ChatClient>,
        channels: ChannelConfig,
        verification: Arc<dyn VerificationCheck>,
        span: Span,
    ) -> Self {
        Self {
            registry,
            chat,
            channels,
            verification,
            span,
        }
    }

    /// Classify the channel a message arrived in.
    pub async fn classify(&self, channel_id: &str) -> RouterResult<CommandSource> {
        if channel_id == self.channels.administrative_channel {
            return Ok(CommandSource::Administrative);
        }
        if channel_id == self.channels.primary_channel {
            return Ok(CommandSource::Primary);
        }

        let kind = self
            .chat
            .channel_kind(channel_id)
            .await
            .map_err(|source| RouterError::ChannelLookup {
                channel_id: channel_id.to_string(),
                source,
            })?;

        Ok(if kind.is_private() {
            CommandSource::Private
        } else {
            CommandSource::Other
        })
    }

    /// Resolve and run the command named by `message`, if any.
    pub async fn process(&self, message: &IncomingMessage) -> ProcessOutcome {
        let span = tracing::debug_span!(
            parent: &self.span,
            "process",
            message_id = %message.id,
            user_id = %message.author_id,
            channel_id = %message.channel_id,
        );
        self.process_inner(message).instrument(span).await
    }

    async fn process_inner(&self, message: &IncomingMessage) -> ProcessOutcome {
        let mut outcome = ProcessOutcome::default();

        let (trigger, args) = split_trigger(&message.content);
        let count = parameter_count(args);

        let Some(command) = self.registry.get(&trigger) else {
            debug!(command = %trigger, "Ignoring unknown command");
            return outcome;
        };
        outcome.exists = true;

        let source = match self.classify(&message.channel_id).await {
            Ok(source) => source,
            Err(e) => {
                outcome.errors.push(e);
                return outcome;
            }
        };
        outcome.source = Some(source);

        if source != command.source {
            debug!(
                command = %trigger,
                source = %source,
                want_source = %command.source,
                "Ignoring command with incorrect source"
            );
            return outcome;
        }

        let expected_channel = match source {
            CommandSource::Administrative => Some(&self.channels.administrative_channel),
            CommandSource::Primary => Some(&self.channels.primary_channel),
            CommandSource::Private | CommandSource::Other => None,
        };
        if let Some(expected) = expected_channel {
            if &message.channel_id != expected {
                debug!(command = %trigger, "Ignoring command used in wrong channel");
                return outcome;
            }
        }

        if command.require_verified {
            match self.verification.is_verified(&message.author_id).await {
                Ok(true) => {}
                Ok(false) => {
                    debug!(command = %trigger, "Ignoring command from unverified user");
                    let notice = format!(
                        "You need to verify your forum account before using `{}`. Send me `verify <profile url>` in a direct message.",
                        trigger
                    );
                    self.reply(&message.channel_id, &notice, &mut outcome).await;
                    return outcome;
                }
                Err(source) => {
                    outcome.errors.push(RouterError::VerificationCheck {
                        user_id: message.author_id.clone(),
                        source,
                    });
                    return outcome;
                }
            }
        }

        if command.require_admin && message.channel_id != self.channels.administrative_channel {
            debug!(command = %trigger, "Ignoring admin command outside the administrative channel");
            return outcome;
        }

        if !command.parameters.contains(count) {
            debug!(command = %trigger, count, "Rejecting command with incorrect parameter count");
            self.reply(&message.channel_id, &command.help_text(), &mut outcome)
                .await;
            return outcome;
        }

        if let Err(source) = self.chat.signal_typing(&message.channel_id).await {
            outcome.errors.push(RouterError::Typing {
                channel_id: message.channel_id.clone(),
                source,
            });
            return outcome;
        }

        info!(command = %trigger, "Running command");
        match command.handler.run(args.trim(), message).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(command = %trigger, "Command reported unusable input");
                self.reply(&message.channel_id, &command.help_text(), &mut outcome)
                    .await;
            }
            Err(source) => outcome.errors.push(RouterError::Handler {
                trigger: command.trigger.clone(),
                source,
            }),
        }

        outcome
    }

    async fn reply(&self, channel_id: &str, text: &str, outcome: &mut ProcessOutcome) {
        if let Err(source) = self.chat.send_message(channel_id, text).await {
            outcome.errors.push(RouterError::Reply {
                channel_id: channel_id.to_string(),
                source,
            });
        }
    }
}
