//! Operational error reporting.

use crate::ChatClient;
use async_trait::async_trait;
use std::sync::Arc;

/// Sink for operational errors that operators should see.
#[async_trait]
pub trait ErrorReporter: Send + Sync {
    async fn report(&self, text: &str);
}

/// Posts reports into a chat channel.
///
/// A report that cannot be delivered is logged at error level instead.
pub struct ChannelErrorReporter {
    chat: Arc<dyn ChatClient>,
    channel_id: String,
}

impl ChannelErrorReporter {
    pub fn new(chat: Arc<dyn ChatClient>, channel_id: impl Into<String>) -> Self {
        Self {
            chat,
            channel_id: channel_id.into(),
        }
    }
}

#[async_trait]
impl ErrorReporter for ChannelErrorReporter {
    async fn report(&self, text: &str) {
        tracing::warn!(report = %text, "Reporting error to log channel");
        if let Err(e) = self.chat.send_message(&self.channel_id, text).await {
            tracing::error!(
                error = %e,
                channel_id = %self.channel_id,
                report = %text,
                "Failed to deliver error report"
            );
        }
    }
}
