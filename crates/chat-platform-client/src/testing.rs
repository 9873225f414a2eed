//! In-memory fakes for exercising code that depends on the chat seams.

use crate::{ChannelKind, ChatClient, ChatError, ChatResult, ErrorReporter, Role};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct RecordedChat {
    messages: Vec<(String, String)>,
    typing: Vec<String>,
    grants: Vec<(String, String, String)>,
    kinds: HashMap<String, ChannelKind>,
    roles: Vec<Role>,
    fail_sends: bool,
    fail_typing: bool,
    fail_grants: bool,
    fail_lookups: bool,
}

/// [`ChatClient`] that records every call.
///
/// Channels default to [`ChannelKind::Guild`] unless configured.
#[derive(Default)]
pub struct RecordingChatClient {
    inner: Mutex<RecordedChat>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl RecordingChatClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel(self, channel_id: &str, kind: ChannelKind) -> Self {
        lock(&self.inner).kinds.insert(channel_id.to_string(), kind);
        self
    }

    pub fn with_role(self, id: &str, name: &str) -> Self {
        lock(&self.inner).roles.push(Role {
            id: id.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub fn fail_sends(&self, fail: bool) {
        lock(&self.inner).fail_sends = fail;
    }

    pub fn fail_typing(&self, fail: bool) {
        lock(&self.inner).fail_typing = fail;
    }

    pub fn fail_grants(&self, fail: bool) {
        lock(&self.inner).fail_grants = fail;
    }

    pub fn fail_lookups(&self, fail: bool) {
        lock(&self.inner).fail_lookups = fail;
    }

    /// Every delivered `(channel, text)` pair, in order.
    pub fn messages(&self) -> Vec<(String, String)> {
        lock(&self.inner).messages.clone()
    }

    /// Texts delivered to one channel.
    pub fn messages_to(&self, channel_id: &str) -> Vec<String> {
        lock(&self.inner)
            .messages
            .iter()
            .filter(|(channel, _)| channel == channel_id)
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn typing(&self) -> Vec<String> {
        lock(&self.inner).typing.clone()
    }

    /// Every `(guild, user, role)` grant, in order.
    pub fn grants(&self) -> Vec<(String, String, String)> {
        lock(&self.inner).grants.clone()
    }
}

#[async_trait]
impl ChatClient for RecordingChatClient {
    async fn send_message(&self, channel_id: &str, text: &str) -> ChatResult<()> {
        let mut inner = lock(&self.inner);
        if inner.fail_sends {
            return Err(ChatError::Other("send rejected".to_string()));
        }
        inner
            .messages
            .push((channel_id.to_string(), text.to_string()));
        Ok(())
    }

    async fn channel_kind(&self, channel_id: &str) -> ChatResult<ChannelKind> {
        let inner = lock(&self.inner);
        if inner.fail_lookups {
            return Err(ChatError::Other("channel lookup rejected".to_string()));
        }
        Ok(inner
            .kinds
            .get(channel_id)
            .copied()
            .unwrap_or(ChannelKind::Guild))
    }

    async fn grant_role(&self, guild_id: &str, user_id: &str, role_id: &str) -> ChatResult<()> {
        let mut inner = lock(&self.inner);
        if inner.fail_grants {
            return Err(ChatError::Other("role grant rejected".to_string()));
        }
        inner.grants.push((
            guild_id.to_string(),
            user_id.to_string(),
            role_id.to_string(),
        ));
        Ok(())
    }

    async fn signal_typing(&self, channel_id: &str) -> ChatResult<()> {
        let mut inner = lock(&self.inner);
        if inner.fail_typing {
            return Err(ChatError::Other("typing rejected".to_string()));
        }
        inner.typing.push(channel_id.to_string());
        Ok(())
    }

    async fn guild_roles(&self, _guild_id: &str) -> ChatResult<Vec<Role>> {
        Ok(lock(&self.inner).roles.clone())
    }

    async fn open_direct_channel(&self, user_id: &str) -> ChatResult<String> {
        let channel_id = format!("dm-{}", user_id);
        lock(&self.inner)
            .kinds
            .insert(channel_id.clone(), ChannelKind::Direct);
        Ok(channel_id)
    }
}

/// [`ErrorReporter`] that keeps every report.
#[derive(Default)]
pub struct RecordingErrorReporter {
    reports: Mutex<Vec<String>>,
}

impl RecordingErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<String> {
        lock(&self.reports).clone()
    }
}

#[async_trait]
impl ErrorReporter for RecordingErrorReporter {
    async fn report(&self, text: &str) {
        lock(&self.reports).push(text.to_string());
    }
}
