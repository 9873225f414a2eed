//! Scriptable forum fake, built for tests and the `testing` feature.

use crate::{ForumClient, ForumError, ForumMember, ForumResult};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

#[derive(Clone)]
enum Scripted {
    Member(ForumMember),
    Failure(String),
}

#[derive(Default)]
struct ForumState {
    script: VecDeque<Scripted>,
    gets: usize,
    updates: Vec<ForumMember>,
    fail_updates: bool,
    stall_lookups: bool,
}

/// [`ForumClient`] answering `get_member` from a script.
///
/// Responses are consumed in order; the last one repeats forever. An empty
/// script answers `NotFound`.
#[derive(Default)]
pub struct StaticForumClient {
    state: Mutex<ForumState>,
}

impl StaticForumClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(member: ForumMember) -> Self {
        let client = Self::new();
        client.push_member(member);
        client
    }

    pub fn push_member(&self, member: ForumMember) {
        self.lock().script.push_back(Scripted::Member(member));
    }

    pub fn push_failure(&self, message: &str) {
        self.lock()
            .script
            .push_back(Scripted::Failure(message.to_string()));
    }

    /// Replace the whole script with a single repeating member.
    pub fn set_member(&self, member: ForumMember) {
        let mut state = self.lock();
        state.script.clear();
        state.script.push_back(Scripted::Member(member));
    }

    pub fn fail_updates(&self, fail: bool) {
        self.lock().fail_updates = fail;
    }

    /// Make `get_member` hang forever, like a server that never answers.
    pub fn stall_lookups(&self, stall: bool) {
        self.lock().stall_lookups = stall;
    }

    /// Number of `get_member` calls so far.
    pub fn get_calls(&self) -> usize {
        self.lock().gets
    }

    pub fn updates(&self) -> Vec<ForumMember> {
        self.lock().updates.clone()
    }

    fn lock(&self) -> MutexGuard<'_, ForumState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ForumClient for StaticForumClient {
    async fn get_member(&self, id: &str) -> ForumResult<ForumMember> {
        let (next, stalled) = {
            let mut state = self.lock();
            state.gets += 1;

            let next = if state.script.len() > 1 {
                state.script.pop_front()
            } else {
                state.script.front().cloned()
            };
            (next, state.stall_lookups)
        };

        if stalled {
            std::future::pending::<()>().await;
        }

        match next {
            Some(Scripted::Member(member)) => Ok(member),
            Some(Scripted::Failure(message)) => Err(ForumError::Other(message)),
            None => Err(ForumError::NotFound(id.to_string())),
        }
    }

    async fn update_member(&self, member: &ForumMember) -> ForumResult<()> {
        let mut state = self.lock();
        if state.fail_updates {
            return Err(ForumError::Other("update rejected".to_string()));
        }
        state.updates.push(member.clone());
        Ok(())
    }
}
