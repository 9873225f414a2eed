//! Command definitions and the registry.

use crate::{HandlerError, RouterError, RouterResult};
use async_trait::async_trait;
use chat_platform_client::IncomingMessage;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Where a message came from, as far as commands are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandSource {
    /// The configured administrative channel.
    Administrative,
    /// The configured primary channel.
    Primary,
    /// A direct conversation with the bot.
    Private,
    /// Anywhere else.
    Other,
}

impl fmt::Display for CommandSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Administrative => "administrative",
            Self::Primary => "primary",
            Self::Private => "private",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// Inclusive bounds on the number of whitespace-separated arguments.
///
/// A negative bound is unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterRange {
    pub min: i32,
    pub max: i32,
}

impl ParameterRange {
    pub const ANY: Self = Self { min: -1, max: -1 };

    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub const fn exactly(count: i32) -> Self {
        Self {
            min: count,
            max: count,
        }
    }

    pub fn contains(&self, count: usize) -> bool {
        let count = i64::try_from(count).unwrap_or(i64::MAX);
        if self.min >= 0 && count < i64::from(self.min) {
            return false;
        }
        if self.max >= 0 && count > i64::from(self.max) {
            return false;
        }
        true
    }
}

/// Behaviour behind a trigger.
///
/// `Ok(false)` means the input was unusable; the router answers with the
/// command's usage text. Errors are handed back to the router's caller.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn run(&self, args: &str, message: &IncomingMessage) -> Result<bool, HandlerError>;
}

/// A registered command.
#[derive(Clone)]
pub struct Command {
    pub trigger: String,
    pub handler: Arc<dyn CommandHandler>,
    pub source: CommandSource,
    pub parameters: ParameterRange,
    pub usage: String,
    pub description: String,
    pub example: String,
    pub require_verified: bool,
    pub require_admin: bool,
}

impl Command {
    pub fn new(
        trigger: impl Into<String>,
        source: CommandSource,
        handler: Arc<dyn CommandHandler>,
    ) -> Self {
        Self {
            trigger: trigger.into(),
            handler,
            source,
            parameters: ParameterRange::ANY,
            usage: String::new(),
            description: String::new(),
            example: String::new(),
            require_verified: false,
            require_admin: false,
        }
    }

    pub fn parameters(mut self, min: i32, max: i32) -> Self {
        self.parameters = ParameterRange::new(min, max);
        self
    }

    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn example(mut self, example: impl Into<String>) -> Self {
        self.example = example.into();
        self
    }

    pub fn require_verified(mut self) -> Self {
        self.require_verified = true;
        self
    }

    pub fn require_admin(mut self) -> Self {
        self.require_admin = true;
        self
    }

    /// `usage`, `description` and `example`, one per line.
    pub fn help_text(&self) -> String {
        format!("{}\n{}\n{}", self.usage, self.description, self.example)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("trigger", &self.trigger)
            .field("source", &self.source)
            .field("parameters", &self.parameters)
            .field("require_verified", &self.require_verified)
            .field("require_admin", &self.require_admin)
            .finish_non_exhaustive()
    }
}

/// Immutable trigger -> command map. Keys are lowercase.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Command>,
}

impl CommandRegistry {
    /// Build the registry, rejecting triggers that collide case-insensitively.
    pub fn new(commands: impl IntoIterator<Item = Command>) -> RouterResult<Self> {
        let mut map = HashMap::new();
        for command in commands {
            let key = command.trigger.to_lowercase();
            if map.contains_key(&key) {
                return Err(RouterError::DuplicateTrigger(key));
            }
            map.insert(key, command);
        }
        Ok(Self { commands: map })
    }

    pub fn get(&self, trigger: &str) -> Option<&Command> {
        self.commands.get(&trigger.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Registered triggers, sorted.
    pub fn triggers(&self) -> Vec<&str> {
        let mut triggers: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        triggers.sort_unstable();
        triggers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    #[async_trait]
    impl CommandHandler for Noop {
        async fn run(&self, _args: &str, _message: &IncomingMessage) -> Result<bool, HandlerError> {
            Ok(true)
        }
    }

    fn command(trigger: &str) -> Command {
        Command::new(trigger, CommandSource::Private, Arc::new(Noop))
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = CommandRegistry::new([command("Verify")]).unwrap();
        assert!(registry.get("verify").is_some());
        assert!(registry.get("VERIFY").is_some());
        assert!(registry.get("whois").is_none());
        assert_eq!(registry.triggers(), vec!["verify"]);
    }

    #[test]
    fn test_duplicate_trigger_rejected() {
        let err = CommandRegistry::new([command("verify"), command("VERIFY")]).unwrap_err();
        assert!(matches!(err, RouterError::DuplicateTrigger(t) if t == "verify"));
    }

    #[test]
    fn test_parameter_range() {
        let exactly_one = ParameterRange::exactly(1);
        assert!(!exactly_one.contains(0));
        assert!(exactly_one.contains(1));
        assert!(!exactly_one.contains(2));

        let at_least_one = ParameterRange::new(1, -1);
        assert!(at_least_one.contains(50));
        assert!(!at_least_one.contains(0));

        assert!(ParameterRange::ANY.contains(0));
        assert!(ParameterRange::ANY.contains(usize::MAX));
    }

    #[test]
    fn test_help_text_layout() {
        let cmd = command("verify")
            .usage("verify <url>")
            .description("Link your forum account")
            .example("verify https://forum.example.com/profile/21-alice/");
        assert_eq!(
            cmd.help_text(),
            "verify <url>\nLink your forum account\nverify https://forum.example.com/profile/21-alice/"
        );
    }
}
