//! Configuration management for the bot.
//!
//! Every option comes from a `MACCER_*` environment variable. The binary
//! loads a `.env` file into the process environment before calling
//! [`Config::from_env`].

use crate::{CoreError, CoreResult};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Prefix shared by every environment variable.
pub const ENV_PREFIX: &str = "MACCER_";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default SQLite file for linked user records.
pub const DEFAULT_DATABASE_PATH: &str = "maccer.db";

/// Default period between forum profile checks while a verification is pending.
pub const DEFAULT_VERIFY_POLL_INTERVAL_SECS: u64 = 5;

/// Default lifetime of a verification session.
pub const DEFAULT_VERIFY_TIMEOUT_SECS: u64 = 300;

/// Default limit on a single chat or forum REST request.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Main bot configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Chat platform bot token.
    pub discord_token: String,
    /// The bot's own user id. Messages from this id are ignored.
    pub bot_id: String,
    /// Guild (server) the bot manages.
    pub guild_id: String,
    /// Role granted to verified members.
    pub verified_role: String,
    /// When set, every other user is ignored.
    pub debug_user: Option<String>,
    /// Channel for administrative commands.
    pub administrative_channel: String,
    /// Main channel the bot hangs out in.
    pub primary_channel: String,
    /// Channel that receives operational error reports.
    pub log_channel: String,
    /// Forum REST API base URL.
    pub forum_endpoint: String,
    /// Forum REST API key.
    pub forum_key: String,
    /// SQLite database file.
    pub database_path: String,
    /// Seconds between forum checks during a verification.
    pub verify_poll_interval_secs: u64,
    /// Seconds before a verification session expires.
    pub verify_timeout_secs: u64,
    /// Seconds before a chat or forum REST request is abandoned.
    pub http_timeout_secs: u64,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"<redacted>")
            .field("bot_id", &self.bot_id)
            .field("guild_id", &self.guild_id)
            .field("verified_role", &self.verified_role)
            .field("debug_user", &self.debug_user)
            .field("administrative_channel", &self.administrative_channel)
            .field("primary_channel", &self.primary_channel)
            .field("log_channel", &self.log_channel)
            .field("forum_endpoint", &self.forum_endpoint)
            .field("forum_key", &"<redacted>")
            .field("database_path", &self.database_path)
            .field("verify_poll_interval_secs", &self.verify_poll_interval_secs)
            .field("verify_timeout_secs", &self.verify_timeout_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> CoreResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// `lookup` receives full variable names (`MACCER_GUILD_ID`, ...).
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvSource { lookup };

        let config = Self {
            discord_token: env.required("DISCORD_TOKEN")?,
            bot_id: env.required("BOT_ID")?,
            guild_id: env.required("GUILD_ID")?,
            verified_role: env.required("VERIFIED_ROLE")?,
            debug_user: env.optional("DEBUG_USER"),
            administrative_channel: env.required("ADMINISTRATIVE_CHANNEL")?,
            primary_channel: env.required("PRIMARY_CHANNEL")?,
            log_channel: env.required("LOG_CHANNEL")?,
            forum_endpoint: env.required("FORUM_ENDPOINT")?,
            forum_key: env.required("FORUM_KEY")?,
            database_path: env
                .optional("DATABASE_PATH")
                .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string()),
            verify_poll_interval_secs: env
                .optional_u64("VERIFY_POLL_INTERVAL_SECS")?
                .unwrap_or(DEFAULT_VERIFY_POLL_INTERVAL_SECS),
            verify_timeout_secs: env
                .optional_u64("VERIFY_TIMEOUT_SECS")?
                .unwrap_or(DEFAULT_VERIFY_TIMEOUT_SECS),
            http_timeout_secs: env
                .optional_u64("HTTP_TIMEOUT_SECS")?
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
            log_level: env
                .optional("LOG_LEVEL")
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> CoreResult<()> {
        self.forum_url()?;
        if self.verify_poll_interval_secs == 0 {
            return Err(CoreError::Config(format!(
                "{}VERIFY_POLL_INTERVAL_SECS must be greater than zero",
                ENV_PREFIX
            )));
        }
        if self.http_timeout_secs == 0 {
            return Err(CoreError::Config(format!(
                "{}HTTP_TIMEOUT_SECS must be greater than zero",
                ENV_PREFIX
            )));
        }
        if self.verify_timeout_secs < self.verify_poll_interval_secs {
            return Err(CoreError::Config(format!(
                "{}VERIFY_TIMEOUT_SECS must not be shorter than the poll interval",
                ENV_PREFIX
            )));
        }
        Ok(())
    }

    /// Get the forum endpoint as a parsed URL.
    pub fn forum_url(&self) -> CoreResult<Url> {
        Url::parse(&self.forum_endpoint).map_err(CoreError::from)
    }

    pub fn verify_poll_interval(&self) -> Duration {
        Duration::from_secs(self.verify_poll_interval_secs)
    }

    pub fn verify_timeout(&self) -> Duration {
        Duration::from_secs(self.verify_timeout_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

struct EnvSource<F> {
    lookup: F,
}

impl<F> EnvSource<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(&format!("{}{}", ENV_PREFIX, key))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, key: &str) -> CoreResult<String> {
        self.optional(key)
            .ok_or_else(|| CoreError::Config(format!("{}{} must be set", ENV_PREFIX, key)))
    }

    fn optional_u64(&self, key: &str) -> CoreResult<Option<u64>> {
        self.optional(key)
            .map(|raw| {
                raw.parse::<u64>().map_err(|e| {
                    CoreError::Config(format!("{}{} is not a number: {}", ENV_PREFIX, key, e))
                })
            })
            .transpose()
    }
}
