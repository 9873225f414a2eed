//! Discord REST API client (v10).
//!
//! Covers the handful of endpoints the bot needs: posting messages,
//! channel lookup, typing, role management and direct channels.

use crate::{ChannelKind, ChatClient, ChatError, ChatResult, Role};
use async_trait::async_trait;
use bot_config_and_utils::summarize_response_body;
use serde::Deserialize;
use std::time::Duration;

/// Default REST base URL.
pub const DISCORD_API_BASE: &str = "https://discord.com/api/v10";

const USER_AGENT: &str = concat!(
    "DiscordBot (https://github.com/Southclaws/maccer, ",
    env!("CARGO_PKG_VERSION"),
    ")"
);

#[derive(Debug, Deserialize)]
struct ChannelPayload {
    id: String,
    #[serde(rename = "type")]
    kind: u8,
}

/// Discord REST client authenticated as a bot.
#[derive(Clone)]
pub struct DiscordRestClient {
    http_client: reqwest::Client,
    api_base: String,
    token: String,
}

impl DiscordRestClient {
    /// Every request is abandoned after `timeout`.
    pub fn new(token: impl Into<String>, timeout: Duration) -> ChatResult<Self> {
        Self::with_base_url(DISCORD_API_BASE, token, timeout)
    }

    /// Point the client at a different API root (proxies, tests).
    pub fn with_base_url(
        api_base: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> ChatResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http_client
            .request(method, self.url(path))
            .header("Authorization", format!("Bot {}", self.token))
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/json")
    }

    async fn check(response: reqwest::Response, action: &str) -> ChatResult<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let body_summary = summarize_response_body(&body);
        tracing::error!(status = %status, body_summary = %body_summary, action, "Discord request failed");
        Err(ChatError::Api {
            status: status.as_u16(),
            message: format!("{} failed ({})", action, body_summary),
        })
    }
}

#[async_trait]
impl ChatClient for DiscordRestClient {
    async fn send_message(&self, channel_id: &str, text: &str) -> ChatResult<()> {
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/channels/{}/messages", channel_id),
            )
            .json(&serde_json::json!({ "content": text }))
            .send()
            .await?;
        Self::check(response, "send message").await?;
        tracing::debug!(channel_id, "Message sent");
        Ok(())
    }

    async fn channel_kind(&self, channel_id: &str) -> ChatResult<ChannelKind> {
        let response = self
            .request(reqwest::Method::GET, &format!("/channels/{}", channel_id))
            .send()
            .await?;
        let channel: ChannelPayload = Self::check(response, "get channel").await?.json().await?;
        tracing::trace!(channel_id = %channel.id, kind = channel.kind, "Channel resolved");
        Ok(ChannelKind::from_discord_type(channel.kind))
    }

    async fn grant_role(&self, guild_id: &str, user_id: &str, role_id: &str) -> ChatResult<()> {
        let response = self
            .request(
                reqwest::Method::PUT,
                &format!("/guilds/{}/members/{}/roles/{}", guild_id, user_id, role_id),
            )
            .header("Content-Length", "0")
            .send()
            .await?;
        Self::check(response, "grant role").await?;
        tracing::info!(guild_id, user_id, role_id, "Role granted");
        Ok(())
    }

    async fn signal_typing(&self, channel_id: &str) -> ChatResult<()> {
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/channels/{}/typing", channel_id),
            )
            .header("Content-Length", "0")
            .send()
            .await?;
        Self::check(response, "trigger typing").await?;
        Ok(())
    }

    async fn guild_roles(&self, guild_id: &str) -> ChatResult<Vec<Role>> {
        let response = self
            .request(reqwest::Method::GET, &format!("/guilds/{}/roles", guild_id))
            .send()
            .await?;
        let roles: Vec<Role> = Self::check(response, "list roles").await?.json().await?;
        tracing::debug!(guild_id, count = roles.len(), "Fetched guild roles");
        Ok(roles)
    }

    async fn open_direct_channel(&self, user_id: &str) -> ChatResult<String> {
        let response = self
            .request(reqwest::Method::POST, "/users/@me/channels")
            .json(&serde_json::json!({ "recipient_id": user_id }))
            .send()
            .await?;
        let channel: ChannelPayload = Self::check(response, "open dm").await?.json().await?;
        Ok(channel.id)
    }
}
