//! Invision Community REST API client.

use crate::models::RawMember;
use crate::{ForumClient, ForumError, ForumMember, ForumResult};
use async_trait::async_trait;
use bot_config_and_utils::summarize_response_body;
use std::time::Duration;

/// Invision REST client. The API key is sent as the basic-auth user.
#[derive(Clone)]
pub struct InvisionClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl InvisionClient {
    /// # Arguments
    /// * `endpoint` - API root, e.g. `https://forum.example.com/api`
    /// * `api_key` - REST API key
    /// * `timeout` - per-request limit, covering connect through body
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> ForumResult<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn member_url(&self, id: &str) -> String {
        format!("{}/core/members/{}", self.endpoint, id)
    }

    async fn check(
        response: reqwest::Response,
        member_id: &str,
        action: &str,
    ) -> ForumResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ForumError::NotFound(member_id.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        let body_summary = summarize_response_body(&body);
        tracing::error!(status = %status, body_summary = %body_summary, member_id, action, "Forum request failed");
        Err(ForumError::Api {
            status: status.as_u16(),
            message: format!("{} failed ({})", action, body_summary),
        })
    }
}

/// Form body for `POST /core/members/{id}`.
pub(crate) fn update_form(member: &ForumMember) -> Vec<(String, String)> {
    member
        .field_values()
        .into_iter()
        .map(|(field_id, value)| (format!("customFields[{}]", field_id), value))
        .collect()
}

#[async_trait]
impl ForumClient for InvisionClient {
    async fn get_member(&self, id: &str) -> ForumResult<ForumMember> {
        tracing::debug!(member_id = id, "Fetching forum member");

        let response = self
            .http_client
            .get(self.member_url(id))
            .basic_auth(&self.api_key, None::<&str>)
            .header("Accept", "application/json")
            .send()
            .await?;

        let raw: RawMember = Self::check(response, id, "get member").await?.json().await?;
        Ok(raw.into())
    }

    async fn update_member(&self, member: &ForumMember) -> ForumResult<()> {
        let form = update_form(member);
        tracing::debug!(member_id = %member.id, fields = form.len(), "Updating forum member");

        let response = self
            .http_client
            .post(self.member_url(&member.id))
            .basic_auth(&self.api_key, None::<&str>)
            .header("Accept", "application/json")
            .form(&form)
            .send()
            .await?;

        Self::check(response, &member.id, "update member").await?;
        Ok(())
    }
}
