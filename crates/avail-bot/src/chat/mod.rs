//! Chat REST client - the message-surface port implementation
//!
//! Speaks the chat service's REST API:
//!
//! - `POST   /channels/{channel_id}/messages` (send)
//! - `PUT    /channels/{channel_id}/messages/{message_id}/reactions/{emoji}/@me` (affordance)
//! - `DELETE /channels/{channel_id}/messages/{message_id}` (delete)
//!
//! Status mapping: 404 -> MessageNotFound, 403 -> Forbidden, 429/5xx ->
//! ChatUnavailable (retryable at the call site), anything else unexpected
//! -> ChatError.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use avail_common::ChatConfig;
use avail_core::{ChatPort, DomainError, RepoResult, Snowflake};

/// REST implementation of [`ChatPort`]
#[derive(Debug, Clone)]
pub struct RestChat {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    id: Snowflake,
}

impl RestChat {
    /// Create a chat client from configuration
    #[must_use]
    pub fn new(config: &ChatConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        }
    }

    fn auth(&self) -> String {
        format!("Bot {}", self.token)
    }

    fn map_status(status: StatusCode, message_id: Option<Snowflake>) -> DomainError {
        match status {
            StatusCode::NOT_FOUND => match message_id {
                Some(id) => DomainError::MessageNotFound(id),
                None => DomainError::ChatError("not found".to_string()),
            },
            StatusCode::FORBIDDEN => DomainError::Forbidden("chat service denied the call".to_string()),
            StatusCode::TOO_MANY_REQUESTS => {
                DomainError::ChatUnavailable("rate limited".to_string())
            }
            s if s.is_server_error() => DomainError::ChatUnavailable(format!("status {s}")),
            s => DomainError::ChatError(format!("unexpected status {s}")),
        }
    }

    fn transport_error(e: reqwest::Error) -> DomainError {
        DomainError::ChatUnavailable(e.to_string())
    }
}

#[async_trait]
impl ChatPort for RestChat {
    #[instrument(skip(self, text))]
    async fn send_message(&self, channel_id: Snowflake, text: &str) -> RepoResult<Snowflake> {
        let url = format!("{}/channels/{channel_id}/messages", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth())
            .json(&SendMessageRequest { content: text })
            .send()
            .await
            .map_err(Self::transport_error)?;

        if !response.status().is_success() {
            return Err(Self::map_status(response.status(), None));
        }

        let body: MessageResponse = response
            .json()
            .await
            .map_err(|e| DomainError::ChatError(format!("invalid message response: {e}")))?;
        Ok(body.id)
    }

    #[instrument(skip(self))]
    async fn add_reaction(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &str,
    ) -> RepoResult<()> {
        let url = format!(
            "{}/channels/{channel_id}/messages/{message_id}/reactions/{emoji}/@me",
            self.base_url
        );
        let response = self
            .client
            .put(&url)
            .header("Authorization", self.auth())
            .send()
            .await
            .map_err(Self::transport_error)?;

        if !response.status().is_success() {
            return Err(Self::map_status(response.status(), Some(message_id)));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> RepoResult<()> {
        let url = format!("{}/channels/{channel_id}/messages/{message_id}", self.base_url);
        let response = self
            .client
            .delete(&url)
            .header("Authorization", self.auth())
            .send()
            .await
            .map_err(Self::transport_error)?;

        if !response.status().is_success() {
            return Err(Self::map_status(response.status(), Some(message_id)));
        }
        Ok(())
    }
}
