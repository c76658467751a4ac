//! Discord webhook publisher.

use crate::http::{build_client, error_from_response, json_body, transport_error};
use async_trait::async_trait;
use herald_core::{FinishedPost, PostId, PublishReceipt};
use herald_error::{HttpError, SocialError};
use herald_interface::PublishBackend;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, instrument};

/// Discord message content limit.
pub const DISCORD_MAX_CONTENT: usize = 2000;

#[derive(Debug, Serialize)]
struct WebhookMessage<'a> {
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_reference: Option<MessageReference<'a>>,
}

#[derive(Debug, Serialize)]
struct MessageReference<'a> {
    message_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct WebhookResponse {
    id: String,
}

/// Publishes posts to a channel through an incoming webhook.
///
/// Uses `?wait=true` so Discord returns the created message and its id.
#[derive(Debug, Clone)]
pub struct DiscordWebhookPublisher {
    client: Client,
    webhook_url: String,
    max_len: usize,
}

impl DiscordWebhookPublisher {
    /// Create a publisher for `webhook_url`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(webhook_url: impl Into<String>, timeout: Duration) -> Result<Self, HttpError> {
        Ok(Self {
            client: build_client(timeout)?,
            webhook_url: webhook_url.into(),
            max_len: DISCORD_MAX_CONTENT,
        })
    }

    /// Cap posts below Discord's own limit.
    pub fn with_max_post_length(mut self, max_len: usize) -> Self {
        self.max_len = max_len.min(DISCORD_MAX_CONTENT);
        self
    }
}

#[async_trait]
impl PublishBackend for DiscordWebhookPublisher {
    #[instrument(skip(self, post), fields(platform = "discord", chars = post.char_count()))]
    async fn publish(
        &self,
        post: &FinishedPost,
        reply_to: Option<&PostId>,
    ) -> Result<PublishReceipt, SocialError> {
        let message = WebhookMessage {
            content: post.as_str(),
            message_reference: reply_to.map(|id| MessageReference {
                message_id: id.0.as_str(),
            }),
        };

        let response = self
            .client
            .post(&self.webhook_url)
            .query(&[("wait", "true")])
            .json(&message)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let created: WebhookResponse = json_body(response).await?;
        info!(message_id = %created.id, "Discord message published");
        Ok(PublishReceipt {
            id: Some(PostId(created.id)),
            platform: "discord".to_string(),
        })
    }

    fn platform_name(&self) -> &str {
        "discord"
    }

    fn max_post_length(&self) -> usize {
        self.max_len
    }
}
