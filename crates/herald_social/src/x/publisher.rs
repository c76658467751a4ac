use super::wire::{CreateTweet, CreatedTweet, Envelope, ReplySettings};
use super::{X_API_BASE, X_MAX_POST_LENGTH};
use crate::http::{build_client, error_from_response, json_body, transport_error};
use async_trait::async_trait;
use herald_core::{FinishedPost, PostId, PublishReceipt};
use herald_error::{HttpError, SocialError, SocialErrorKind};
use herald_interface::PublishBackend;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Publishes posts through `POST /2/tweets` with an OAuth 2.0 user access token.
#[derive(Debug, Clone)]
pub struct XPublisher {
    client: Client,
    token: String,
    base_url: String,
    max_len: usize,
}

impl XPublisher {
    /// Create a publisher against the public X API.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(user_access_token: impl Into<String>, timeout: Duration) -> Result<Self, HttpError> {
        Ok(Self {
            client: build_client(timeout)?,
            token: user_access_token.into(),
            base_url: X_API_BASE.to_string(),
            max_len: X_MAX_POST_LENGTH,
        })
    }

    /// Point the publisher at a different API origin.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the post length limit (premium accounts allow more).
    pub fn with_max_post_length(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }
}

#[async_trait]
impl PublishBackend for XPublisher {
    #[instrument(skip(self, post), fields(platform = "x", chars = post.char_count()))]
    async fn publish(
        &self,
        post: &FinishedPost,
        reply_to: Option<&PostId>,
    ) -> Result<PublishReceipt, SocialError> {
        let body = CreateTweet {
            text: post.as_str(),
            reply: reply_to.map(|id| ReplySettings {
                in_reply_to_tweet_id: id.0.as_str(),
            }),
        };

        debug!(reply = reply_to.is_some(), "Posting tweet");
        let response = self
            .client
            .post(format!("{}/2/tweets", self.base_url))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let created: Envelope<CreatedTweet> = json_body(response).await?;
        let tweet = created.data.ok_or_else(|| {
            SocialError::new(SocialErrorKind::Parse(
                "Create tweet response has no data".to_string(),
            ))
        })?;

        info!(tweet_id = %tweet.id, "Tweet published");
        Ok(PublishReceipt {
            id: Some(PostId(tweet.id)),
            platform: "x".to_string(),
        })
    }

    fn platform_name(&self) -> &str {
        "x"
    }

    fn max_post_length(&self) -> usize {
        self.max_len
    }
}
