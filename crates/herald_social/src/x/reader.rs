use super::X_API_BASE;
use super::wire::{Envelope, Tweet, User};
use crate::http::{build_client, error_from_response, json_body, transport_error};
use async_trait::async_trait;
use herald_core::{AccountPost, AccountPostBuilder, PostId};
use herald_error::{HttpError, SocialError, SocialErrorKind};
use herald_interface::AccountReader;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// The timeline endpoint accepts `max_results` in `5..=100`.
const MIN_RESULTS: usize = 5;
const MAX_RESULTS: usize = 100;

/// Reads another account's recent posts with an app-only bearer token.
#[derive(Debug, Clone)]
pub struct XAccountReader {
    client: Client,
    bearer_token: String,
    base_url: String,
}

impl XAccountReader {
    /// Create a reader against the public X API.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(bearer_token: impl Into<String>, timeout: Duration) -> Result<Self, HttpError> {
        Ok(Self {
            client: build_client(timeout)?,
            bearer_token: bearer_token.into(),
            base_url: X_API_BASE.to_string(),
        })
    }

    /// Point the reader at a different API origin.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, String)],
    ) -> Result<Envelope<T>, SocialError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.bearer_token)
            .query(query)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        json_body(response).await
    }

    async fn user_id(&self, username: &str) -> Result<String, SocialError> {
        let handle = username.trim_start_matches('@');
        let user: Envelope<User> = self
            .get(format!("{}/2/users/by/username/{}", self.base_url, handle), &[])
            .await?;
        user.data
            .map(|u| u.id)
            .ok_or_else(|| SocialError::new(SocialErrorKind::NotFound(handle.to_string())))
    }
}

fn to_account_post(tweet: Tweet) -> Result<AccountPost, SocialError> {
    let metrics = tweet.public_metrics.unwrap_or_default();
    let created_at = tweet.created_at.ok_or_else(|| {
        SocialError::new(SocialErrorKind::Parse(format!(
            "Tweet {} has no created_at",
            tweet.id
        )))
    })?;
    AccountPostBuilder::default()
        .id(PostId(tweet.id))
        .text(tweet.text)
        .created_at(created_at)
        .like_count(metrics.like_count)
        .share_count(metrics.retweet_count.saturating_add(metrics.quote_count))
        .build()
        .map_err(|e| SocialError::new(SocialErrorKind::Parse(e.to_string())))
}

#[async_trait]
impl AccountReader for XAccountReader {
    #[instrument(skip(self), fields(platform = "x"))]
    async fn recent_posts(
        &self,
        account: &str,
        limit: usize,
    ) -> Result<Vec<AccountPost>, SocialError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let id = self.user_id(account).await?;
        let max_results = limit.clamp(MIN_RESULTS, MAX_RESULTS);
        let timeline: Envelope<Vec<Tweet>> = self
            .get(
                format!("{}/2/users/{}/tweets", self.base_url, id),
                &[
                    ("max_results", max_results.to_string()),
                    ("tweet.fields", "created_at,public_metrics".to_string()),
                ],
            )
            .await?;

        // An account with no posts comes back without a `data` field.
        let tweets = timeline.data.unwrap_or_default();
        let mut posts = Vec::with_capacity(tweets.len().min(limit));
        for tweet in tweets.into_iter().take(limit) {
            match to_account_post(tweet) {
                Ok(post) => posts.push(post),
                Err(e) => warn!(error = %e, "Skipping malformed tweet"),
            }
        }

        debug!(count = posts.len(), "Fetched recent posts");
        Ok(posts)
    }
}
