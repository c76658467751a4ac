//! X API v2 JSON shapes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct CreateTweet<'a> {
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<ReplySettings<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReplySettings<'a> {
    pub in_reply_to_tweet_id: &'a str,
}

/// `{"data": ...}` envelope used by every v2 endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: Option<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedTweet {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct User {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Tweet {
    pub id: String,
    pub text: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub public_metrics: Option<PublicMetrics>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PublicMetrics {
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub quote_count: u64,
}
