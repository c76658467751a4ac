//! Posts read back from watched accounts.

use crate::PostId;
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// A recent post from another account, with engagement counters.
///
/// # Examples
///
/// ```
/// use herald_core::{AccountPostBuilder, PostId};
///
/// let post = AccountPostBuilder::default()
///     .id(PostId("1".to_string()))
///     .text("gm")
///     .created_at(chrono::Utc::now())
///     .like_count(10u64)
///     .share_count(2u64)
///     .build()
///     .unwrap();
///
/// assert_eq!(post.engagement(), 12);
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct AccountPost {
    /// Platform identifier
    id: PostId,
    /// Post text
    text: String,
    /// When it was posted
    created_at: DateTime<Utc>,
    /// Likes received
    #[builder(default)]
    like_count: u64,
    /// Shares (reposts) received
    #[builder(default)]
    share_count: u64,
}

impl AccountPost {
    /// Total engagement used for ranking.
    pub fn engagement(&self) -> u64 {
        self.like_count.saturating_add(self.share_count)
    }
}
