//! Dry-run publisher.

use async_trait::async_trait;
use herald_core::{FinishedPost, PostId, PublishReceipt};
use herald_error::SocialError;
use herald_interface::PublishBackend;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Publisher that only logs what it would have posted.
///
/// Receipts carry a synthetic, monotonically increasing id so reply chains can
/// still be followed in the logs.
#[derive(Debug)]
pub struct LogPublisher {
    max_len: usize,
    counter: AtomicU64,
}

impl LogPublisher {
    /// Create a dry-run publisher enforcing `max_len` characters.
    pub fn new(max_len: usize) -> Self {
        Self {
            max_len,
            counter: AtomicU64::new(0),
        }
    }

    /// Number of posts "published" so far.
    pub fn published(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl PublishBackend for LogPublisher {
    async fn publish(
        &self,
        post: &FinishedPost,
        reply_to: Option<&PostId>,
    ) -> Result<PublishReceipt, SocialError> {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            dry_run = true,
            chars = post.char_count(),
            reply_to = reply_to.map(|id| id.0.as_str()),
            text = post.as_str(),
            "Would publish post"
        );
        Ok(PublishReceipt {
            id: Some(PostId(format!("dry-run-{}", n))),
            platform: "log".to_string(),
        })
    }

    fn platform_name(&self) -> &str {
        "log"
    }

    fn max_post_length(&self) -> usize {
        self.max_len
    }
}
