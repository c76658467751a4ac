//! Bounded publish retry.

use async_trait::async_trait;
use herald_core::{FinishedPost, PostId, PublishReceipt};
use herald_error::{RetryableError, SocialError, SocialErrorKind};
use herald_interface::PublishBackend;
use std::time::Duration;
use tokio_retry2::strategy::{FixedInterval, jitter};
use tokio_retry2::{Retry, RetryError};
use tokio_util::sync::CancellationToken;
use tracing::{instrument, warn};

/// Retry budget for a single publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishRetryConfig {
    /// Retries after the first attempt
    pub max_retries: usize,
    /// Base wait between attempts, jittered
    pub interval: Duration,
}

impl Default for PublishRetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            interval: Duration::from_secs(30),
        }
    }
}

/// Wraps a publisher and retries retryable failures a bounded number of times.
///
/// Only errors whose [`RetryableError::is_retryable`] is true are retried; auth and
/// content rejections fail on the first attempt. A platform-supplied retry-after
/// takes precedence over the jittered interval.
///
/// Cancelling the shutdown token abandons the publish, including any retry wait,
/// with [`SocialErrorKind::Cancelled`].
#[derive(Debug, Clone)]
pub struct RetryingPublisher<P> {
    inner: P,
    config: PublishRetryConfig,
    shutdown: CancellationToken,
}

impl<P: PublishBackend> RetryingPublisher<P> {
    /// Wrap `inner` with the given retry budget.
    pub fn new(inner: P, config: PublishRetryConfig) -> Self {
        Self {
            inner,
            config,
            shutdown: CancellationToken::new(),
        }
    }

    /// Abandon publishing when `token` is cancelled.
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// The wrapped publisher.
    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: PublishBackend> PublishBackend for RetryingPublisher<P> {
    #[instrument(skip_all, fields(platform = self.inner.platform_name(), max_retries = self.config.max_retries))]
    async fn publish(
        &self,
        post: &FinishedPost,
        reply_to: Option<&PostId>,
    ) -> Result<PublishReceipt, SocialError> {
        let interval_ms = u64::try_from(self.config.interval.as_millis()).unwrap_or(u64::MAX);
        let strategy = FixedInterval::from_millis(interval_ms)
            .map(jitter)
            .take(self.config.max_retries);

        let inner = &self.inner;
        let attempts = Retry::spawn(strategy, || async move {
            match inner.publish(post, reply_to).await {
                Ok(receipt) => Ok(receipt),
                Err(e) if e.is_retryable() => {
                    warn!(error = %e, "Publish failed, will retry");
                    Err(RetryError::Transient {
                        retry_after: e.retry_after_secs().map(Duration::from_secs),
                        err: e,
                    })
                }
                Err(e) => Err(RetryError::Permanent(e)),
            }
        });

        tokio::select! {
            biased;
            () = self.shutdown.cancelled() => {
                warn!("Shutdown during publish, abandoning");
                Err(SocialError::new(SocialErrorKind::Cancelled))
            }
            result = attempts => result,
        }
    }

    fn platform_name(&self) -> &str {
        self.inner.platform_name()
    }

    fn max_post_length(&self) -> usize {
        self.inner.max_post_length()
    }
}
