//! Cancellable waits.

use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// How a wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepOutcome {
    /// The full duration passed
    Elapsed,
    /// Shutdown was requested first
    Cancelled,
}

impl SleepOutcome {
    /// True when shutdown interrupted the wait.
    pub fn is_cancelled(self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Source of every wait in the control loop.
///
/// Tests substitute a recording implementation so backoff and scheduling can be
/// asserted without real time passing.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Wait for `duration` or until shutdown.
    async fn sleep(&self, duration: Duration) -> SleepOutcome;
}

/// Real-time sleeper that wakes early when its token is cancelled.
#[derive(Debug, Clone)]
pub struct CancellableSleeper {
    token: CancellationToken,
}

impl CancellableSleeper {
    /// Create a sleeper bound to `token`.
    pub fn new(token: CancellationToken) -> Self {
        Self { token }
    }
}

#[async_trait]
impl Sleeper for CancellableSleeper {
    async fn sleep(&self, duration: Duration) -> SleepOutcome {
        tokio::select! {
            _ = self.token.cancelled() => {
                debug!(?duration, "Sleep interrupted by shutdown");
                SleepOutcome::Cancelled
            }
            _ = tokio::time::sleep(duration) => SleepOutcome::Elapsed,
        }
    }
}
