//! Run statistics.

use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Counters for an agent run. Clones share the same counters.
#[derive(Debug, Clone, Default)]
pub struct AgentStats {
    inner: Arc<AgentStatsInner>,
}

#[derive(Debug, Default)]
struct AgentStatsInner {
    cycles: AtomicU64,
    published: AtomicU64,
    publish_failures: AtomicU64,
    rejections: AtomicU64,
    error_pauses: AtomicU64,
    last_publish: parking_lot::Mutex<Option<Instant>>,
}

impl AgentStats {
    /// Fresh counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// A cycle started.
    pub fn record_cycle(&self) {
        self.inner.cycles.fetch_add(1, Ordering::Relaxed);
    }

    /// A post went out.
    pub fn record_published(&self) {
        self.inner.published.fetch_add(1, Ordering::Relaxed);
        *self.inner.last_publish.lock() = Some(Instant::now());
    }

    /// A publish call failed.
    pub fn record_publish_failure(&self) {
        self.inner.publish_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// The gate turned a post away.
    pub fn record_rejection(&self) {
        self.inner.rejections.fetch_add(1, Ordering::Relaxed);
    }

    /// Generation failed and the loop paused.
    pub fn record_error_pause(&self) {
        self.inner.error_pauses.fetch_add(1, Ordering::Relaxed);
    }

    /// Cycles started.
    pub fn cycles(&self) -> u64 {
        self.inner.cycles.load(Ordering::Relaxed)
    }

    /// Posts published.
    pub fn published(&self) -> u64 {
        self.inner.published.load(Ordering::Relaxed)
    }

    /// Failed publish calls.
    pub fn publish_failures(&self) -> u64 {
        self.inner.publish_failures.load(Ordering::Relaxed)
    }

    /// Gate rejections.
    pub fn rejections(&self) -> u64 {
        self.inner.rejections.load(Ordering::Relaxed)
    }

    /// Error pauses.
    pub fn error_pauses(&self) -> u64 {
        self.inner.error_pauses.load(Ordering::Relaxed)
    }

    /// Time since the last successful publish.
    pub fn time_since_publish(&self) -> Option<Duration> {
        self.inner.last_publish.lock().map(|at| at.elapsed())
    }

    /// Serializable view of the counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            cycles: self.cycles(),
            published: self.published(),
            publish_failures: self.publish_failures(),
            rejections: self.rejections(),
            error_pauses: self.error_pauses(),
            seconds_since_publish: self.time_since_publish().map(|d| d.as_secs()),
        }
    }
}

/// Point-in-time copy of [`AgentStats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Cycles started
    pub cycles: u64,
    /// Posts published
    pub published: u64,
    /// Failed publish calls
    pub publish_failures: u64,
    /// Gate rejections
    pub rejections: u64,
    /// Error pauses
    pub error_pauses: u64,
    /// Seconds since the last publish, if any
    pub seconds_since_publish: Option<u64>,
}
