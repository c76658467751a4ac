//! Exponential backoff for transient backend failures.

use std::time::Duration;

/// Bounded retry with geometric backoff.
///
/// Attempt `i` (zero-based) that fails transiently is followed by a wait of
/// `base_delay * 2^i`, except after the last attempt.
///
/// # Examples
///
/// ```
/// use herald_agent::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(3, Duration::from_secs(60));
/// let waits: Vec<_> = policy.backoff_schedule().collect();
/// assert_eq!(waits, vec![Duration::from_secs(60), Duration::from_secs(120)]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(60))
    }
}

impl RetryPolicy {
    /// Create a policy. `max_retries` is the total number of attempts.
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Total attempts allowed.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Wait before attempt 0.
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Wait after failed attempt `attempt`, saturating on overflow.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Whether another attempt follows `attempt`.
    pub fn has_next(&self, attempt: u32) -> bool {
        attempt.saturating_add(1) < self.max_retries
    }

    /// Every wait of a fully exhausted run, in order.
    pub fn backoff_schedule(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.max_retries.saturating_sub(1)).map(|i| self.delay_for(i))
    }
}
