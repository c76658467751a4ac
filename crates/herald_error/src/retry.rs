//! Retry classification shared by backend errors.

/// Trait for errors that support retry logic.
///
/// Backends classify their own failures so the control loop can decide between
/// backing off and giving up without looking at error text.
///
/// # Examples
///
/// ```
/// use herald_error::{CompletionError, RetryableError};
///
/// let err = CompletionError::rate_limited(Some(20));
/// assert!(err.is_retryable());
///
/// let err = CompletionError::other("invalid api key");
/// assert!(!err.is_retryable());
/// ```
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    ///
    /// Rate limits and quota signals should return true. Permanent errors like
    /// 401 (unauthorized) or 400 (bad request) should return false.
    fn is_retryable(&self) -> bool;

    /// Server-suggested wait before the next attempt, in seconds.
    fn retry_after_secs(&self) -> Option<u64> {
        None
    }
}
