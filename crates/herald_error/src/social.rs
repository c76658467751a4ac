//! Social platform error types.

use crate::RetryableError;

/// Social platform error conditions (publishing and account reads).
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum SocialErrorKind {
    /// Platform rate limit hit
    #[display("Platform rate limit exceeded")]
    RateLimited {
        /// Seconds the platform asked us to wait, if it said
        retry_after_secs: Option<u64>,
    },
    /// Credentials rejected
    #[display("Unauthorized: {}", _0)]
    Unauthorized(String),
    /// Platform refused the request
    #[display("HTTP {} error: {}", status, message)]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },
    /// Transport failure before a response arrived
    #[display("Transport error: {}", _0)]
    Transport(String),
    /// Response body could not be understood
    #[display("Unexpected response: {}", _0)]
    Parse(String),
    /// Requested account or post does not exist
    #[display("Not found: {}", _0)]
    NotFound(String),
    /// Shutdown arrived before the call could finish
    #[display("Cancelled by shutdown")]
    Cancelled,
}

impl SocialErrorKind {
    /// Check if this error type should be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Transport(_) => true,
            Self::Rejected { status, .. } => matches!(*status, 408 | 500 | 502 | 503 | 504),
            _ => false,
        }
    }
}

/// Social platform error with location tracking.
///
/// # Examples
///
/// ```
/// use herald_error::{RetryableError, SocialError, SocialErrorKind};
///
/// let err = SocialError::new(SocialErrorKind::Rejected {
///     status: 503,
///     message: "Service unavailable".to_string(),
/// });
/// assert!(err.is_retryable());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Social Error: {} at line {} in {}", kind, line, file)]
pub struct SocialError {
    /// The kind of error that occurred
    pub kind: SocialErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl SocialError {
    /// Create a new SocialError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: SocialErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl RetryableError for SocialError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    fn retry_after_secs(&self) -> Option<u64> {
        match self.kind {
            SocialErrorKind::RateLimited { retry_after_secs } => retry_after_secs,
            _ => None,
        }
    }
}
