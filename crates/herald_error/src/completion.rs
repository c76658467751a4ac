//! Completion backend error types.

use crate::RetryableError;

/// Classified failure of a completion backend call.
///
/// There are exactly two classes: transient ([`RateLimited`](Self::RateLimited),
/// [`QuotaExceeded`](Self::QuotaExceeded)) and fatal ([`Other`](Self::Other)).
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum CompletionErrorKind {
    /// The backend asked us to slow down.
    #[display("Rate limited by completion backend")]
    RateLimited {
        /// Seconds the backend asked us to wait, if it said
        retry_after_secs: Option<u64>,
    },
    /// The account quota is exhausted.
    #[display("Completion quota exceeded")]
    QuotaExceeded,
    /// Any other failure (auth, bad request, timeout, malformed response).
    #[display("Completion failed: {}", _0)]
    Other(String),
}

impl CompletionErrorKind {
    /// Check if this failure is expected to resolve with time.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::QuotaExceeded)
    }
}

/// Completion error with source location tracking.
///
/// # Examples
///
/// ```
/// use herald_error::{CompletionError, CompletionErrorKind};
///
/// let err = CompletionError::new(CompletionErrorKind::QuotaExceeded);
/// assert!(err.kind.is_transient());
/// assert!(format!("{}", err).contains("quota"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Completion Error: {} at line {} in {}", kind, line, file)]
pub struct CompletionError {
    /// The kind of error that occurred
    pub kind: CompletionErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl CompletionError {
    /// Create a new CompletionError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CompletionErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Rate-limit failure.
    #[track_caller]
    pub fn rate_limited(retry_after_secs: Option<u64>) -> Self {
        Self::new(CompletionErrorKind::RateLimited { retry_after_secs })
    }

    /// Quota failure.
    #[track_caller]
    pub fn quota_exceeded() -> Self {
        Self::new(CompletionErrorKind::QuotaExceeded)
    }

    /// Fatal failure with a diagnostic message.
    #[track_caller]
    pub fn other(detail: impl Into<String>) -> Self {
        Self::new(CompletionErrorKind::Other(detail.into()))
    }

    /// Check if this failure is transient.
    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }
}

impl RetryableError for CompletionError {
    fn is_retryable(&self) -> bool {
        self.kind.is_transient()
    }

    fn retry_after_secs(&self) -> Option<u64> {
        match self.kind {
            CompletionErrorKind::RateLimited { retry_after_secs } => retry_after_secs,
            _ => None,
        }
    }
}
