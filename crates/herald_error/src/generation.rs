//! Generation failure types.

use crate::CompletionError;

/// Why a generation call produced no post.
#[derive(Debug, Clone, derive_more::Display)]
pub enum GenerationErrorKind {
    /// Every attempt in the retry budget was spent.
    #[display("Generation exhausted after {} attempts", attempts)]
    Exhausted {
        /// Number of attempts made
        attempts: u32,
    },
    /// The backend failed with a non-transient error.
    #[display("Fatal backend error: {}", _0)]
    Backend(CompletionError),
    /// Shutdown was requested during a backoff wait.
    #[display("Generation cancelled")]
    Cancelled,
}

/// Generation error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Generation Error: {} at line {} in {}", kind, line, file)]
pub struct GenerationError {
    /// The kind of error that occurred
    pub kind: GenerationErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl GenerationError {
    /// Create a new GenerationError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: GenerationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Retry budget exhausted.
    #[track_caller]
    pub fn exhausted(attempts: u32) -> Self {
        Self::new(GenerationErrorKind::Exhausted { attempts })
    }

    /// Check if this error came from a shutdown request.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind, GenerationErrorKind::Cancelled)
    }
}

impl From<CompletionError> for GenerationError {
    #[track_caller]
    fn from(err: CompletionError) -> Self {
        Self::new(GenerationErrorKind::Backend(err))
    }
}
