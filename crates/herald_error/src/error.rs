//! Top-level error wrapper types.

use crate::{CompletionError, ConfigError, GenerationError, HttpError, SocialError};

/// The foundation error enum, one variant per error family.
///
/// # Examples
///
/// ```
/// use herald_error::{HeraldError, HttpError};
///
/// let http_err = HttpError::new("Connection failed");
/// let err: HeraldError = http_err.into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum HeraldErrorKind {
    /// Configuration or startup validation error
    #[from(ConfigError)]
    Config(ConfigError),
    /// HTTP client construction error
    #[from(HttpError)]
    Http(HttpError),
    /// Completion backend error
    #[from(CompletionError)]
    Completion(CompletionError),
    /// Social platform error
    #[from(SocialError)]
    Social(SocialError),
    /// Generation error
    #[from(GenerationError)]
    Generation(GenerationError),
}

/// Herald error with kind discrimination.
///
/// # Examples
///
/// ```
/// use herald_error::{HeraldErrorKind, HeraldResult, ConfigError};
///
/// fn might_fail() -> HeraldResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// let err = might_fail().unwrap_err();
/// assert!(matches!(err.kind(), HeraldErrorKind::Config(_)));
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Herald Error: {}", _0)]
pub struct HeraldError(Box<HeraldErrorKind>);

impl HeraldError {
    /// Create a new error from a kind.
    pub fn new(kind: HeraldErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &HeraldErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to HeraldErrorKind
impl<T> From<T> for HeraldError
where
    T: Into<HeraldErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Herald operations.
pub type HeraldResult<T> = std::result::Result<T, HeraldError>;
