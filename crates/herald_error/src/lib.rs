//! Error types for the Herald posting agent.
//!
//! This crate provides the foundation error types used throughout the Herald workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! Backend failures are classified at the point they are produced. A
//! [`CompletionError`] already knows whether it is transient (rate limit or quota)
//! and a [`SocialError`] already knows whether a publish may be retried, so callers
//! never inspect error messages.
//!
//! # Examples
//!
//! ```
//! use herald_error::{HeraldResult, ConfigError};
//!
//! fn load() -> HeraldResult<String> {
//!     Err(ConfigError::new("Missing OPENAI_API_KEY"))?
//! }
//!
//! match load() {
//!     Ok(value) => println!("Got: {}", value),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod completion;
mod config;
mod error;
mod generation;
mod http;
mod retry;
mod social;

pub use completion::{CompletionError, CompletionErrorKind};
pub use config::ConfigError;
pub use error::{HeraldError, HeraldErrorKind, HeraldResult};
pub use generation::{GenerationError, GenerationErrorKind};
pub use http::HttpError;
pub use retry::RetryableError;
pub use social::{SocialError, SocialErrorKind};
