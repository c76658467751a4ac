//! Herald - an autonomous posting agent.
//!
//! Herald writes short social posts with a chat-completion model, filters them through
//! a quality gate and publishes them on a randomized schedule:
//!
//! 1. pick a content type and build a prompt
//! 2. generate, retrying rate limits with exponential backoff
//! 3. append hashtags and fit the platform limit
//! 4. accept or reject the post
//! 5. publish, then sleep for a random interval
//!
//! # Architecture
//!
//! - `herald_error` - Error types
//! - `herald_core` - Content types, prompts, posts
//! - `herald_interface` - Backend traits
//! - `herald_models` - Completion clients
//! - `herald_social` - X, Discord and dry-run publishers, X account reader
//! - `herald_agent` - Generator, gate, scheduler, configuration
//!
//! This crate wires them together behind the `herald` binary and re-exports the
//! pieces for convenience.
//!
//! # Cargo Features
//!
//! - `observability` - OpenTelemetry span export to stdout

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod app;
mod cli;
mod logging;

#[cfg(feature = "observability")]
pub mod observability;

pub use app::{build_scheduler, check, dispatch, effective_config, load_config, run};
pub use cli::{Cli, Commands, RunArgs};
pub use logging::{LoggingGuard, default_filter, init_logging};

pub use herald_agent::*;
pub use herald_core::*;
pub use herald_error::*;
pub use herald_interface::*;
pub use herald_models::*;
pub use herald_social::*;
