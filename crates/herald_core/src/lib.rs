//! Core data types for the Herald posting agent.
//!
//! This crate provides the value types passed between the content policy, the
//! completion and publish backends, and the control loop. Every type here is an
//! immutable value owned by a single loop iteration.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod account;
mod content_type;
mod post;
mod prompt;
mod request;
mod role;

pub use account::{AccountPost, AccountPostBuilder};
pub use content_type::{ContentType, Persona};
pub use post::{FinishedPost, GeneratedText, PostId, PublishReceipt};
pub use prompt::PromptBundle;
pub use request::{CompletionRequest, CompletionRequestBuilder, Message};
pub use role::Role;
