//! Trait definitions for the Herald posting agent.
//!
//! The control loop depends only on these traits. Concrete HTTP clients live in
//! `herald_models` and `herald_social`; tests substitute hand-written mocks.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;

pub use traits::{AccountReader, CompletionBackend, PublishBackend};
