//! Completion backend clients for Herald.
//!
//! Every client implements [`herald_interface::CompletionBackend`] and maps provider
//! failures onto the typed [`herald_error::CompletionError`] classification, so the
//! generator never inspects error text.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod openai_compat;

pub use openai_compat::{OPENAI_CHAT_URL, OpenAiCompatibleClient};
