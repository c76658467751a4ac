//! Role types for prompt messages.

use serde::{Deserialize, Serialize};

/// Who a prompt message speaks for.
///
/// # Examples
///
/// ```
/// use herald_core::Role;
///
/// assert_ne!(Role::System, Role::User);
/// assert_eq!(Role::System.as_str(), "system");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System messages set the persona
    System,
    /// User messages carry the instruction
    User,
    /// Assistant messages are from the model
    Assistant,
}

impl Role {
    /// Wire name used by chat-completion APIs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}
