//! Completion request types.

use crate::Role;
use serde::{Deserialize, Serialize};

/// One message in a completion prompt.
///
/// # Examples
///
/// ```
/// use herald_core::{Message, Role};
///
/// let message = Message::new(Role::User, "Hello!");
/// assert_eq!(message.role, Role::User);
/// assert_eq!(message.content, "Hello!");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender
    pub role: Role,
    /// Message text
    pub content: String,
}

impl Message {
    /// Create a message.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Backend-neutral completion request.
///
/// # Examples
///
/// ```
/// use herald_core::{CompletionRequestBuilder, Message, Role};
///
/// let request = CompletionRequestBuilder::default()
///     .messages(vec![Message::new(Role::User, "Hello!")])
///     .max_tokens(Some(100))
///     .temperature(Some(0.7))
///     .build()
///     .unwrap();
///
/// assert_eq!(request.messages.len(), 1);
/// assert_eq!(request.model, None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, derive_builder::Builder)]
#[builder(default)]
pub struct CompletionRequest {
    /// The prompt messages to send
    pub messages: Vec<Message>,
    /// Maximum number of tokens to generate
    pub max_tokens: Option<u32>,
    /// Sampling temperature (0.0 to 1.0)
    pub temperature: Option<f32>,
    /// Model override; backends use their configured model when `None`
    pub model: Option<String>,
}

impl CompletionRequest {
    /// Text of the first message with the given role.
    pub fn text_for(&self, role: Role) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == role)
            .map(|m| m.content.as_str())
    }
}
