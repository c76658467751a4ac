//! Prompt bundles produced by the content policy.

use crate::{CompletionRequest, Message, Role};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Everything a completion backend needs for one attempt.
///
/// Produced fresh per attempt and never mutated.
///
/// # Examples
///
/// ```
/// use herald_core::PromptBundle;
///
/// let bundle = PromptBundle::new("You are terse.", "Say hi.", 100, 1.7);
/// assert_eq!(*bundle.temperature(), 1.0);
///
/// let request = bundle.to_request();
/// assert_eq!(request.messages.len(), 2);
/// assert_eq!(request.max_tokens, Some(100));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct PromptBundle {
    /// Persona instruction
    system_instruction: String,
    /// Per-type instruction
    user_instruction: String,
    /// Output token cap
    max_output_tokens: u32,
    /// Sampling temperature in [0, 1]
    temperature: f32,
}

impl PromptBundle {
    /// Create a bundle. The temperature is clamped into `[0, 1]`.
    pub fn new(
        system_instruction: impl Into<String>,
        user_instruction: impl Into<String>,
        max_output_tokens: u32,
        temperature: f32,
    ) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            user_instruction: user_instruction.into(),
            max_output_tokens,
            temperature: temperature.clamp(0.0, 1.0),
        }
    }

    /// Convert into a backend-neutral completion request.
    pub fn to_request(&self) -> CompletionRequest {
        CompletionRequest {
            messages: vec![
                Message::new(Role::System, self.system_instruction.clone()),
                Message::new(Role::User, self.user_instruction.clone()),
            ],
            max_tokens: Some(self.max_output_tokens),
            temperature: Some(self.temperature),
            model: None,
        }
    }
}
