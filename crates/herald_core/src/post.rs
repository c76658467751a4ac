//! Generated and finished post text.

use serde::{Deserialize, Serialize};

/// Raw text returned by one completion call, before finishing.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display, derive_more::From,
)]
#[display("{}", _0)]
pub struct GeneratedText(String);

impl GeneratedText {
    /// Wrap backend output.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Borrow the text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take ownership of the text.
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Publish-ready text, guaranteed to fit the platform limit it was built for.
///
/// Lengths are counted in Unicode scalar values.
///
/// # Examples
///
/// ```
/// use herald_core::FinishedPost;
///
/// assert!(FinishedPost::within("short enough", 280).is_some());
/// assert!(FinishedPost::within("x".repeat(281), 280).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
#[display("{}", text)]
pub struct FinishedPost {
    text: String,
    limit: usize,
}

impl FinishedPost {
    /// Accept `text` only if it fits within `limit` characters.
    pub fn within(text: impl Into<String>, limit: usize) -> Option<Self> {
        let text = text.into();
        (text.chars().count() <= limit).then_some(Self { text, limit })
    }

    /// Borrow the text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Platform limit this post was checked against.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Length in characters.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

impl AsRef<str> for FinishedPost {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Platform-specific post identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[display("{}", _0)]
pub struct PostId(pub String);

/// Confirmation of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReceipt {
    /// Identifier assigned by the platform, if it returned one
    pub id: Option<PostId>,
    /// Platform name (e.g., "x", "discord")
    pub platform: String,
}
