//! Turning generated text into a publish-ready post.

use herald_core::FinishedPost;
use serde::{Deserialize, Serialize};

/// What to do when text plus tags exceeds the platform limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Discard and generate again
    #[default]
    #[display("resample")]
    Resample,
    /// Cut the body to fit, keeping the tags
    #[display("truncate")]
    Truncate,
}

/// Appends tags and enforces the platform length limit.
///
/// Finishing is idempotent: running a finished post through again with the same tags
/// returns it unchanged.
///
/// # Examples
///
/// ```
/// use herald_agent::{Finisher, OverflowPolicy};
///
/// let finisher = Finisher::new(280, OverflowPolicy::Resample);
/// let tags = vec!["#BTC".to_string()];
/// let post = finisher.finish("  Stack sats, touch grass.  ", &tags).unwrap();
/// assert_eq!(post.as_str(), "Stack sats, touch grass. #BTC");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Finisher {
    limit: usize,
    policy: OverflowPolicy,
}

impl Finisher {
    /// Create a finisher for a platform limit in characters.
    pub fn new(limit: usize, policy: OverflowPolicy) -> Self {
        Self { limit, policy }
    }

    /// Platform limit.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Overflow policy.
    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Finish `text` with `tags`, or `None` when it cannot be made to fit.
    pub fn finish(&self, text: &str, tags: &[String]) -> Option<FinishedPost> {
        let body = text.trim();
        let missing = missing_tags(body, tags);
        let composed = compose(body, &missing);
        if char_len(&composed) <= self.limit {
            return FinishedPost::within(composed, self.limit);
        }

        match self.policy {
            OverflowPolicy::Resample => None,
            OverflowPolicy::Truncate => self.truncate(body, tags, missing),
        }
    }

    /// Cutting the body can drop a tag it contained, which then has to move into
    /// the suffix; repeat until the suffix is stable. The missing set only grows,
    /// so this ends within `tags.len()` rounds.
    fn truncate<'a>(
        &self,
        body: &str,
        tags: &'a [String],
        mut missing: Vec<&'a str>,
    ) -> Option<FinishedPost> {
        loop {
            let suffix = missing.join(" ");
            let suffix_len = char_len(&suffix);
            let room = if suffix.is_empty() {
                self.limit
            } else {
                self.limit.checked_sub(suffix_len + 1)?
            };

            let cut = cut_at_word(body, room);
            let now_missing = missing_tags(cut, tags);
            if now_missing == missing {
                return FinishedPost::within(compose(cut, &missing), self.limit);
            }
            missing = now_missing;
        }
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Tags that do not already appear as a whitespace-separated token of `body`.
fn missing_tags<'a>(body: &str, tags: &'a [String]) -> Vec<&'a str> {
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .filter(|t| !body.split_whitespace().any(|token| token == *t))
        .collect()
}

fn compose(body: &str, tags: &[&str]) -> String {
    let mut out = body.to_string();
    for tag in tags {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(tag);
    }
    out
}

/// Longest prefix of at most `max` characters, ending on a word boundary when the
/// prefix has one.
fn cut_at_word(body: &str, max: usize) -> &str {
    if char_len(body) <= max {
        return body;
    }
    let end = body
        .char_indices()
        .nth(max)
        .map_or(body.len(), |(idx, _)| idx);
    let prefix = &body[..end];

    let breaks_cleanly = body[end..].starts_with(char::is_whitespace);
    if breaks_cleanly {
        return prefix.trim_end();
    }
    match prefix.rfind(char::is_whitespace) {
        Some(ws) => prefix[..ws].trim_end(),
        None => prefix,
    }
}
