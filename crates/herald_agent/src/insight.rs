//! Summaries of watched accounts.

use chrono::Timelike;
use herald_core::{AccountPost, PostId};
use serde::Serialize;
use std::collections::BTreeMap;

/// Number of peak hours reported.
const PEAK_HOURS: usize = 3;

/// What a watched account's recent posts say about timing and topics.
///
/// # Examples
///
/// ```
/// use herald_agent::AccountInsight;
///
/// let insight = AccountInsight::from_posts("whale_watcher", &[], 3);
/// assert!(insight.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountInsight {
    /// Account the posts came from
    pub account: String,
    /// UTC hours with the most posts, busiest first
    pub peak_hours_utc: Vec<u32>,
    /// Texts of the best-performing posts, by engagement
    pub top_posts: Vec<String>,
    /// Best-performing post, the natural reply target
    pub top_post_id: Option<PostId>,
}

impl AccountInsight {
    /// Derive an insight from recent posts, keeping `top_n` best texts.
    pub fn from_posts(account: impl Into<String>, posts: &[AccountPost], top_n: usize) -> Self {
        let mut per_hour: BTreeMap<u32, usize> = BTreeMap::new();
        for post in posts {
            *per_hour.entry(post.created_at().hour()).or_default() += 1;
        }
        let mut hours: Vec<(u32, usize)> = per_hour.into_iter().collect();
        // Busiest first; earlier hour wins ties.
        hours.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        let peak_hours_utc = hours.into_iter().take(PEAK_HOURS).map(|(h, _)| h).collect();

        let mut ranked: Vec<&AccountPost> = posts.iter().collect();
        // Stable sort keeps the newest-first order among equals.
        ranked.sort_by(|a, b| b.engagement().cmp(&a.engagement()));
        let top_post_id = ranked.first().map(|p| p.id().clone());
        let top_posts = ranked
            .into_iter()
            .take(top_n)
            .map(|p| p.text().clone())
            .collect();

        Self {
            account: account.into(),
            peak_hours_utc,
            top_posts,
            top_post_id,
        }
    }

    /// True when there was nothing to learn from.
    pub fn is_empty(&self) -> bool {
        self.top_posts.is_empty() && self.peak_hours_utc.is_empty()
    }

    /// Paragraph appended to the user instruction.
    pub fn context_paragraph(&self) -> String {
        let mut out = format!("Context from @{}'s recent activity:", self.account);
        if !self.peak_hours_utc.is_empty() {
            let hours: Vec<String> = self
                .peak_hours_utc
                .iter()
                .map(|h| format!("{:02}:00", h))
                .collect();
            out.push_str(&format!(" they post most around {} UTC.", hours.join(", ")));
        }
        if !self.top_posts.is_empty() {
            out.push_str(" Their best-received posts were:");
            for text in &self.top_posts {
                out.push_str("\n- ");
                out.push_str(text);
            }
            out.push_str("\nRespond to the themes above in your own voice.");
        }
        out
    }
}
