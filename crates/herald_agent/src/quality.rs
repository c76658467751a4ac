//! Quality gate for generated posts.

use herald_core::Persona;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What counts as a "lively" post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum Liveliness {
    /// At least one emphasis glyph (emoji or `!`/`?`)
    #[display("emphasis")]
    Emphasis,
    /// At least one number carrying a magnitude marker (`42K`, `3x`, `$40`)
    #[display("numeric")]
    Numeric,
    /// Emphasis or numeric
    #[display("either")]
    Either,
}

/// Thresholds and vocabularies for the gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Whether the gate runs at all
    pub enabled: bool,
    /// Maximum length in characters
    pub max_chars: usize,
    /// Minimum whitespace-separated words
    pub min_words: usize,
    /// Liveliness tier
    pub liveliness: Liveliness,
    /// Emphasis allow-set
    pub emphasis: Vec<String>,
    /// Magnitude markers for numeric liveliness
    pub magnitude_markers: Vec<String>,
    /// Domain vocabulary; when non-empty one term must appear
    pub technical_terms: Vec<String>,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self::banter()
    }
}

impl QualityConfig {
    /// Preset matching the voice of `persona`.
    pub fn for_persona(persona: Persona) -> Self {
        match persona {
            Persona::Banter => Self::banter(),
            Persona::Technical => Self::technical(),
        }
    }

    /// Short, punchy posts with an emoji or exclamation.
    pub fn banter() -> Self {
        Self {
            enabled: true,
            max_chars: 275,
            min_words: 8,
            liveliness: Liveliness::Emphasis,
            emphasis: ["😂", "🤔", "😅", "🚀", "📈", "📉", "🤯", "!", "?"]
                .into_iter()
                .map(String::from)
                .collect(),
            magnitude_markers: default_markers(),
            technical_terms: Vec::new(),
        }
    }

    /// Data-driven posts that cite a figure and a market term.
    pub fn technical() -> Self {
        Self {
            enabled: true,
            max_chars: 250,
            min_words: 10,
            liveliness: Liveliness::Numeric,
            emphasis: Self::banter().emphasis,
            magnitude_markers: default_markers(),
            technical_terms: [
                "rsi",
                "macd",
                "support",
                "resistance",
                "volume",
                "liquidity",
                "accumulation",
                "distribution",
                "divergence",
                "breakout",
                "whale",
                "funding",
                "open interest",
                "order book",
                "leverage",
                "volatility",
                "moving average",
                "ema",
                "fibonacci",
                "on-chain",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

fn default_markers() -> Vec<String> {
    ["%", "$", "€", "K", "M", "B", "x"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Why a post was turned away.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum Rejection {
    /// Over the character limit
    #[display("too long ({} > {} chars)", chars, max)]
    TooLong {
        /// Actual length
        chars: usize,
        /// Configured maximum
        max: usize,
    },
    /// Not enough words
    #[display("too short ({} < {} words)", words, min)]
    TooFewWords {
        /// Actual word count
        words: usize,
        /// Configured minimum
        min: usize,
    },
    /// Liveliness tier not met
    #[display("not lively enough ({})", _0)]
    Flat(Liveliness),
    /// No domain term present
    #[display("no technical term")]
    NoTechnicalTerm,
}

/// Pure accept/reject decision over a post's text.
///
/// Checks run in a fixed order and stop at the first failure: length, word count,
/// liveliness, then vocabulary.
///
/// # Examples
///
/// ```
/// use herald_agent::{QualityConfig, QualityGate};
///
/// let gate = QualityGate::new(QualityConfig::technical());
/// assert!(!gate.accepts("hi"));
/// assert!(gate.accepts(
///     "RSI divergence at 42.5K with 3x volume spike, detecting accumulation near 40K support. #BTC #Trading"
/// ));
/// ```
#[derive(Debug, Clone)]
pub struct QualityGate {
    config: QualityConfig,
    terms: Vec<String>,
}

impl QualityGate {
    /// Build a gate. Vocabulary matching is case-insensitive.
    pub fn new(config: QualityConfig) -> Self {
        let terms = config
            .technical_terms
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self { config, terms }
    }

    /// Gate configuration.
    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    /// True when every check passes.
    pub fn accepts(&self, text: &str) -> bool {
        self.evaluate(text).is_ok()
    }

    /// Run the checks, returning the first failure.
    pub fn evaluate(&self, text: &str) -> Result<(), Rejection> {
        let result = self.check(text);
        if let Err(reason) = &result {
            debug!(reason = %reason, "Quality gate rejected post");
        }
        result
    }

    fn check(&self, text: &str) -> Result<(), Rejection> {
        let chars = text.chars().count();
        if chars > self.config.max_chars {
            return Err(Rejection::TooLong {
                chars,
                max: self.config.max_chars,
            });
        }

        let words = text.split_whitespace().count();
        if words < self.config.min_words {
            return Err(Rejection::TooFewWords {
                words,
                min: self.config.min_words,
            });
        }

        let lively = match self.config.liveliness {
            Liveliness::Emphasis => self.has_emphasis(text),
            Liveliness::Numeric => self.has_figure(text),
            Liveliness::Either => self.has_emphasis(text) || self.has_figure(text),
        };
        if !lively {
            return Err(Rejection::Flat(self.config.liveliness));
        }

        if !self.terms.is_empty() && !self.has_term(text) {
            return Err(Rejection::NoTechnicalTerm);
        }

        Ok(())
    }

    fn has_emphasis(&self, text: &str) -> bool {
        self.config
            .emphasis
            .iter()
            .any(|glyph| !glyph.is_empty() && text.contains(glyph.as_str()))
    }

    /// A single token must hold both a digit and a marker.
    fn has_figure(&self, text: &str) -> bool {
        text.split_whitespace().any(|token| {
            token.chars().any(|c| c.is_ascii_digit())
                && self
                    .config
                    .magnitude_markers
                    .iter()
                    .any(|m| !m.is_empty() && token.contains(m.as_str()))
        })
    }

    fn has_term(&self, text: &str) -> bool {
        let haystack = text.to_lowercase();
        self.terms
            .iter()
            .any(|term| contains_whole_word(&haystack, term))
    }
}

fn contains_whole_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_word_match() {
        assert!(contains_whole_word("rsi at 30", "rsi"));
        assert!(contains_whole_word("(rsi)", "rsi"));
        assert!(!contains_whole_word("versions", "rsi"));
        assert!(contains_whole_word("open interest rising", "open interest"));
    }
}
