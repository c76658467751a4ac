//! Content type tags.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// Style of an agent's voice.
///
/// Each persona owns a fixed set of content types and a matching system
/// instruction.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Persona {
    /// Sarcastic market humour wrapped around real advice.
    Banter,
    /// Data-driven market analysis.
    Technical,
}

impl Persona {
    /// Content types belonging to this persona.
    pub fn content_types(self) -> Vec<ContentType> {
        ContentType::iter().filter(|t| t.persona() == self).collect()
    }
}

/// What kind of post to write this attempt.
///
/// # Examples
///
/// ```
/// use herald_core::{ContentType, Persona};
/// use std::str::FromStr;
///
/// let t = ContentType::from_str("whale-observation").unwrap();
/// assert_eq!(t, ContentType::WhaleObservation);
/// assert_eq!(t.persona(), Persona::Technical);
/// assert_eq!(t.to_string(), "whale-observation");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ContentType {
    /// Joke about trader behaviour or market absurdity
    MarketJoke,
    /// Genuine trading insight wrapped in humour
    AlphaInsight,
    /// Commentary on community trends
    MetaCommentary,
    /// Trading wisdom with a twist
    TradingWisdom,
    /// Mockery of popular narratives
    TrendMockery,
    /// Read of current market structure
    MarketCommentary,
    /// Large-holder flow observation
    WhaleObservation,
    /// Note on trader psychology
    PsychologyNote,
    /// Chart pattern reveal
    PatternReveal,
    /// Reflection on the agent's own calls
    SelfReflection,
}

impl ContentType {
    /// Persona this content type belongs to.
    pub fn persona(self) -> Persona {
        match self {
            Self::MarketJoke
            | Self::AlphaInsight
            | Self::MetaCommentary
            | Self::TradingWisdom
            | Self::TrendMockery => Persona::Banter,
            Self::MarketCommentary
            | Self::WhaleObservation
            | Self::PsychologyNote
            | Self::PatternReveal
            | Self::SelfReflection => Persona::Technical,
        }
    }

    /// Every content type, in declaration order.
    pub fn all() -> Vec<ContentType> {
        Self::iter().collect()
    }
}
