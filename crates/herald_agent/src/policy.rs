//! Content type selection and prompt construction.

use crate::AccountInsight;
use herald_core::{ContentType, Persona, PromptBundle};
use herald_error::ConfigError;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Content settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Voice used when `types` is not given
    pub persona: Persona,
    /// Explicit enabled set; defaults to every type of the persona
    #[serde(skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<ContentType>>,
    /// Hashtag pool
    pub tags: Vec<String>,
    /// Tags appended per post
    pub tag_count: usize,
    /// Body length requested from the model
    pub max_body_chars: usize,
    /// Output token cap per call
    pub max_output_tokens: u32,
    /// Sampling temperature in [0, 1]
    pub temperature: f32,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            persona: Persona::Banter,
            types: None,
            tags: [
                "#CryptoRebel",
                "#NoNormies",
                "#CryptoHumor",
                "#TradingMemes",
                "#CryptoReality",
                "#UncommonAlpha",
                "#CryptoWisdom",
                "#RealTrading",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            tag_count: 2,
            max_body_chars: 200,
            max_output_tokens: 100,
            temperature: 0.9,
        }
    }
}

impl ContentConfig {
    /// Types the policy draws from.
    pub fn enabled_types(&self) -> Vec<ContentType> {
        match &self.types {
            Some(types) => types.clone(),
            None => self.persona.content_types(),
        }
    }
}

/// Chooses what to write and how to ask for it.
#[derive(Debug, Clone)]
pub struct ContentPolicy {
    enabled: Vec<ContentType>,
    tags: Vec<String>,
    tag_count: usize,
    max_body_chars: usize,
    max_output_tokens: u32,
    temperature: f32,
}

impl ContentPolicy {
    /// Build a policy.
    ///
    /// # Errors
    ///
    /// Returns error if no content type is enabled.
    pub fn new(config: &ContentConfig) -> Result<Self, ConfigError> {
        let mut enabled = config.enabled_types();
        enabled.sort();
        enabled.dedup();
        if enabled.is_empty() {
            return Err(ConfigError::new("content.types must enable at least one type"));
        }
        Ok(Self {
            enabled,
            tags: config.tags.clone(),
            tag_count: config.tag_count,
            max_body_chars: config.max_body_chars,
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
        })
    }

    /// Enabled content types.
    pub fn enabled(&self) -> &[ContentType] {
        &self.enabled
    }

    /// Uniform choice over the enabled set.
    pub fn select_type<R: Rng>(&self, rng: &mut R) -> ContentType {
        let idx = rng.gen_range(0..self.enabled.len());
        self.enabled[idx]
    }

    /// Up to `tag_count` distinct picks from the tag pool.
    pub fn sample_tags<R: Rng>(&self, rng: &mut R) -> Vec<String> {
        self.tags
            .choose_multiple(rng, self.tag_count)
            .cloned()
            .collect()
    }

    /// Prompt for `content_type`.
    pub fn build_prompt(&self, content_type: ContentType) -> PromptBundle {
        self.build_prompt_with(content_type, None)
    }

    /// Prompt for `content_type`, with watched-account context when present.
    pub fn build_prompt_with(
        &self,
        content_type: ContentType,
        insight: Option<&AccountInsight>,
    ) -> PromptBundle {
        let mut user = instruction(content_type, self.max_body_chars);
        if let Some(insight) = insight.filter(|i| !i.is_empty()) {
            user.push_str("\n\n");
            user.push_str(&insight.context_paragraph());
        }
        debug!(content_type = %content_type, context = insight.is_some(), "Built prompt");
        PromptBundle::new(
            system_instruction(content_type.persona()),
            user,
            self.max_output_tokens,
            self.temperature,
        )
    }
}

fn system_instruction(persona: Persona) -> &'static str {
    match persona {
        Persona::Banter => {
            "You are a sharp-tongued crypto veteran. You puncture hype with irony, \
             poke fun at trader clichés and always slip in something genuinely useful. \
             Write a single post, no hashtags, no quotation marks."
        }
        Persona::Technical => {
            "You are a market analyst who writes terse, data-first posts. Cite concrete \
             levels, percentages or multiples and name the indicator you are reading. \
             Write a single post, no hashtags, no quotation marks."
        }
    }
}

fn instruction(content_type: ContentType, max_chars: usize) -> String {
    let ask = match content_type {
        ContentType::MarketJoke => {
            "Write a sarcastic one-liner about how traders behave when the market moves."
        }
        ContentType::AlphaInsight => {
            "Share one practical trading habit, framed as a dry joke."
        }
        ContentType::MetaCommentary => {
            "Point out something absurd about how the crypto crowd talks online."
        }
        ContentType::TradingWisdom => {
            "Give a memorable piece of risk-management advice with a twist at the end."
        }
        ContentType::TrendMockery => {
            "Mock whatever narrative everyone is suddenly certain about this week."
        }
        ContentType::MarketCommentary => {
            "Describe the current market structure with at least one price level or percentage."
        }
        ContentType::WhaleObservation => {
            "Report a large-holder flow you would watch for, with a size and a level."
        }
        ContentType::PsychologyNote => {
            "Explain one crowd-psychology signal and the number that confirms it."
        }
        ContentType::PatternReveal => {
            "Call out a chart pattern forming, with its trigger level and target."
        }
        ContentType::SelfReflection => {
            "Review one of your own recent calls honestly, with the figure that proved it right or wrong."
        }
    };
    format!("{} Keep it under {} characters.", ask, max_chars)
}
