//! Agent configuration.
//!
//! Sources, later overriding earlier:
//! 1. Bundled defaults (`herald.toml` shipped with this crate)
//! 2. `~/.config/herald/herald.toml`
//! 3. `./herald.toml`, or the explicit path given on the command line
//! 4. `HERALD__SECTION__KEY` environment variables
//!
//! Credentials never live in these files; see [`Credentials`].

use crate::{
    ContentConfig, Liveliness, OverflowPolicy, QualityConfig, RetryPolicy, ScheduleConfig,
};
use config::{Config, Environment, File, FileFormat};
use herald_core::Persona;
use herald_error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../herald.toml");

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "HERALD";

/// Generation retry and timeout settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Total attempts per generation
    pub max_retries: u32,
    /// Backoff base; attempt `i` waits `base * 2^i`
    pub base_delay_secs: u64,
    /// Bound on a single backend call
    pub call_timeout_secs: u64,
    /// What to do when text plus tags overflows
    pub overflow: OverflowPolicy,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay_secs: 60,
            call_timeout_secs: 60,
            overflow: OverflowPolicy::Resample,
        }
    }
}

impl GenerationConfig {
    /// Backoff policy.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_secs(self.base_delay_secs))
    }

    /// Per-call timeout.
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

/// Publish retry settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Retries after the first publish attempt
    pub max_retries: usize,
    /// Base wait between publish attempts
    pub retry_interval_secs: u64,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            retry_interval_secs: 30,
        }
    }
}

/// Watched-account settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactiveConfig {
    /// Read watched accounts before generating
    pub enabled: bool,
    /// Handles to watch
    pub accounts: Vec<String>,
    /// Recent posts fetched per read
    pub posts_per_account: usize,
    /// Best posts quoted into the prompt
    pub top_posts: usize,
    /// Publish as a reply to the best post
    pub reply: bool,
}

impl Default for ReactiveConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            accounts: Vec::new(),
            posts_per_account: 10,
            top_posts: 3,
            reply: false,
        }
    }
}

/// Completion backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Provider label used in logs
    pub provider: String,
    /// Model identifier
    pub model: String,
    /// Chat-completions URL
    pub endpoint: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

/// Publishing target.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    /// X (Twitter)
    #[default]
    #[display("x")]
    X,
    /// Discord webhook
    #[display("discord")]
    Discord,
    /// Log only
    #[display("log")]
    Log,
}

/// Platform settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Where posts go
    pub kind: PlatformKind,
    /// Hard post length limit in characters
    pub max_post_length: usize,
    /// HTTP timeout for platform calls
    pub timeout_secs: u64,
    /// X API origin
    pub x_api_base: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            kind: PlatformKind::X,
            max_post_length: 280,
            timeout_secs: 30,
            x_api_base: "https://api.x.com".to_string(),
        }
    }
}

/// Quality gate settings.
///
/// Thresholds start from the preset of `preset`, or of `content.persona` when no
/// preset is named; each key given here replaces the preset's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualitySettings {
    /// Whether the gate runs at all
    pub enabled: bool,
    /// Preset to start from; defaults to the content persona
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<Persona>,
    /// Maximum length in characters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_chars: Option<usize>,
    /// Minimum whitespace-separated words
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_words: Option<usize>,
    /// Liveliness tier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liveliness: Option<Liveliness>,
    /// Emphasis allow-set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emphasis: Option<Vec<String>>,
    /// Magnitude markers for numeric liveliness
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magnitude_markers: Option<Vec<String>>,
    /// Domain vocabulary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technical_terms: Option<Vec<String>>,
}

impl Default for QualitySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            preset: None,
            max_chars: None,
            min_words: None,
            liveliness: None,
            emphasis: None,
            magnitude_markers: None,
            technical_terms: None,
        }
    }
}

impl QualitySettings {
    /// Gate thresholds for a loop writing as `persona`.
    pub fn resolve(&self, persona: Persona) -> QualityConfig {
        let base = QualityConfig::for_persona(self.preset.unwrap_or(persona));
        QualityConfig {
            enabled: self.enabled,
            max_chars: self.max_chars.unwrap_or(base.max_chars),
            min_words: self.min_words.unwrap_or(base.min_words),
            liveliness: self.liveliness.unwrap_or(base.liveliness),
            emphasis: self.emphasis.clone().unwrap_or(base.emphasis),
            magnitude_markers: self
                .magnitude_markers
                .clone()
                .unwrap_or(base.magnitude_markers),
            technical_terms: self.technical_terms.clone().unwrap_or(base.technical_terms),
        }
    }
}

/// Complete agent configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Generation retry and timeout
    pub generation: GenerationConfig,
    /// Quality gate
    pub quality: QualitySettings,
    /// Pauses and sleep window
    pub schedule: ScheduleConfig,
    /// Content types, tags and sampling
    pub content: ContentConfig,
    /// Publish retry
    pub publish: PublishConfig,
    /// Watched accounts
    pub reactive: ReactiveConfig,
    /// Completion backend
    pub backend: BackendConfig,
    /// Publishing target
    pub platform: PlatformConfig,
}

impl AgentConfig {
    /// Gate thresholds for the configured persona.
    pub fn quality_config(&self) -> QualityConfig {
        self.quality.resolve(self.content.persona)
    }

    /// Load with the standard precedence, reading process environment variables.
    ///
    /// # Errors
    ///
    /// Returns error if a source cannot be read or parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(explicit, None)
    }

    /// Load with the standard precedence; `env` replaces the process environment
    /// when given.
    ///
    /// # Errors
    ///
    /// Returns error if a source cannot be read or parsed, or if an explicit path
    /// does not exist.
    #[instrument(skip_all, fields(explicit = ?explicit))]
    pub fn load_with_env(
        explicit: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        debug!("Loading configuration");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/herald/herald.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = match explicit {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name("herald").required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        builder
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))
    }

    /// Parse a TOML document on top of the defaults.
    ///
    /// # Errors
    ///
    /// Returns error if the document does not parse.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from_str(toml_str, FileFormat::Toml))
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))
    }

    /// Render as TOML.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::new(format!("Failed to serialize configuration: {}", e)))
    }

    /// Reject configurations the loop cannot run with.
    ///
    /// Every problem is reported in one error.
    ///
    /// # Errors
    ///
    /// Returns error listing each invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        if self.content.enabled_types().is_empty() {
            problems.push("content.types must enable at least one type".to_string());
        }
        if !(0.0..=1.0).contains(&self.content.temperature) {
            problems.push(format!(
                "content.temperature must be within [0, 1], got {}",
                self.content.temperature
            ));
        }
        if self.content.tags.iter().any(|t| t.trim().is_empty()) {
            problems.push("content.tags must not contain blank tags".to_string());
        }
        if let Some(tag) = self
            .content
            .tags
            .iter()
            .map(|t| t.trim())
            .find(|t| t.contains(char::is_whitespace))
        {
            problems.push(format!("content.tags must be single words, got {:?}", tag));
        }
        if self.generation.max_retries == 0 {
            problems.push("generation.max_retries must be at least 1".to_string());
        }
        if self.generation.call_timeout_secs == 0 {
            problems.push("generation.call_timeout_secs must be positive".to_string());
        }
        if self.schedule.min_sleep_secs > self.schedule.max_sleep_secs {
            problems.push(format!(
                "schedule.min_sleep_secs ({}) exceeds schedule.max_sleep_secs ({})",
                self.schedule.min_sleep_secs, self.schedule.max_sleep_secs
            ));
        }
        if self.platform.max_post_length == 0 {
            problems.push("platform.max_post_length must be positive".to_string());
        }
        if self.quality.enabled && self.quality_config().max_chars == 0 {
            problems.push("quality.max_chars must be positive".to_string());
        }
        if self.reactive.enabled && self.reactive.accounts.is_empty() {
            problems.push("reactive.accounts must list at least one account".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::new(format!(
                "Invalid configuration: {}",
                problems.join("; ")
            )))
        }
    }
}

/// Secrets read from the environment.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Completion backend key
    pub completion_api_key: String,
    /// X OAuth 2.0 user token, when publishing to X
    pub x_user_access_token: Option<String>,
    /// X app bearer token, when reading watched accounts
    pub x_bearer_token: Option<String>,
    /// Discord webhook URL, when publishing to Discord
    pub discord_webhook_url: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("completion_api_key", &"<redacted>")
            .field("x_user_access_token", &self.x_user_access_token.as_ref().map(|_| "<redacted>"))
            .field("x_bearer_token", &self.x_bearer_token.as_ref().map(|_| "<redacted>"))
            .field("discord_webhook_url", &self.discord_webhook_url.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// X user token variable.
pub const X_USER_ACCESS_TOKEN: &str = "X_USER_ACCESS_TOKEN";
/// X app bearer token variable.
pub const X_BEARER_TOKEN: &str = "X_BEARER_TOKEN";
/// Discord webhook variable.
pub const DISCORD_WEBHOOK_URL: &str = "DISCORD_WEBHOOK_URL";

impl Credentials {
    /// Read the credentials `config` needs from the process environment.
    ///
    /// # Errors
    ///
    /// Returns one error naming every missing variable.
    pub fn from_env(config: &AgentConfig) -> Result<Self, ConfigError> {
        Self::from_lookup(config, |name| std::env::var(name).ok())
    }

    /// Read the credentials `config` needs through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns one error naming every missing variable.
    pub fn from_lookup(
        config: &AgentConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut missing: Vec<String> = Vec::new();
        let mut require = |name: &str| -> Option<String> {
            let value = lookup(name).filter(|v| !v.trim().is_empty());
            if value.is_none() {
                missing.push(name.to_string());
            }
            value
        };

        let completion_api_key = require(&config.backend.api_key_env);
        let x_user_access_token = match config.platform.kind {
            PlatformKind::X => require(X_USER_ACCESS_TOKEN),
            _ => None,
        };
        let discord_webhook_url = match config.platform.kind {
            PlatformKind::Discord => require(DISCORD_WEBHOOK_URL),
            _ => None,
        };
        let x_bearer_token = if config.reactive.enabled {
            require(X_BEARER_TOKEN)
        } else {
            None
        };

        if !missing.is_empty() {
            return Err(ConfigError::new(format!(
                "Missing environment variables: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            completion_api_key: completion_api_key.unwrap_or_default(),
            x_user_access_token,
            x_bearer_token,
            discord_webhook_url,
        })
    }
}
