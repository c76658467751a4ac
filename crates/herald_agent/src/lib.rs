//! The Herald posting agent.
//!
//! Data flows one way through the crate:
//!
//! - [`Scheduler`] drives each cycle and owns every wait.
//! - [`Generator`] asks the [`ContentPolicy`] for a prompt, calls the completion
//!   backend with [`RetryPolicy`] backoff and finishes the text with a [`Finisher`].
//! - [`QualityGate`] accepts or rejects the finished post.
//! - The publish backend delivers it.
//!
//! All waits go through a [`Sleeper`] so shutdown can interrupt them and tests can
//! record them.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod finish;
mod generator;
mod insight;
mod policy;
mod quality;
mod retry;
mod scheduler;
mod sleep;
mod stats;

pub use config::{
    AgentConfig, BackendConfig, Credentials, DISCORD_WEBHOOK_URL, ENV_PREFIX, GenerationConfig,
    PlatformConfig, PlatformKind, PublishConfig, QualitySettings, ReactiveConfig, X_BEARER_TOKEN,
    X_USER_ACCESS_TOKEN,
};
pub use finish::{Finisher, OverflowPolicy};
pub use generator::Generator;
pub use insight::AccountInsight;
pub use policy::{ContentConfig, ContentPolicy};
pub use quality::{Liveliness, QualityConfig, QualityGate, Rejection};
pub use retry::RetryPolicy;
pub use scheduler::{CycleOutcome, Phase, ReactiveSource, ScheduleConfig, ScheduleState, Scheduler};
pub use sleep::{CancellableSleeper, SleepOutcome, Sleeper};
pub use stats::{AgentStats, StatsSnapshot};
