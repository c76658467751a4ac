//! The top-level control loop.

use crate::{AccountInsight, AgentStats, Generator, QualityGate, Rejection, Sleeper};
use chrono::{DateTime, Utc};
use herald_core::{PostId, PublishReceipt};
use herald_error::GenerationError;
use herald_interface::{AccountReader, PublishBackend};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Pauses and sleep window, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Shortest sleep after a publish
    pub min_sleep_secs: u64,
    /// Longest sleep after a publish
    pub max_sleep_secs: u64,
    /// Pause after a quality rejection
    pub rejection_pause_secs: u64,
    /// Pause after a failed generation
    pub error_pause_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            min_sleep_secs: 2 * 3600,
            max_sleep_secs: 4 * 3600,
            rejection_pause_secs: 10,
            error_pause_secs: 300,
        }
    }
}

impl ScheduleConfig {
    /// Pause after a rejection.
    pub fn rejection_pause(&self) -> Duration {
        Duration::from_secs(self.rejection_pause_secs)
    }

    /// Pause after a failed generation.
    pub fn error_pause(&self) -> Duration {
        Duration::from_secs(self.error_pause_secs)
    }

    /// Uniform draw from `[min_sleep_secs, max_sleep_secs]`.
    pub fn next_delay<R: Rng>(&self, rng: &mut R) -> Duration {
        let lo = self.min_sleep_secs.min(self.max_sleep_secs);
        let hi = self.min_sleep_secs.max(self.max_sleep_secs);
        Duration::from_secs(rng.gen_range(lo..=hi))
    }
}

/// Where the loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Phase {
    /// Between cycles
    #[display("idle")]
    Idle,
    /// Calling the completion backend
    #[display("generating")]
    Generating,
    /// Running the quality gate
    #[display("validating")]
    Validating,
    /// Calling the publish backend
    #[display("publishing")]
    Publishing,
    /// Waiting for the next post slot
    #[display("sleeping")]
    Sleeping,
    /// Waiting out a failed generation
    #[display("error-pause")]
    ErrorPause,
    /// Shut down; terminal
    #[display("stopped")]
    Stopped,
}

/// Result of one cycle.
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// The post went out
    Published {
        /// Platform receipt
        receipt: PublishReceipt,
        /// Sleep before the next cycle
        next_delay: Duration,
    },
    /// The publish call failed; the loop sleeps as usual
    PublishFailed {
        /// Sleep before the next cycle
        next_delay: Duration,
    },
    /// The gate turned the post away
    Rejected {
        /// Why
        reason: Rejection,
        /// Pause before the next cycle
        pause: Duration,
    },
    /// Generation failed
    ErrorPause {
        /// The failure
        error: GenerationError,
        /// Pause before the next cycle
        pause: Duration,
    },
    /// Shutdown was requested
    Stopped,
}

impl CycleOutcome {
    /// Wait that follows this outcome, if the loop continues.
    pub fn wait(&self) -> Option<Duration> {
        match self {
            Self::Published { next_delay, .. } | Self::PublishFailed { next_delay } => {
                Some(*next_delay)
            }
            Self::Rejected { pause, .. } | Self::ErrorPause { pause, .. } => Some(*pause),
            Self::Stopped => None,
        }
    }

    /// Phase the loop waits in after this outcome.
    pub fn waiting_phase(&self) -> Phase {
        match self {
            Self::Published { .. } | Self::PublishFailed { .. } => Phase::Sleeping,
            Self::Rejected { .. } => Phase::Idle,
            Self::ErrorPause { .. } => Phase::ErrorPause,
            Self::Stopped => Phase::Stopped,
        }
    }

    /// True for [`CycleOutcome::Stopped`].
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }
}

/// Time of the next allowed action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleState {
    next_action_at: Option<DateTime<Utc>>,
}

impl ScheduleState {
    /// When the loop may act again; `None` means now.
    pub fn next_action_at(&self) -> Option<DateTime<Utc>> {
        self.next_action_at
    }

    /// Push the next action `delay` into the future.
    pub fn defer(&mut self, delay: Duration) {
        self.next_action_at = chrono::TimeDelta::from_std(delay)
            .ok()
            .and_then(|d| Utc::now().checked_add_signed(d));
    }
}

/// Watched accounts feeding context (and reply targets) into generation.
#[derive(Clone)]
pub struct ReactiveSource {
    reader: Arc<dyn AccountReader>,
    accounts: Vec<String>,
    posts_per_account: usize,
    top_posts: usize,
    reply: bool,
}

impl std::fmt::Debug for ReactiveSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactiveSource")
            .field("accounts", &self.accounts)
            .field("posts_per_account", &self.posts_per_account)
            .field("top_posts", &self.top_posts)
            .field("reply", &self.reply)
            .finish()
    }
}

impl ReactiveSource {
    /// Watch `accounts` through `reader`.
    pub fn new(
        reader: Arc<dyn AccountReader>,
        accounts: Vec<String>,
        posts_per_account: usize,
        top_posts: usize,
        reply: bool,
    ) -> Self {
        Self {
            reader,
            accounts,
            posts_per_account,
            top_posts,
            reply,
        }
    }

    /// Read one randomly chosen account. Failures are logged and yield `None`.
    #[instrument(skip_all)]
    async fn read<R: Rng + Send>(&self, rng: &mut R) -> Option<AccountInsight> {
        let account = self.accounts.choose(rng)?.clone();
        match self.reader.recent_posts(&account, self.posts_per_account).await {
            Ok(posts) => {
                let insight = AccountInsight::from_posts(account, &posts, self.top_posts);
                debug!(
                    account = %insight.account,
                    posts = posts.len(),
                    peak_hours = ?insight.peak_hours_utc,
                    "Read watched account"
                );
                (!insight.is_empty()).then_some(insight)
            }
            Err(e) => {
                warn!(account = %account, error = %e, "Failed to read watched account, continuing without context");
                None
            }
        }
    }
}

/// Drives generate, validate, publish and sleep until shutdown.
///
/// No in-cycle failure escapes: generation errors become an error pause, publish
/// errors are logged and the loop sleeps as usual, rejections retry after a short
/// pause. Shutdown is checked at every transition and interrupts every wait.
pub struct Scheduler {
    generator: Generator,
    gate: Option<QualityGate>,
    publisher: Arc<dyn PublishBackend>,
    reactive: Option<ReactiveSource>,
    // Watched-account read carried over a quality rejection.
    carried_insight: Option<Option<AccountInsight>>,
    timing: ScheduleConfig,
    sleeper: Arc<dyn Sleeper>,
    shutdown: CancellationToken,
    rng: StdRng,
    state: ScheduleState,
    phase: Phase,
    stats: AgentStats,
}

impl Scheduler {
    /// Create a scheduler with an entropy-seeded RNG and no gate.
    pub fn new(
        generator: Generator,
        publisher: Arc<dyn PublishBackend>,
        sleeper: Arc<dyn Sleeper>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            generator,
            gate: None,
            publisher,
            reactive: None,
            carried_insight: None,
            timing: ScheduleConfig::default(),
            sleeper,
            shutdown,
            rng: StdRng::from_entropy(),
            state: ScheduleState::default(),
            phase: Phase::Idle,
            stats: AgentStats::new(),
        }
    }

    /// Filter posts through `gate` before publishing.
    pub fn with_gate(mut self, gate: QualityGate) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Feed watched-account context into generation.
    pub fn with_reactive(mut self, source: ReactiveSource) -> Self {
        self.reactive = Some(source);
        self
    }

    /// Replace pauses and the sleep window.
    pub fn with_timing(mut self, timing: ScheduleConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Use a deterministic RNG.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Record into shared counters.
    pub fn with_stats(mut self, stats: AgentStats) -> Self {
        self.stats = stats;
        self
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Next allowed action.
    pub fn state(&self) -> &ScheduleState {
        &self.state
    }

    /// Run counters.
    pub fn stats(&self) -> &AgentStats {
        &self.stats
    }

    fn transition(&mut self, to: Phase) {
        if self.phase != to {
            debug!(from = %self.phase, to = %to, "Phase transition");
            self.phase = to;
        }
    }

    fn stop(&mut self) -> CycleOutcome {
        self.transition(Phase::Stopped);
        info!("Shutdown requested, stopping");
        CycleOutcome::Stopped
    }

    /// One cycle without its trailing wait.
    ///
    /// The returned outcome carries the wait that should follow; the schedule
    /// state is already advanced by it.
    #[instrument(skip(self), fields(cycle = self.stats.cycles() + 1))]
    pub async fn execute_cycle(&mut self) -> CycleOutcome {
        if self.shutdown.is_cancelled() {
            return self.stop();
        }
        self.stats.record_cycle();
        self.transition(Phase::Generating);

        let insight = match (self.carried_insight.take(), &self.reactive) {
            (Some(carried), _) => carried,
            (None, Some(source)) => source.read(&mut self.rng).await,
            (None, None) => None,
        };
        if self.shutdown.is_cancelled() {
            return self.stop();
        }

        let post = match self.generator.generate(&mut self.rng, insight.as_ref()).await {
            Ok(post) => post,
            Err(e) if e.is_cancelled() => return self.stop(),
            Err(e) => {
                let pause = self.timing.error_pause();
                error!(
                    phase = %self.phase,
                    error = %e,
                    pause_secs = pause.as_secs(),
                    "Generation failed, pausing"
                );
                self.stats.record_error_pause();
                self.state.defer(pause);
                return CycleOutcome::ErrorPause { error: e, pause };
            }
        };

        if self.shutdown.is_cancelled() {
            return self.stop();
        }
        self.transition(Phase::Validating);
        if let Some(gate) = &self.gate {
            if let Err(reason) = gate.evaluate(post.as_str()) {
                let pause = self.timing.rejection_pause();
                info!(reason = %reason, pause_secs = pause.as_secs(), "Post failed quality check, retrying");
                self.stats.record_rejection();
                self.state.defer(pause);
                self.carried_insight = Some(insight);
                return CycleOutcome::Rejected { reason, pause };
            }
        }

        if self.shutdown.is_cancelled() {
            return self.stop();
        }
        self.transition(Phase::Publishing);
        let reply_to: Option<PostId> = self
            .reactive
            .as_ref()
            .filter(|source| source.reply)
            .and(insight.as_ref())
            .and_then(|i| i.top_post_id.clone());

        let published = self.publisher.publish(&post, reply_to.as_ref()).await;
        let next_delay = self.timing.next_delay(&mut self.rng);
        self.state.defer(next_delay);

        match published {
            Ok(receipt) => {
                self.stats.record_published();
                info!(
                    platform = %receipt.platform,
                    id = receipt.id.as_ref().map(|id| id.0.as_str()),
                    text = post.as_str(),
                    next_in_hours = next_delay.as_secs_f64() / 3600.0,
                    "Posted"
                );
                CycleOutcome::Published {
                    receipt,
                    next_delay,
                }
            }
            Err(_) if self.shutdown.is_cancelled() => self.stop(),
            Err(e) => {
                self.stats.record_publish_failure();
                error!(
                    platform = self.publisher.platform_name(),
                    error = %e,
                    "Publish failed"
                );
                CycleOutcome::PublishFailed { next_delay }
            }
        }
    }

    /// One full cycle, including its trailing wait.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let outcome = self.execute_cycle().await;
        let Some(wait) = outcome.wait() else {
            return outcome;
        };

        self.transition(outcome.waiting_phase());
        let snapshot = self.stats.snapshot();
        info!(
            cycles = snapshot.cycles,
            published = snapshot.published,
            publish_failures = snapshot.publish_failures,
            rejections = snapshot.rejections,
            error_pauses = snapshot.error_pauses,
            wait_secs = wait.as_secs(),
            next_action_at = ?self.state.next_action_at(),
            "Cycle complete"
        );

        if self.sleeper.sleep(wait).await.is_cancelled() {
            return self.stop();
        }
        self.transition(Phase::Idle);
        outcome
    }

    /// Loop until shutdown.
    #[instrument(skip(self))]
    pub async fn run(&mut self) {
        info!(
            platform = self.publisher.platform_name(),
            gate = self.gate.is_some(),
            reactive = self.reactive.is_some(),
            "Agent started"
        );
        while !self.run_cycle().await.is_stopped() {}
        info!(stats = ?self.stats.snapshot(), "Agent stopped");
    }
}
