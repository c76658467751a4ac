//! Wiring configuration and credentials into a running agent.

use crate::{Commands, RunArgs};
use herald_agent::{
    AgentConfig, CancellableSleeper, ContentPolicy, Credentials, CycleOutcome,
    DISCORD_WEBHOOK_URL, Finisher, Generator, PlatformKind, QualityGate, ReactiveSource,
    Scheduler, Sleeper, X_BEARER_TOKEN, X_USER_ACCESS_TOKEN,
};
use herald_error::{ConfigError, HeraldResult};
use herald_interface::{AccountReader, CompletionBackend, PublishBackend};
use herald_models::OpenAiCompatibleClient;
use herald_social::{
    DiscordWebhookPublisher, LogPublisher, PublishRetryConfig, RetryingPublisher,
    XAccountReader, XPublisher,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

/// Execute a parsed command.
///
/// # Errors
///
/// Returns error on invalid configuration, missing credentials or, with
/// `run --once`, a failed generation.
pub async fn dispatch(command: Commands) -> HeraldResult<()> {
    match command {
        Commands::Run(args) => run(args).await,
        Commands::Check { config } => check(config.as_deref()),
        Commands::Config { config } => {
            println!("{}", effective_config(config.as_deref())?);
            Ok(())
        }
    }
}

/// Load and validate configuration, applying run-time overrides.
///
/// # Errors
///
/// Returns error if loading or validation fails.
pub fn load_config(path: Option<&Path>, dry_run: bool) -> Result<AgentConfig, ConfigError> {
    let mut config = AgentConfig::load(path)?;
    if dry_run {
        config.platform.kind = PlatformKind::Log;
    }
    config.validate()?;
    Ok(config)
}

/// Configuration as TOML, after every layer is applied.
///
/// # Errors
///
/// Returns error if loading fails.
pub fn effective_config(path: Option<&Path>) -> Result<String, ConfigError> {
    AgentConfig::load(path)?.to_toml()
}

/// Validate configuration and credentials without starting the loop.
///
/// # Errors
///
/// Returns error naming every invalid setting or missing variable.
pub fn check(path: Option<&Path>) -> HeraldResult<()> {
    let config = load_config(path, false)?;
    Credentials::from_env(&config)?;
    info!(
        platform = %config.platform.kind,
        model = %config.backend.model,
        reactive = config.reactive.enabled,
        "Configuration and credentials look good"
    );
    Ok(())
}

/// Run the loop, or a single cycle with `--once`, until Ctrl-C.
///
/// # Errors
///
/// Returns error if startup validation fails, or if a `--once` cycle could not
/// generate a post.
#[instrument(skip_all, fields(dry_run = args.dry_run, once = args.once))]
pub async fn run(args: RunArgs) -> HeraldResult<()> {
    let config = load_config(args.config.as_deref(), args.dry_run)?;
    let credentials = Credentials::from_env(&config)?;

    let shutdown = CancellationToken::new();
    let mut scheduler = build_scheduler(&config, &credentials, args.seed, shutdown.clone())?;

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown requested");
                signal_token.cancel();
            }
            Err(e) => warn!(error = %e, "Could not listen for Ctrl-C"),
        }
    });

    if args.once {
        return match scheduler.execute_cycle().await {
            CycleOutcome::ErrorPause { error, .. } => {
                error!(error = %error, "Single cycle failed");
                Err(error.into())
            }
            outcome => {
                info!(?outcome, "Single cycle finished");
                Ok(())
            }
        };
    }

    scheduler.run().await;
    Ok(())
}

/// Assemble a scheduler from validated configuration and credentials.
///
/// # Errors
///
/// Returns error if an HTTP client cannot be built or a needed credential is absent.
pub fn build_scheduler(
    config: &AgentConfig,
    credentials: &Credentials,
    seed: Option<u64>,
    shutdown: CancellationToken,
) -> HeraldResult<Scheduler> {
    let sleeper: Arc<dyn Sleeper> = Arc::new(CancellableSleeper::new(shutdown.clone()));

    let backend: Arc<dyn CompletionBackend> = Arc::new(OpenAiCompatibleClient::new(
        credentials.completion_api_key.clone(),
        &config.backend.model,
        &config.backend.endpoint,
        provider_label(&config.backend.provider),
        config.generation.call_timeout(),
    )?);

    let publisher = build_publisher(config, credentials, &shutdown)?;
    let limit = config
        .platform
        .max_post_length
        .min(publisher.max_post_length());

    let generator = Generator::new(
        backend,
        ContentPolicy::new(&config.content)?,
        Finisher::new(limit, config.generation.overflow),
        config.generation.retry_policy(),
        config.generation.call_timeout(),
        Arc::clone(&sleeper),
    );

    let mut scheduler =
        Scheduler::new(generator, publisher, sleeper, shutdown).with_timing(config.schedule);

    if config.quality.enabled {
        scheduler = scheduler.with_gate(QualityGate::new(config.quality_config()));
    }
    if config.reactive.enabled {
        let reader = build_reader(config, credentials)?;
        scheduler = scheduler.with_reactive(ReactiveSource::new(
            reader,
            config.reactive.accounts.clone(),
            config.reactive.posts_per_account,
            config.reactive.top_posts,
            config.reactive.reply,
        ));
    }
    if let Some(seed) = seed {
        scheduler = scheduler.with_seed(seed);
    }

    info!(
        provider = %config.backend.provider,
        model = %config.backend.model,
        platform = %config.platform.kind,
        limit,
        "Agent assembled"
    );
    Ok(scheduler)
}

fn build_publisher(
    config: &AgentConfig,
    credentials: &Credentials,
    shutdown: &CancellationToken,
) -> HeraldResult<Arc<dyn PublishBackend>> {
    let timeout = Duration::from_secs(config.platform.timeout_secs);
    let retry = PublishRetryConfig {
        max_retries: config.publish.max_retries,
        interval: Duration::from_secs(config.publish.retry_interval_secs),
    };

    let publisher: Arc<dyn PublishBackend> = match config.platform.kind {
        PlatformKind::X => {
            let token = required(&credentials.x_user_access_token, X_USER_ACCESS_TOKEN)?;
            let client = XPublisher::new(token, timeout)?
                .with_base_url(config.platform.x_api_base.clone())
                .with_max_post_length(config.platform.max_post_length);
            Arc::new(RetryingPublisher::new(client, retry).with_shutdown(shutdown.clone()))
        }
        PlatformKind::Discord => {
            let url = required(&credentials.discord_webhook_url, DISCORD_WEBHOOK_URL)?;
            let client = DiscordWebhookPublisher::new(url, timeout)?
                .with_max_post_length(config.platform.max_post_length);
            Arc::new(RetryingPublisher::new(client, retry).with_shutdown(shutdown.clone()))
        }
        PlatformKind::Log => Arc::new(LogPublisher::new(config.platform.max_post_length)),
    };
    Ok(publisher)
}

fn build_reader(
    config: &AgentConfig,
    credentials: &Credentials,
) -> HeraldResult<Arc<dyn AccountReader>> {
    let token = required(&credentials.x_bearer_token, X_BEARER_TOKEN)?;
    let reader = XAccountReader::new(token, Duration::from_secs(config.platform.timeout_secs))?
        .with_base_url(config.platform.x_api_base.clone());
    Ok(Arc::new(reader))
}

fn required(value: &Option<String>, name: &str) -> Result<String, ConfigError> {
    value
        .clone()
        .ok_or_else(|| ConfigError::new(format!("Missing environment variables: {}", name)))
}

fn provider_label(provider: &str) -> &'static str {
    match provider {
        "openai" => "openai",
        "openrouter" => "openrouter",
        "groq" => "groq",
        _ => "openai-compatible",
    }
}
