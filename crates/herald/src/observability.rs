//! OpenTelemetry span export.
//!
//! Spans recorded through `tracing` are bridged into an SDK tracer provider that
//! writes them to stdout. The provider must be shut down before exit so the exporter
//! flushes; [`crate::LoggingGuard`] owns it for that.

use crate::logging::fmt_layer;
use opentelemetry::{KeyValue, global, trace::TracerProvider};
use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};
use opentelemetry_stdout::SpanExporter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// How the agent identifies itself in exported spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// `service.name` resource attribute
    pub service_name: String,
    /// `service.version` resource attribute
    pub service_version: String,
    /// Filter used when `RUST_LOG` is unset
    pub filter: String,
    /// Emit log lines as JSON
    pub json_logs: bool,
}

impl TelemetryConfig {
    /// Identify spans as the herald agent at this build's version.
    pub fn agent(filter: impl Into<String>, json_logs: bool) -> Self {
        Self {
            service_name: "herald".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            filter: filter.into(),
            json_logs,
        }
    }
}

/// Tracer provider exporting to stdout, tagged with the service attributes.
pub fn tracer_provider(config: &TelemetryConfig) -> SdkTracerProvider {
    let resource = Resource::builder()
        .with_service_name(config.service_name.clone())
        .with_attributes([KeyValue::new(
            "service.version",
            config.service_version.clone(),
        )])
        .build();

    SdkTracerProvider::builder()
        .with_simple_exporter(SpanExporter::default())
        .with_resource(resource)
        .build()
}

/// Install the subscriber with the OpenTelemetry bridge.
///
/// Returns the provider so the caller can flush it on exit.
///
/// # Errors
///
/// Returns error if the filter does not parse or a subscriber is already installed.
pub fn init_telemetry(
    config: &TelemetryConfig,
) -> Result<SdkTracerProvider, Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.filter))?;

    let provider = tracer_provider(config);
    let tracer = provider.tracer(config.service_name.clone());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer(config.json_logs))
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .try_init()?;

    global::set_tracer_provider(provider.clone());
    Ok(provider)
}
