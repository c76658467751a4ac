//! Tracing subscriber setup.

use tracing::Subscriber;
use tracing_subscriber::Layer;
use tracing_subscriber::registry::LookupSpan;

/// Default filter when `RUST_LOG` is unset.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose { "info,herald=debug,herald_agent=debug" } else { "info" }
}

/// Flushes exported spans when the agent exits.
///
/// Without the `observability` feature there is nothing to flush and
/// [`LoggingGuard::shutdown`] is a no-op.
#[derive(Default)]
#[must_use = "dropping the guard without shutdown loses the last spans"]
pub struct LoggingGuard {
    #[cfg(feature = "observability")]
    provider: Option<opentelemetry_sdk::trace::SdkTracerProvider>,
}

#[cfg(feature = "observability")]
impl LoggingGuard {
    /// True when spans are being exported.
    pub fn exports_spans(&self) -> bool {
        self.provider.is_some()
    }

    /// Flush and stop span export.
    pub fn shutdown(self) {
        let Some(provider) = self.provider else {
            return;
        };
        if let Err(e) = provider.shutdown() {
            tracing::warn!(error = %e, "Span exporter did not shut down cleanly");
        }
    }
}

#[cfg(not(feature = "observability"))]
impl LoggingGuard {
    /// True when spans are being exported.
    pub fn exports_spans(&self) -> bool {
        false
    }

    /// Flush and stop span export.
    pub fn shutdown(self) {}
}

pub(crate) fn fmt_layer<S>(json: bool) -> Box<dyn Layer<S> + Send + Sync + 'static>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer().with_target(false).boxed()
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `verbose`. With the `observability` feature, spans are also
/// exported through OpenTelemetry until the returned guard is shut down.
///
/// # Errors
///
/// Returns error if the filter does not parse or a subscriber is already installed.
#[cfg(not(feature = "observability"))]
pub fn init_logging(verbose: bool, json: bool) -> Result<LoggingGuard, Box<dyn std::error::Error>> {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_filter(verbose)))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer(json))
        .try_init()?;

    Ok(LoggingGuard::default())
}

/// Install the global subscriber with OpenTelemetry export.
///
/// # Errors
///
/// Returns error if the filter does not parse or a subscriber is already installed.
#[cfg(feature = "observability")]
pub fn init_logging(verbose: bool, json: bool) -> Result<LoggingGuard, Box<dyn std::error::Error>> {
    use crate::observability::{TelemetryConfig, init_telemetry};

    let provider = init_telemetry(&TelemetryConfig::agent(default_filter(verbose), json))?;
    Ok(LoggingGuard {
        provider: Some(provider),
    })
}
