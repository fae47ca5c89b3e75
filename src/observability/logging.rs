//! Structured logging and span export.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Configure log level from config, overridable with `RUST_LOG`
//! - Ship spans to an OTLP/HTTP collector when one is configured
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - Log lines go to stderr; stdout is reserved for command output
//! - Span export is a `tracing-opentelemetry` layer over the same span tree,
//!   so nothing in the probe engine knows whether spans leave the process

use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::TracerProvider;
use opentelemetry_sdk::{runtime, Resource};
use thiserror::Error;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, LoggingConfig, TracingConfig};

/// Error type for telemetry setup.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to install subscriber: {0}")]
    Subscriber(#[from] TryInitError),

    #[error("failed to build span exporter: {0}")]
    Exporter(String),
}

/// Keeps the span exporter alive. Dropping it flushes pending spans.
#[derive(Debug)]
pub struct TelemetryGuard {
    provider: Option<TracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                tracing::warn!(error = %e, "Failed to flush spans on shutdown");
            }
        }
    }
}

/// Install the global subscriber. Call once, at startup, from inside the
/// tokio runtime.
pub fn init_logging(
    logging: &LoggingConfig,
    export: &TracingConfig,
) -> Result<TelemetryGuard, TelemetryError> {
    let provider = export
        .tempo_url
        .as_deref()
        .map(|url| tracer_provider(url, export))
        .transpose()?;

    let telemetry = provider.as_ref().map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer(export.service_name.clone()))
    });
    let registry = tracing_subscriber::registry()
        .with(env_filter(logging))
        .with(telemetry);

    match logging.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()?,
    }

    if let Some(url) = export.tempo_url.as_deref() {
        tracing::info!(
            endpoint = %traces_endpoint(url),
            service_name = %export.service_name,
            "Exporting spans over OTLP"
        );
    }
    Ok(TelemetryGuard { provider })
}

fn tracer_provider(url: &str, config: &TracingConfig) -> Result<TracerProvider, TelemetryError> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(traces_endpoint(url))
        .build()
        .map_err(|e| TelemetryError::Exporter(e.to_string()))?;

    Ok(TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_resource(resource(config))
        .build())
}

/// OTLP/HTTP trace ingest path under the collector base URL.
fn traces_endpoint(url: &str) -> String {
    format!("{}/v1/traces", url.trim_end_matches('/'))
}

fn resource(config: &TracingConfig) -> Resource {
    Resource::new(vec![
        KeyValue::new("service.name", config.service_name.clone()),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        KeyValue::new("deployment.environment", config.environment.clone()),
        KeyValue::new("service.namespace", config.namespace.clone()),
    ])
}

/// `RUST_LOG` wins; otherwise the configured level applies to this crate and
/// the HTTP middleware.
fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directives(&config.level).into())
}

fn default_directives(level: &str) -> String {
    format!("gatewayz_monitor={level},tower_http={level}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::{Key, Value};

    #[test]
    fn test_default_directives() {
        assert_eq!(
            default_directives("debug"),
            "gatewayz_monitor=debug,tower_http=debug"
        );
    }

    #[test]
    fn test_traces_endpoint() {
        assert_eq!(traces_endpoint("http://tempo:4318"), "http://tempo:4318/v1/traces");
        assert_eq!(traces_endpoint("http://tempo:4318/"), "http://tempo:4318/v1/traces");
    }

    #[test]
    fn test_resource_attributes() {
        let mut config = TracingConfig::default();
        config.service_name = "gatewayz-monitor-eu".into();
        let resource = resource(&config);

        assert_eq!(
            resource.get(Key::new("service.name")),
            Some(Value::from("gatewayz-monitor-eu".to_string()))
        );
        assert_eq!(
            resource.get(Key::new("deployment.environment")),
            Some(Value::from("production"))
        );
        assert_eq!(
            resource.get(Key::new("service.namespace")),
            Some(Value::from("monitoring"))
        );
        assert!(resource.get(Key::new("service.version")).is_some());
    }
}
