//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the monitor.
//! All types derive Serde traits for deserialization from config files.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Root configuration for the monitoring service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MonitorConfig {
    /// The service being probed.
    pub target: TargetConfig,

    /// Probe cycle settings.
    pub probe: ProbeConfig,

    /// The monitor's own HTTP surface (health, metrics).
    pub server: ServerConfig,

    /// Log output settings.
    pub logging: LoggingConfig,

    /// Span export settings.
    pub tracing: TracingConfig,
}

/// Target service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Absolute base URL every endpoint is appended to.
    pub base_url: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.gatewayz.ai".to_string(),
        }
    }
}

/// Probe cycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Milliseconds between the start of two cycles.
    pub interval_ms: u64,

    /// Hard deadline for a single request in milliseconds.
    pub request_timeout_ms: u64,

    /// Pause after each endpoint in milliseconds.
    pub inter_request_delay_ms: u64,

    /// Paths probed in order, appended verbatim to the base URL.
    pub endpoints: Vec<String>,

    /// User-Agent sent with every probe.
    pub user_agent: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            interval_ms: 30_000,
            request_timeout_ms: 10_000,
            inter_request_delay_ms: 1_000,
            endpoints: vec!["/".to_string(), "/health".to_string(), "/status".to_string()],
            user_agent: "Gatewayz-Monitor/1.0".to_string(),
        }
    }
}

/// Listener configuration for the health and metrics routes.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,

    /// Port to bind.
    pub port: u16,
}

impl ServerConfig {
    /// Socket address string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9091,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub level: String,

    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// OTLP span export. Disabled unless `tempo_url` is set.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TracingConfig {
    /// Collector base URL; spans are posted to `{tempo_url}/v1/traces`.
    pub tempo_url: Option<String>,

    /// `service.name` resource attribute.
    pub service_name: String,

    /// `deployment.environment` resource attribute.
    pub environment: String,

    /// `service.namespace` resource attribute.
    pub namespace: String,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            tempo_url: None,
            service_name: "gatewayz-monitor".to_string(),
            environment: "production".to_string(),
            namespace: "monitoring".to_string(),
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable, for terminals.
    #[default]
    Pretty,
    /// One JSON object per line, for log shippers.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}
