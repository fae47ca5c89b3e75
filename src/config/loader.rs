//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::config::schema::MonitorConfig;
use crate::config::validation::{validate_config, ValidationError};

pub const ENV_TARGET_API: &str = "TARGET_API";
pub const ENV_PORT: &str = "PORT";
pub const ENV_INTERVAL_MS: &str = "MONITOR_INTERVAL_MS";
pub const ENV_ENDPOINTS: &str = "MONITOR_ENDPOINTS";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "MONITOR_REQUEST_TIMEOUT_MS";
pub const ENV_REQUEST_DELAY_MS: &str = "MONITOR_REQUEST_DELAY_MS";
pub const ENV_USER_AGENT: &str = "MONITOR_USER_AGENT";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";
pub const ENV_TEMPO_URL: &str = "TEMPO_URL";
pub const ENV_TEMPO_SERVICE_NAME: &str = "TEMPO_SERVICE_NAME";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: '{value}'")]
    Env { key: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: defaults, then the optional TOML file, then the
/// process environment. The result is validated before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<MonitorConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_file(path)?,
        None => MonitorConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::debug!(?config, "Configuration resolved");
    Ok(config)
}

/// Parse a TOML file. Missing sections fall back to defaults.
pub fn load_file(path: &Path) -> Result<MonitorConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Overlay environment-style keys onto `config`.
///
/// `lookup` abstracts the environment so callers can supply a fixed map.
pub fn apply_env_overrides<F>(config: &mut MonitorConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_TARGET_API) {
        config.target.base_url = url;
    }
    if let Some(raw) = lookup(ENV_PORT) {
        config.server.port = parse_env(ENV_PORT, raw)?;
    }
    if let Some(raw) = lookup(ENV_INTERVAL_MS) {
        config.probe.interval_ms = parse_env(ENV_INTERVAL_MS, raw)?;
    }
    if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT_MS) {
        config.probe.request_timeout_ms = parse_env(ENV_REQUEST_TIMEOUT_MS, raw)?;
    }
    if let Some(raw) = lookup(ENV_REQUEST_DELAY_MS) {
        config.probe.inter_request_delay_ms = parse_env(ENV_REQUEST_DELAY_MS, raw)?;
    }
    if let Some(raw) = lookup(ENV_ENDPOINTS) {
        config.probe.endpoints = raw.split(',').map(|s| s.trim().to_string()).collect();
    }
    if let Some(agent) = lookup(ENV_USER_AGENT) {
        config.probe.user_agent = agent;
    }
    if let Some(level) = lookup(ENV_LOG_LEVEL) {
        config.logging.level = level;
    }
    if let Some(raw) = lookup(ENV_LOG_FORMAT) {
        config.logging.format = parse_env(ENV_LOG_FORMAT, raw)?;
    }
    if let Some(url) = lookup(ENV_TEMPO_URL) {
        // An empty value disables export.
        let url = url.trim();
        config.tracing.tempo_url = (!url.is_empty()).then(|| url.to_string());
    }
    if let Some(name) = lookup(ENV_TEMPO_SERVICE_NAME) {
        config.tracing.service_name = name;
    }
    Ok(())
}

fn parse_env<T: FromStr>(key: &'static str, raw: String) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::Env { key, value: raw })
}
