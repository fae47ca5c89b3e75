//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (interval and timeout > 0, port valid)
//! - Check the base URL is absolute and the endpoint list is usable
//! - Check the span collector URL when export is enabled
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MonitorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use reqwest::header::HeaderValue;
use thiserror::Error;
use url::Url;

use crate::config::schema::MonitorConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("target.base_url '{0}' is not an absolute http(s) URL")]
    InvalidBaseUrl(String),

    #[error("probe.endpoints must contain at least one path")]
    NoEndpoints,

    #[error("probe.endpoints[{0}] is blank")]
    BlankEndpoint(usize),

    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),

    #[error("probe.user_agent is not a valid header value")]
    InvalidUserAgent,

    #[error("tracing.tempo_url '{0}' is not an absolute http(s) URL")]
    InvalidTempoUrl(String),
}

/// Validate a full configuration, collecting every error.
pub fn validate_config(config: &MonitorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = validate_base_url(&config.target.base_url) {
        errors.push(e);
    }

    if let Err(mut endpoint_errors) = normalize_endpoints(&config.probe.endpoints) {
        errors.append(&mut endpoint_errors);
    }

    if config.probe.interval_ms == 0 {
        errors.push(ValidationError::NotPositive("probe.interval_ms"));
    }
    if config.probe.request_timeout_ms == 0 {
        errors.push(ValidationError::NotPositive("probe.request_timeout_ms"));
    }
    if config.server.port == 0 {
        errors.push(ValidationError::NotPositive("server.port"));
    }

    if HeaderValue::from_str(&config.probe.user_agent).is_err() {
        errors.push(ValidationError::InvalidUserAgent);
    }

    if let Some(tempo_url) = &config.tracing.tempo_url {
        if !is_http_url(tempo_url) {
            errors.push(ValidationError::InvalidTempoUrl(tempo_url.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Accept only absolute `http`/`https` URLs with a host.
pub fn validate_base_url(raw: &str) -> Result<(), ValidationError> {
    if is_http_url(raw) {
        Ok(())
    } else {
        Err(ValidationError::InvalidBaseUrl(raw.to_string()))
    }
}

fn is_http_url(raw: &str) -> bool {
    matches!(Url::parse(raw), Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host())
}

/// Trim every endpoint, rejecting an empty list and blank entries.
pub fn normalize_endpoints(endpoints: &[String]) -> Result<Vec<String>, Vec<ValidationError>> {
    if endpoints.is_empty() {
        return Err(vec![ValidationError::NoEndpoints]);
    }

    let mut errors = Vec::new();
    let mut normalized = Vec::with_capacity(endpoints.len());
    for (i, endpoint) in endpoints.iter().enumerate() {
        let trimmed = endpoint.trim();
        if trimmed.is_empty() {
            errors.push(ValidationError::BlankEndpoint(i));
        } else {
            normalized.push(trimmed.to_string());
        }
    }

    if errors.is_empty() {
        Ok(normalized)
    } else {
        Err(errors)
    }
}
