//! The probed service and the cadence it is probed at.

use std::time::Duration;

use reqwest::header::HeaderValue;

use crate::config::validation::{normalize_endpoints, validate_config, ValidationError};
use crate::config::MonitorConfig;

/// Immutable probe configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct ProbeTarget {
    base_url: String,
    endpoints: Vec<String>,
    interval: Duration,
    request_timeout: Duration,
    inter_request_delay: Duration,
    user_agent: HeaderValue,
}

impl ProbeTarget {
    /// Build from a configuration, validating it first.
    pub fn from_config(config: &MonitorConfig) -> Result<Self, Vec<ValidationError>> {
        validate_config(config)?;

        let endpoints = normalize_endpoints(&config.probe.endpoints)?;
        let user_agent = HeaderValue::from_str(&config.probe.user_agent)
            .map_err(|_| vec![ValidationError::InvalidUserAgent])?;

        Ok(Self {
            base_url: config.target.base_url.clone(),
            endpoints,
            interval: Duration::from_millis(config.probe.interval_ms),
            request_timeout: Duration::from_millis(config.probe.request_timeout_ms),
            inter_request_delay: Duration::from_millis(config.probe.inter_request_delay_ms),
            user_agent,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Endpoints in probe order, already trimmed.
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn inter_request_delay(&self) -> Duration {
        self.inter_request_delay
    }

    pub fn user_agent(&self) -> &HeaderValue {
        &self.user_agent
    }

    /// Full URL for `endpoint`. Plain concatenation: separators are not
    /// normalized, so `"https://host/"` + `"/x"` yields `"https://host//x"`.
    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}
