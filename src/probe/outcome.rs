//! Probe outcomes.
//!
//! Pure transform from what the transport produced into the record handed to
//! logs, spans and metrics. Nothing here performs I/O.

use std::time::Duration;

use serde::Serialize;

use crate::probe::error::ProbeError;

/// `http_status` value meaning no response was received.
pub const NO_RESPONSE: u16 = 0;

/// Result of one attempted probe request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeOutcome {
    pub endpoint: String,
    pub method: String,
    /// `0` when no response was received.
    pub http_status: u16,
    pub duration_ms: u64,
    /// A response arrived and its status is 2xx.
    pub succeeded: bool,
    /// Present iff no response was received.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Byte length of the response body, present iff a response was received.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_size: Option<usize>,
}

impl ProbeOutcome {
    /// Outcome for a completed exchange. Any status code counts as a response.
    pub fn from_response(
        endpoint: &str,
        method: &str,
        status: u16,
        body_len: usize,
        elapsed: Duration,
    ) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            method: method.to_string(),
            http_status: status,
            duration_ms: millis(elapsed),
            succeeded: is_success(status),
            error_message: None,
            response_size: Some(body_len),
        }
    }

    /// Outcome for an attempt that never produced a response.
    pub fn from_error(endpoint: &str, method: &str, error: &ProbeError, elapsed: Duration) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            method: method.to_string(),
            http_status: NO_RESPONSE,
            duration_ms: millis(elapsed),
            succeeded: false,
            error_message: Some(error.to_string()),
            response_size: None,
        }
    }

    pub fn received_response(&self) -> bool {
        self.http_status != NO_RESPONSE
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
