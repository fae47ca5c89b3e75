//! Probe error definitions.

use thiserror::Error;

/// Reasons a probe attempt produced no response.
///
/// These never leave the executor as errors; they become failed outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The request exceeded its deadline and was aborted.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// DNS, connect, TLS or read failure.
    #[error("{0}")]
    Transport(String),

    /// The request body could not be JSON-encoded.
    #[error("failed to encode request body: {0}")]
    Serialization(String),
}

impl ProbeError {
    /// Build a transport error from an error and its full source chain.
    pub fn transport(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            let cause_msg = cause.to_string();
            if !message.contains(&cause_msg) {
                message.push_str(": ");
                message.push_str(&cause_msg);
            }
            source = cause.source();
        }
        ProbeError::Transport(message)
    }
}
