//! Gatewayz synthetic monitor library.
//!
//! Periodically probes a target API and reports each probe as a structured
//! log line, a trace span and Prometheus metrics.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod probe;

pub use config::MonitorConfig;
pub use http::MonitorServer;
pub use lifecycle::Shutdown;
pub use probe::{MonitoredRequestExecutor, ProbeOutcome, ProbeScheduler, ProbeTarget};
