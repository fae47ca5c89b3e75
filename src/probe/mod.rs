//! Instrumented probe engine.
//!
//! # Data Flow
//! ```text
//! scheduler.rs (fixed-period ticker)
//!     → one cycle per tick, cycle span opened
//!     → executor.rs once per endpoint, serially, with a pause after each
//!         → transport.rs (HTTP call under the request timeout)
//!         → outcome.rs (ProbeOutcome)
//!         → log line, request span attributes, probe metrics
//!     → cycle span closed, cycle summary logged
//! ```
//!
//! # Design Decisions
//! - Per-request failures never escape the executor; they become outcomes
//! - Transport and span factory are injected for isolated testing
//! - Outcomes are cycle-local and discarded after being reported

pub mod error;
pub mod executor;
pub mod outcome;
pub mod scheduler;
pub mod target;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use error::ProbeError;
pub use executor::MonitoredRequestExecutor;
pub use outcome::ProbeOutcome;
pub use scheduler::ProbeScheduler;
pub use target::ProbeTarget;
pub use transport::{HttpTransport, ProbeRequest, ReqwestTransport, TransportResponse};
