//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Init logging/metrics → Bind listener
//!     → Spawn scheduler and HTTP server
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → shutdown.rs trigger
//!
//! Shutdown (shutdown.rs):
//!     Broadcast → scheduler stops ticking and aborts in-flight cycles
//!               → HTTP server drains and exits
//! ```
//!
//! # Design Decisions
//! - In-flight probes are bounded by the request timeout, so they never hold
//!   up shutdown for long

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
