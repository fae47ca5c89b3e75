//! The monitor's own HTTP surface.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router, TraceLayer)
//!     → metrics middleware (per-route counters and latency)
//!     → GET /health  → static liveness JSON
//!     → GET /metrics → Prometheus text from the recorder handle
//! ```

pub mod server;

pub use server::{AppState, MonitorServer};
