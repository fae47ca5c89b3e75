//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! The probe engine produces:
//!     → logging.rs (structured log events per probe and per cycle)
//!     → metrics.rs (counters, histograms)
//!     → tracing.rs (cycle and request spans)
//!
//! Consumers:
//!     → Log aggregation (stderr, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape of GET /metrics)
//!     → Distributed tracing (OTLP/HTTP to Tempo when TEMPO_URL is set)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Span factory is injected, so tests observe spans without a collector
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
pub mod tracing;
