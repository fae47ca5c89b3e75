//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! built-in defaults
//!     → loader.rs (optional TOML file)
//!     → loader.rs (environment overrides: TARGET_API, PORT, MONITOR_*, TEMPO_*)
//!     → validation.rs (semantic checks)
//!     → MonitorConfig (validated, immutable)
//!     → ProbeTarget shared via Arc with the probe engine
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    LogFormat, LoggingConfig, MonitorConfig, ProbeConfig, ServerConfig, TargetConfig, TracingConfig,
};
pub use validation::ValidationError;
