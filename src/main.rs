//! Gatewayz synthetic monitor.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────┐
//!                 │                 GATEWAYZ MONITOR                  │
//!                 │                                                   │
//!                 │  ┌───────────┐   ┌────────────┐   ┌────────────┐  │
//!                 │  │ scheduler │──▶│  executor  │──▶│ transport  │──┼──▶ Target API
//!                 │  │  (ticker) │   │ (timeout,  │   │ (reqwest)  │  │
//!                 │  └───────────┘   │   span)    │   └────────────┘  │
//!                 │                  └─────┬──────┘                   │
//!                 │                        ▼                          │
//!                 │     ┌──────────┬───────────────┬──────────┐       │
//!                 │     │   logs   │     spans     │ metrics  │       │
//!                 │     └──────────┴───────────────┴────┬─────┘       │
//!                 │                                     ▼             │
//!   Scraper  ◀────┼──────────── GET /metrics, GET /health (axum)      │
//!                 └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use gatewayz_monitor::config::{load_config, ConfigError};
use gatewayz_monitor::lifecycle::{signals, Shutdown};
use gatewayz_monitor::observability::{logging, metrics, tracing::TracingSpans};
use gatewayz_monitor::probe::{
    MonitoredRequestExecutor, ProbeScheduler, ProbeTarget, ReqwestTransport,
};
use gatewayz_monitor::MonitorServer;

#[derive(Parser)]
#[command(name = "gatewayz-monitor", version)]
#[command(about = "Synthetic HTTP monitor for the Gatewayz API", long_about = None)]
struct Cli {
    /// TOML configuration file. Environment variables override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run a single probe cycle immediately, print outcomes as JSON lines and exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let _telemetry = logging::init_logging(&config.logging, &config.tracing)?;

    tracing::info!("gatewayz-monitor v{} starting", env!("CARGO_PKG_VERSION"));

    let target = Arc::new(ProbeTarget::from_config(&config).map_err(ConfigError::Validation)?);
    tracing::info!(
        target_api = %target.base_url(),
        interval_ms = config.probe.interval_ms,
        request_timeout_ms = config.probe.request_timeout_ms,
        endpoints = ?target.endpoints(),
        "Configuration loaded"
    );

    let transport = ReqwestTransport::new()?;
    let executor = Arc::new(MonitoredRequestExecutor::new(
        target.clone(),
        transport,
        TracingSpans,
    ));
    let scheduler = ProbeScheduler::new(target.clone(), executor);

    if cli.once {
        for outcome in scheduler.run_cycle().await {
            println!("{}", serde_json::to_string(&outcome)?);
        }
        return Ok(());
    }

    let metrics_handle = metrics::init_metrics()?;

    let listener = TcpListener::bind(config.server.bind_address()).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        target_api = %target.base_url(),
        "Gatewayz monitoring service is running"
    );

    let shutdown = Shutdown::new();
    let server = MonitorServer::new(target.base_url(), metrics_handle);
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));
    let scheduler_task = tokio::spawn(scheduler.run(shutdown.subscribe()));

    signals::wait_for_signal().await;
    shutdown.trigger();

    let (server_result, scheduler_result) = tokio::join!(server_task, scheduler_task);
    server_result??;
    scheduler_result?;

    tracing::info!("Shutdown complete");
    Ok(())
}
