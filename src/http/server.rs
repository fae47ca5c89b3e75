//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the health and metrics handlers
//! - Wire up middleware (tracing, request metrics)
//! - Serve until the shutdown signal arrives
//!
//! # Design Decisions
//! - `/health` reports liveness of this process only; it does not reflect
//!   probe results

use std::sync::Arc;

use axum::{
    extract::State,
    middleware,
    routing::get,
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::observability::metrics::track_http_metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub target_api: Arc<str>,
    pub metrics: PrometheusHandle,
}

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub monitoring: String,
}

/// HTTP server exposing health and metrics.
pub struct MonitorServer {
    router: Router,
}

impl MonitorServer {
    pub fn new(target_api: &str, metrics: PrometheusHandle) -> Self {
        let state = AppState {
            target_api: Arc::from(target_api),
            metrics,
        };
        Self {
            router: build_router(state),
        }
    }

    /// The fully layered router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server received shutdown signal");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(render_metrics))
        .route_layer(middleware::from_fn(track_http_metrics))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy",
        monitoring: state.target_api.to_string(),
    })
}

async fn render_metrics(State(state): State<AppState>) -> String {
    state.metrics.render()
}
