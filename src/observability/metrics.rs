//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define probe and service metrics
//! - Install the Prometheus recorder rendered by `GET /metrics`
//! - Record the monitor's own HTTP traffic by method, route and status
//!
//! # Metrics
//! - `http_requests_total` (counter): requests served, by method, route, status
//! - `http_request_duration_seconds` (histogram): serving latency
//! - `probe_requests_total` (counter): probes by endpoint, method, status, outcome
//! - `probe_request_duration_seconds` (histogram): probe latency
//! - `probe_cycles_total` (counter): completed sweeps
//! - `probe_cycle_duration_seconds` (histogram): sweep duration
//! - `probe_cycle_failures` (gauge): failed probes in the last finished sweep
//!
//! # Design Decisions
//! - Latency buckets are 0.1, 0.5, 1 and 1.5 seconds
//! - Probe status `0` means no response was received

use std::time::{Duration, Instant};

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

use crate::probe::ProbeOutcome;

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION: &str = "http_request_duration_seconds";
pub const PROBE_REQUESTS_TOTAL: &str = "probe_requests_total";
pub const PROBE_REQUEST_DURATION: &str = "probe_request_duration_seconds";
pub const PROBE_CYCLES_TOTAL: &str = "probe_cycles_total";
pub const PROBE_CYCLE_DURATION: &str = "probe_cycle_duration_seconds";
pub const PROBE_CYCLE_FAILURES: &str = "probe_cycle_failures";

/// Histogram buckets, in seconds, for request latencies.
pub const LATENCY_BUCKETS: &[f64] = &[0.1, 0.5, 1.0, 1.5];

/// Prometheus builder with the latency buckets applied.
pub fn prometheus_builder() -> Result<PrometheusBuilder, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(HTTP_REQUEST_DURATION.to_string()), LATENCY_BUCKETS)?
        .set_buckets_for_metric(Matcher::Full(PROBE_REQUEST_DURATION.to_string()), LATENCY_BUCKETS)
}

/// Install the global recorder and return the handle used to render it.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = prometheus_builder()?.install_recorder()?;
    tracing::info!("Prometheus recorder installed");
    Ok(handle)
}

/// Record one probe outcome.
pub fn record_probe_request(outcome: &ProbeOutcome) {
    let result = if outcome.http_status == 0 {
        "error"
    } else if outcome.succeeded {
        "success"
    } else {
        "failure"
    };

    metrics::counter!(
        PROBE_REQUESTS_TOTAL,
        "endpoint" => outcome.endpoint.clone(),
        "method" => outcome.method.clone(),
        "status" => outcome.http_status.to_string(),
        "outcome" => result
    )
    .increment(1);

    metrics::histogram!(
        PROBE_REQUEST_DURATION,
        "endpoint" => outcome.endpoint.clone(),
        "method" => outcome.method.clone()
    )
    .record(Duration::from_millis(outcome.duration_ms).as_secs_f64());
}

/// Record one finished probe cycle.
pub fn record_probe_cycle(elapsed: Duration, failures: usize) {
    metrics::counter!(PROBE_CYCLES_TOTAL).increment(1);
    metrics::histogram!(PROBE_CYCLE_DURATION).record(elapsed.as_secs_f64());
    metrics::gauge!(PROBE_CYCLE_FAILURES).set(failures as f64);
}

/// Record one request served by the monitor's own HTTP surface.
pub fn record_http_request(method: &str, route: &str, status: u16, start: Instant) {
    metrics::counter!(
        HTTP_REQUESTS_TOTAL,
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!(
        HTTP_REQUEST_DURATION,
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Axum middleware recording `http_requests_total` and
/// `http_request_duration_seconds`. Installed as a route layer so the
/// matched route template is available.
pub async fn track_http_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let response = next.run(request).await;
    record_http_request(&method, &route, response.status().as_u16(), start);
    response
}
