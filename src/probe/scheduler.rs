//! Periodic probe scheduling.
//!
//! # Responsibilities
//! - Fire a probe cycle every `interval`, first one interval after start
//! - Probe every endpoint of a cycle serially, in declared order
//! - Wrap each cycle in a cycle span and summarize it in logs and metrics
//!
//! # Design Decisions
//! - The ticker does not wait for the previous cycle: a cycle that outlasts
//!   the interval overlaps the next one. Cycles share only the read-only
//!   target, so overlapping is safe.
//! - A failing endpoint never short-circuits the cycle
//! - The pause after the last endpoint runs before the cycle span ends
//! - Shutdown aborts in-flight cycles; span guards still end their spans

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio::time::{self, Instant};
use tracing::Instrument;
use uuid::Uuid;

use crate::observability::metrics;
use crate::observability::tracing::SpanFactory;
use crate::probe::executor::MonitoredRequestExecutor;
use crate::probe::outcome::ProbeOutcome;
use crate::probe::target::ProbeTarget;
use crate::probe::transport::HttpTransport;

/// Name of the span bracketing one sweep over all endpoints.
pub const CYCLE_SPAN_NAME: &str = "periodic-health-check";

/// Drives probe cycles against a target.
pub struct ProbeScheduler<T, S> {
    target: Arc<ProbeTarget>,
    executor: Arc<MonitoredRequestExecutor<T, S>>,
}

impl<T, S> Clone for ProbeScheduler<T, S> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            executor: self.executor.clone(),
        }
    }
}

impl<T: HttpTransport, S: SpanFactory> ProbeScheduler<T, S> {
    pub fn new(target: Arc<ProbeTarget>, executor: Arc<MonitoredRequestExecutor<T, S>>) -> Self {
        Self { target, executor }
    }

    /// Tick until the shutdown signal arrives.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let period = self.target.interval();
        tracing::info!(
            target_api = %self.target.base_url(),
            interval_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
            endpoints = ?self.target.endpoints(),
            "Starting periodic monitoring"
        );

        let mut ticker = time::interval_at(Instant::now() + period, period);
        let mut cycles = JoinSet::new();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if !cycles.is_empty() {
                        tracing::warn!(
                            in_flight = cycles.len(),
                            "Previous probe cycle still running, starting another"
                        );
                    }
                    let scheduler = self.clone();
                    cycles.spawn(async move {
                        scheduler.run_cycle().await;
                    });
                }
                Some(joined) = cycles.join_next(), if !cycles.is_empty() => {
                    if let Err(e) = joined {
                        tracing::error!(error = %e, "Probe cycle task failed");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Probe scheduler received shutdown signal, exiting loop");
                    break;
                }
            }
        }

        if !cycles.is_empty() {
            tracing::info!(in_flight = cycles.len(), "Aborting in-flight probe cycles");
        }
        cycles.shutdown().await;
    }

    /// Run one sweep over every endpoint and return the cycle's outcomes.
    pub async fn run_cycle(&self) -> Vec<ProbeOutcome> {
        let mut span = self.executor.spans().start_span(CYCLE_SPAN_NAME);
        let cycle_id = Uuid::new_v4();
        let endpoint_count = self.target.endpoints().len();
        span.record("probe.cycle_id", cycle_id.to_string());
        span.record("probe.endpoint_count", endpoint_count);

        let start = Instant::now();
        let outcomes = self.sweep().instrument(span.tracing_span()).await;
        let elapsed = start.elapsed();
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

        let failures = outcomes.iter().filter(|o| !o.succeeded).count();
        span.record("probe.failures", failures);
        span.record("probe.cycle_duration_ms", elapsed_ms);
        span.tracing_span().in_scope(|| {
            tracing::info!(
                cycle_id = %cycle_id,
                endpoints = endpoint_count,
                failures,
                duration_ms = elapsed_ms,
                "Probe cycle complete"
            );
        });
        metrics::record_probe_cycle(elapsed, failures);

        span.end();
        outcomes
    }

    async fn sweep(&self) -> Vec<ProbeOutcome> {
        let delay = self.target.inter_request_delay();
        let mut outcomes = Vec::with_capacity(self.target.endpoints().len());

        for endpoint in self.target.endpoints() {
            outcomes.push(self.executor.get(endpoint).await);
            time::sleep(delay).await;
        }

        outcomes
    }
}
