//! Monitored request execution.
//!
//! # Responsibilities
//! - Perform one HTTP call against one endpoint under a hard timeout
//! - Open and end exactly one request span per call
//! - Turn every result, including failures, into a `ProbeOutcome`
//!
//! # Design Decisions
//! - Never returns an error: timeouts, transport and encoding failures become
//!   failed outcomes with `http_status == 0`
//! - No retries; each attempt is independent
//! - A body passed with GET is ignored, never encoded

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::Method;
use serde::Serialize;
use tokio::time::{self, Instant};
use tracing::Instrument;

use crate::observability::metrics;
use crate::observability::tracing::SpanFactory;
use crate::probe::error::ProbeError;
use crate::probe::outcome::ProbeOutcome;
use crate::probe::target::ProbeTarget;
use crate::probe::transport::{HttpTransport, ProbeRequest, TransportResponse};

/// Executes single monitored requests against the target.
pub struct MonitoredRequestExecutor<T, S> {
    target: Arc<ProbeTarget>,
    transport: T,
    spans: S,
}

impl<T: HttpTransport, S: SpanFactory> MonitoredRequestExecutor<T, S> {
    pub fn new(target: Arc<ProbeTarget>, transport: T, spans: S) -> Self {
        Self {
            target,
            transport,
            spans,
        }
    }

    pub fn target(&self) -> &ProbeTarget {
        &self.target
    }

    pub fn spans(&self) -> &S {
        &self.spans
    }

    /// GET `endpoint` with no body.
    pub async fn get(&self, endpoint: &str) -> ProbeOutcome {
        self.execute::<serde_json::Value>(endpoint, Method::GET, None).await
    }

    /// Call `endpoint` with `method`, JSON-encoding `body` for non-GET methods.
    pub async fn execute<B>(&self, endpoint: &str, method: Method, body: Option<&B>) -> ProbeOutcome
    where
        B: Serialize + ?Sized + Sync,
    {
        // Ends on drop, which also covers cancellation of this future.
        let mut span = self.spans.start_span(&format!("{} {}", method, endpoint));
        let url = self.target.url_for(endpoint);
        let start = Instant::now();

        let result = self
            .dispatch(&url, method.clone(), body)
            .instrument(span.tracing_span())
            .await;
        let elapsed = start.elapsed();
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

        let outcome = match result {
            Ok(response) => {
                let outcome = ProbeOutcome::from_response(
                    endpoint,
                    method.as_str(),
                    response.status,
                    response.body.len(),
                    elapsed,
                );
                span.record("http.status_code", response.status);
                span.record("http.method", method.as_str());
                span.record("http.url", url.as_str());
                span.record("http.response_time_ms", elapsed_ms);
                span.tracing_span().in_scope(|| {
                    tracing::info!(
                        status = response.status,
                        duration_ms = elapsed_ms,
                        endpoint = %endpoint,
                        method = %method,
                        response_size = response.body.len(),
                        "Response from {}",
                        url
                    );
                });
                outcome
            }
            Err(err) => {
                let outcome = ProbeOutcome::from_error(endpoint, method.as_str(), &err, elapsed);
                span.record("error", true);
                span.record("error.message", err.to_string());
                span.record("http.method", method.as_str());
                span.record("http.url", url.as_str());
                span.record("http.response_time_ms", elapsed_ms);
                span.tracing_span().in_scope(|| {
                    tracing::error!(
                        error = %err,
                        duration_ms = elapsed_ms,
                        endpoint = %endpoint,
                        method = %method,
                        "Error calling {}",
                        url
                    );
                });
                outcome
            }
        };

        metrics::record_probe_request(&outcome);
        span.end();
        outcome
    }

    async fn dispatch<B>(
        &self,
        url: &str,
        method: Method,
        body: Option<&B>,
    ) -> Result<TransportResponse, ProbeError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let body = encode_body(&method, body)?;
        let request = ProbeRequest {
            method,
            url: url.to_string(),
            headers: self.headers(),
            body,
        };

        tracing::info!(
            method = %request.method,
            url = %request.url,
            "Making {} request to {}",
            request.method,
            request.url
        );

        let timeout = self.target.request_timeout();
        match time::timeout(timeout, self.transport.send(request)).await {
            Ok(result) => result,
            // The send future is dropped here, aborting the request.
            Err(_) => Err(ProbeError::Timeout(
                u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            )),
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, self.target.user_agent().clone());
        headers
    }
}

/// GET never carries a payload, even when the caller supplied one.
fn encode_body<B>(method: &Method, body: Option<&B>) -> Result<Option<Vec<u8>>, ProbeError>
where
    B: Serialize + ?Sized,
{
    if *method == Method::GET {
        return Ok(None);
    }
    match body {
        Some(body) => serde_json::to_vec(body)
            .map(Some)
            .map_err(|e| ProbeError::Serialization(e.to_string())),
        None => Ok(None),
    }
}
