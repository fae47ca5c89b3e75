//! Scripted transport for unit tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::Method;
use tokio::time::Instant;

use crate::probe::error::ProbeError;
use crate::probe::transport::{HttpTransport, ProbeRequest, TransportResponse};

#[derive(Debug, Clone)]
pub enum Reply {
    Status(u16, String),
    Fail(&'static str),
    /// Never completes; only a timeout ends it.
    Hang,
}

impl Reply {
    pub fn status(code: u16, body: &str) -> Self {
        Reply::Status(code, body.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    pub at: Instant,
}

/// Answers by URL, `200 "ok"` for anything unscripted.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    routes: HashMap<String, Reply>,
    latency: Duration,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, url: &str, reply: Reply) -> Self {
        self.routes.insert(url.to_string(), reply);
        self
    }

    /// Delay applied before every reply.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.url).collect()
    }

    /// Requests currently awaiting a reply.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl HttpTransport for ScriptedTransport {
    fn send(
        &self,
        request: ProbeRequest,
    ) -> impl Future<Output = Result<TransportResponse, ProbeError>> + Send {
        let reply = self
            .routes
            .get(&request.url)
            .cloned()
            .unwrap_or_else(|| Reply::status(200, "ok"));
        self.calls.lock().unwrap().push(RecordedCall {
            method: request.method,
            url: request.url,
            headers: request.headers,
            body: request.body,
            at: Instant::now(),
        });

        let latency = self.latency;
        let in_flight = self.in_flight.clone();
        let max_in_flight = self.max_in_flight.clone();

        async move {
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            max_in_flight.fetch_max(now, Ordering::SeqCst);
            let _guard = InFlight(in_flight);

            tokio::time::sleep(latency).await;
            match reply {
                Reply::Status(status, body) => Ok(TransportResponse { status, body }),
                Reply::Fail(message) => Err(ProbeError::Transport(message.to_string())),
                Reply::Hang => std::future::pending().await,
            }
        }
    }
}
