//! Outbound HTTP transport.
//!
//! # Responsibilities
//! - Send one fully-built probe request
//! - Read the whole response body as text
//!
//! # Design Decisions
//! - Timeouts are enforced by the executor, not the transport
//! - Dropping the `send` future aborts the request and releases its socket

use std::future::Future;

use reqwest::header::HeaderMap;
use reqwest::Method;

use crate::probe::error::ProbeError;

/// A request ready for the wire.
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    /// JSON-encoded payload. Always `None` for GET.
    pub body: Option<Vec<u8>>,
}

/// A response with its body fully read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Sends probe requests.
pub trait HttpTransport: Send + Sync + 'static {
    fn send(
        &self,
        request: ProbeRequest,
    ) -> impl Future<Output = Result<TransportResponse, ProbeError>> + Send;
}

/// `reqwest`-backed transport used in production.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(
        &self,
        request: ProbeRequest,
    ) -> impl Future<Output = Result<TransportResponse, ProbeError>> + Send {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        async move {
            let response = builder.send().await.map_err(|e| ProbeError::transport(&e))?;
            let status = response.status().as_u16();
            let body = response.text().await.map_err(|e| ProbeError::transport(&e))?;
            Ok(TransportResponse { status, body })
        }
    }
}
