//! Trace span support for probe cycles and requests.
//!
//! # Responsibilities
//! - Create one span per probe cycle and one per probe request
//! - Attach `http.*` and `error*` attributes to request spans
//! - Guarantee every started span is ended exactly once
//!
//! # Design Decisions
//! - Spans come from an injected `SpanFactory`, never from global state
//! - `SpanGuard` ends its span on drop, so early returns and task aborts
//!   cannot leak a span
//! - `TracingSpans` maps onto the `tracing` span tree; the OTLP layer set up
//!   in `logging.rs` ships them to a collector, using `otel.name` as the
//!   span name

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::field::Empty;

/// Attribute value attached to a span.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::Str(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::Str(v)
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        AttributeValue::Bool(v)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Int(v)
    }
}

impl From<u16> for AttributeValue {
    fn from(v: u16) -> Self {
        AttributeValue::Int(i64::from(v))
    }
}

impl From<u64> for AttributeValue {
    fn from(v: u64) -> Self {
        AttributeValue::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<usize> for AttributeValue {
    fn from(v: usize) -> Self {
        AttributeValue::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

/// An open span handle.
pub trait ProbeSpan: Send + 'static {
    /// Attach or overwrite an attribute.
    fn record(&mut self, key: &'static str, value: AttributeValue);

    /// Close the span. Called exactly once, by `SpanGuard`.
    fn end(&mut self);

    /// The `tracing` span that log events should be emitted under.
    fn tracing_span(&self) -> tracing::Span {
        tracing::Span::none()
    }
}

/// Produces spans for the probe engine.
pub trait SpanFactory: Send + Sync + 'static {
    type Span: ProbeSpan;

    /// Open a raw span. Prefer `start_span`, which scopes its lifetime.
    fn start(&self, name: &str) -> Self::Span;

    /// Open a span wrapped in a guard that ends it on drop.
    fn start_span(&self, name: &str) -> SpanGuard<Self::Span> {
        SpanGuard::new(self.start(name))
    }
}

/// Ends the wrapped span when dropped.
#[derive(Debug)]
pub struct SpanGuard<S: ProbeSpan> {
    span: Option<S>,
}

impl<S: ProbeSpan> SpanGuard<S> {
    pub fn new(span: S) -> Self {
        Self { span: Some(span) }
    }

    pub fn record(&mut self, key: &'static str, value: impl Into<AttributeValue>) {
        if let Some(span) = self.span.as_mut() {
            span.record(key, value.into());
        }
    }

    pub fn tracing_span(&self) -> tracing::Span {
        self.span
            .as_ref()
            .map(ProbeSpan::tracing_span)
            .unwrap_or_else(tracing::Span::none)
    }

    /// End the span now rather than at scope exit.
    pub fn end(self) {}
}

impl<S: ProbeSpan> Drop for SpanGuard<S> {
    fn drop(&mut self) {
        if let Some(mut span) = self.span.take() {
            span.end();
        }
    }
}

/// Span factory backed by the `tracing` span tree.
///
/// Spans are created under whatever span is current, so request spans opened
/// inside an instrumented cycle become its children.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSpans;

/// A `tracing` span with the probe attribute fields pre-declared.
#[derive(Debug)]
pub struct TracingSpan {
    span: Option<tracing::Span>,
}

impl SpanFactory for TracingSpans {
    type Span = TracingSpan;

    fn start(&self, name: &str) -> TracingSpan {
        let span = tracing::info_span!(
            "probe",
            otel.name = %name,
            http.status_code = Empty,
            http.method = Empty,
            http.url = Empty,
            http.response_time_ms = Empty,
            error = Empty,
            error.message = Empty,
            probe.cycle_id = Empty,
            probe.endpoint_count = Empty,
            probe.failures = Empty,
            probe.cycle_duration_ms = Empty
        );
        TracingSpan { span: Some(span) }
    }
}

impl ProbeSpan for TracingSpan {
    fn record(&mut self, key: &'static str, value: AttributeValue) {
        let Some(span) = self.span.as_ref() else {
            return;
        };
        match value {
            AttributeValue::Str(s) => {
                span.record(key, s.as_str());
            }
            AttributeValue::Int(i) => {
                span.record(key, i);
            }
            AttributeValue::Bool(b) => {
                span.record(key, b);
            }
        }
    }

    fn end(&mut self) {
        // Dropping the last handle closes the span.
        self.span.take();
    }

    fn tracing_span(&self) -> tracing::Span {
        self.span.clone().unwrap_or_else(tracing::Span::none)
    }
}

/// A span captured by `RecordingSpans`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanRecord {
    pub name: String,
    pub attributes: Vec<(&'static str, AttributeValue)>,
    pub end_count: usize,
}

impl SpanRecord {
    /// Latest value recorded under `key`.
    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    pub fn is_ended(&self) -> bool {
        self.end_count > 0
    }
}

/// In-memory span factory. Keeps every span it opened, with its attributes
/// and how many times it was ended.
#[derive(Debug, Clone, Default)]
pub struct RecordingSpans {
    records: Arc<Mutex<Vec<SpanRecord>>>,
}

impl RecordingSpans {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all spans opened so far, in start order.
    pub fn spans(&self) -> Vec<SpanRecord> {
        lock(&self.records).clone()
    }

    /// Spans opened with exactly `name`.
    pub fn named(&self, name: &str) -> Vec<SpanRecord> {
        self.spans().into_iter().filter(|s| s.name == name).collect()
    }
}

/// Handle returned by `RecordingSpans`.
#[derive(Debug)]
pub struct RecordedSpan {
    index: usize,
    records: Arc<Mutex<Vec<SpanRecord>>>,
}

impl SpanFactory for RecordingSpans {
    type Span = RecordedSpan;

    fn start(&self, name: &str) -> RecordedSpan {
        let mut records = lock(&self.records);
        records.push(SpanRecord {
            name: name.to_string(),
            attributes: Vec::new(),
            end_count: 0,
        });
        RecordedSpan {
            index: records.len() - 1,
            records: self.records.clone(),
        }
    }
}

impl ProbeSpan for RecordedSpan {
    fn record(&mut self, key: &'static str, value: AttributeValue) {
        if let Some(record) = lock(&self.records).get_mut(self.index) {
            record.attributes.push((key, value));
        }
    }

    fn end(&mut self) {
        if let Some(record) = lock(&self.records).get_mut(self.index) {
            record.end_count += 1;
        }
    }
}

fn lock(records: &Mutex<Vec<SpanRecord>>) -> MutexGuard<'_, Vec<SpanRecord>> {
    records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
