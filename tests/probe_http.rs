//! Probe engine tests against a real socket.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use gatewayz_monitor::config::MonitorConfig;
use gatewayz_monitor::observability::tracing::{AttributeValue, RecordingSpans};
use gatewayz_monitor::probe::scheduler::CYCLE_SPAN_NAME;
use gatewayz_monitor::probe::{
    MonitoredRequestExecutor, ProbeScheduler, ProbeTarget, ReqwestTransport,
};
use reqwest::Method;
use serde_json::json;

mod common;

type Executor = MonitoredRequestExecutor<ReqwestTransport, RecordingSpans>;

fn target(addr: SocketAddr, endpoints: &[&str], timeout_ms: u64) -> Arc<ProbeTarget> {
    let mut config = MonitorConfig::default();
    config.target.base_url = format!("http://{}", addr);
    config.probe.endpoints = endpoints.iter().map(|e| e.to_string()).collect();
    config.probe.request_timeout_ms = timeout_ms;
    config.probe.inter_request_delay_ms = 50;
    Arc::new(ProbeTarget::from_config(&config).unwrap())
}

fn executor(target: Arc<ProbeTarget>) -> (Arc<Executor>, RecordingSpans) {
    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();
    let spans = RecordingSpans::new();
    let executor = MonitoredRequestExecutor::new(
        target,
        ReqwestTransport::from_client(client),
        spans.clone(),
    );
    (Arc::new(executor), spans)
}

#[tokio::test]
async fn test_successful_probe() {
    let (addr, mut requests) =
        common::start_programmable_backend(|_| async { (200, r#"{"status":"ok"}"#.to_string()) })
            .await;
    let (executor, spans) = executor(target(addr, &["/health"], 2_000));

    let outcome = executor.get("/health").await;

    assert!(outcome.succeeded);
    assert_eq!(outcome.http_status, 200);
    assert_eq!(outcome.response_size, Some(15));
    assert_eq!(outcome.error_message, None);

    let request = requests.recv().await.unwrap();
    assert_eq!(request.method, "GET");
    assert_eq!(request.path, "/health");
    assert_eq!(request.header("user-agent"), Some("Gatewayz-Monitor/1.0"));
    assert_eq!(request.header("content-type"), Some("application/json"));

    let span = &spans.spans()[0];
    assert_eq!(span.name, "GET /health");
    assert_eq!(span.end_count, 1);
    assert_eq!(span.attribute("http.status_code"), Some(&AttributeValue::Int(200)));
}

#[tokio::test]
async fn test_server_error_is_recorded_faithfully() {
    let (addr, _requests) =
        common::start_programmable_backend(|_| async { (503, "Service Unavailable".to_string()) })
            .await;
    let (executor, spans) = executor(target(addr, &["/status"], 2_000));

    let outcome = executor.get("/status").await;

    assert!(!outcome.succeeded);
    assert_eq!(outcome.http_status, 503);
    assert_eq!(outcome.error_message, None);
    assert_eq!(outcome.response_size, Some(19));
    assert_eq!(spans.spans()[0].attribute("error"), None);
}

#[tokio::test]
async fn test_timeout_returns_promptly() {
    let (addr, _requests) = common::start_programmable_backend(|_| async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        (200, "late".to_string())
    })
    .await;
    let (executor, spans) = executor(target(addr, &["/slow"], 200));
    let start = Instant::now();

    let outcome = executor.get("/slow").await;

    assert!(start.elapsed() < Duration::from_secs(2));
    assert_eq!(outcome.http_status, 0);
    assert!(!outcome.succeeded);
    assert_eq!(
        outcome.error_message.as_deref(),
        Some("request timed out after 200 ms")
    );
    assert!(outcome.duration_ms >= 200);
    assert_eq!(spans.spans()[0].end_count, 1);
    assert_eq!(
        spans.spans()[0].attribute("error"),
        Some(&AttributeValue::Bool(true))
    );
}

#[tokio::test]
async fn test_connection_refused() {
    let addr = common::closed_port().await;
    let (executor, spans) = executor(target(addr, &["/"], 2_000));

    let outcome = executor.get("/").await;

    assert_eq!(outcome.http_status, 0);
    assert!(!outcome.succeeded);
    assert!(!outcome.error_message.as_deref().unwrap_or_default().is_empty());
    assert_eq!(outcome.response_size, None);
    assert_eq!(spans.spans()[0].end_count, 1);
}

#[tokio::test]
async fn test_post_sends_json_body_and_get_does_not() {
    let (addr, mut requests) =
        common::start_programmable_backend(|_| async { (200, "{}".to_string()) }).await;
    let (executor, _spans) = executor(target(addr, &["/echo"], 2_000));
    let body = json!({"x": 1});

    let posted = executor.execute("/echo", Method::POST, Some(&body)).await;
    let fetched = executor.execute("/echo", Method::GET, Some(&body)).await;
    assert!(posted.succeeded);
    assert!(fetched.succeeded);

    let post = requests.recv().await.unwrap();
    assert_eq!(post.method, "POST");
    assert_eq!(post.body, br#"{"x":1}"#.to_vec());
    assert_eq!(post.header("content-length"), Some("7"));

    let get = requests.recv().await.unwrap();
    assert_eq!(get.method, "GET");
    assert!(get.body.is_empty());
    assert_eq!(get.header("content-length").unwrap_or("0"), "0");
}

#[tokio::test]
async fn test_cycle_with_healthy_and_hanging_endpoint() {
    let (addr, _requests) = common::start_programmable_backend(|request| async move {
        if request.path == "/b" {
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
        (200, "ok".to_string())
    })
    .await;
    let target = target(addr, &["/a", "/b"], 300);
    let (executor, spans) = executor(target.clone());
    let scheduler = ProbeScheduler::new(target, executor);

    let outcomes = scheduler.run_cycle().await;

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].endpoint, "/a");
    assert!(outcomes[0].succeeded);
    assert_eq!(outcomes[0].http_status, 200);
    assert_eq!(outcomes[1].endpoint, "/b");
    assert!(!outcomes[1].succeeded);
    assert_eq!(outcomes[1].http_status, 0);
    assert!(outcomes[1].error_message.is_some());

    let recorded = spans.spans();
    assert_eq!(recorded.len(), 3);
    assert!(recorded.iter().all(|s| s.end_count == 1));
    assert_eq!(spans.named(CYCLE_SPAN_NAME).len(), 1);
}
