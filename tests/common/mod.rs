//! Shared utilities for integration testing: mock instances and a running
//! federation server on ephemeral ports.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::IntoResponse;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use trace_federation::config::{FederationConfig, InstanceConfig, QueryConfig};
use trace_federation::{HttpServer, Shutdown};

/// One request as seen by a mock instance.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path_and_query: String,
    pub headers: HeaderMap,
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    body: Value,
    delay: Duration,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// A backend instance answering every GET with the same status and body.
pub struct MockInstance {
    pub addr: SocketAddr,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockInstance {
    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn config(&self, name: &str) -> InstanceConfig {
        InstanceConfig::new(name, self.endpoint())
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.recorded.lock().unwrap().clone()
    }
}

async fn answer(State(state): State<MockState>, request: Request<Body>) -> impl IntoResponse {
    state.recorded.lock().unwrap().push(RecordedRequest {
        path_and_query: request
            .uri()
            .path_and_query()
            .map(|pq| pq.to_string())
            .unwrap_or_default(),
        headers: request.headers().clone(),
    });
    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }
    (state.status, Json(state.body))
}

/// Start a mock instance answering `status` with `body`.
pub async fn start_mock_instance(status: u16, body: Value) -> MockInstance {
    start_slow_mock_instance(status, body, Duration::ZERO).await
}

/// Start a mock instance that waits `delay` before answering.
pub async fn start_slow_mock_instance(status: u16, body: Value, delay: Duration) -> MockInstance {
    let recorded = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        status: StatusCode::from_u16(status).unwrap(),
        body,
        delay,
        recorded: Arc::clone(&recorded),
    };
    let app = Router::new().fallback(answer).with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockInstance { addr, recorded }
}

/// Start a mock instance that returns a body instances never send.
pub async fn start_garbage_instance() -> MockInstance {
    start_mock_instance(200, json!("not an api response")).await
}

/// Endpoint of a port nothing listens on.
pub async fn closed_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Configuration with a short query timeout.
pub fn federation_config(instances: Vec<InstanceConfig>) -> FederationConfig {
    FederationConfig {
        instances,
        query: QueryConfig {
            timeout_secs: 5,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// A federation server running on an ephemeral port. Stops when dropped.
pub struct Federation {
    pub base: String,
    shutdown: Shutdown,
}

impl Federation {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

impl Drop for Federation {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_federation(config: FederationConfig) -> Federation {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    tokio::spawn(server.run(listener, shutdown.subscribe()));

    Federation {
        base: format!("http://{}", addr),
        shutdown,
    }
}

/// Instance body for a trace holding one span per ID.
pub fn trace_body(service: &str, span_ids: &[&str]) -> Value {
    let spans: Vec<Value> = span_ids
        .iter()
        .map(|id| {
            json!({
                "traceId": "CvdlGRbNQ92ESOshHIAxnA==",
                "spanId": id,
                "name": format!("op-{id}"),
                "kind": "SPAN_KIND_SERVER",
                "startTimeUnixNano": "1700000000000000000",
                "endTimeUnixNano": "1700000000100000000"
            })
        })
        .collect();
    json!({
        "batches": [{
            "resource": { "attributes": [
                { "key": "service.name", "value": { "stringValue": service } }
            ]},
            "scopeSpans": [{ "scope": { "name": "test" }, "spans": spans }]
        }]
    })
}

pub fn search_body(traces: &[(&str, u64)]) -> Value {
    let traces: Vec<Value> = traces
        .iter()
        .map(|(id, start)| {
            json!({
                "traceID": id,
                "rootServiceName": "api",
                "rootTraceName": "GET /",
                "startTimeUnixNano": start.to_string(),
                "durationMs": 10
            })
        })
        .collect();
    let inspected = traces.len();
    json!({ "traces": traces, "metrics": { "inspectedTraces": inspected, "inspectedBytes": "100" } })
}
