//! A pretend tracing backend for trying the federation server locally.
//!
//! ```text
//! cargo run --example mock_instance -- --port 3201 --name east
//! cargo run --example mock_instance -- --port 3202 --name west
//! ```
//!
//! Every instance knows trace `0af7651916cd43dd8448eb211c80319c` and adds
//! spans and tag values of its own, so the merged answer shows both.

use std::net::SocketAddr;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use clap::Parser;
use serde_json::{json, Value};

const KNOWN_TRACE: &str = "0af7651916cd43dd8448eb211c80319c";

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value_t = 3201)]
    port: u16,

    #[arg(long, default_value = "east")]
    name: String,
}

fn trace(name: &str) -> Value {
    json!({
        "batches": [{
            "resource": { "attributes": [
                { "key": "service.name", "value": { "stringValue": "checkout" } },
                { "key": "region", "value": { "stringValue": name } }
            ]},
            "scopeSpans": [{
                "scope": { "name": "mock" },
                "spans": [
                    {
                        "traceId": "CvdlGRbNQ92ESOshHIAxnA==",
                        "spanId": "AAAAAAAAAAE=",
                        "name": "GET /checkout",
                        "kind": "SPAN_KIND_SERVER",
                        "startTimeUnixNano": "1700000000000000000",
                        "endTimeUnixNano": "1700000000250000000"
                    },
                    {
                        "traceId": "CvdlGRbNQ92ESOshHIAxnA==",
                        "spanId": format!("{name}-db"),
                        "parentSpanId": "AAAAAAAAAAE=",
                        "name": format!("query {name}"),
                        "kind": "SPAN_KIND_CLIENT",
                        "startTimeUnixNano": "1700000000010000000",
                        "endTimeUnixNano": "1700000000090000000"
                    }
                ]
            }]
        }]
    })
}

async fn trace_by_id(State(name): State<String>, Path(id): Path<String>) -> impl IntoResponse {
    if id != KNOWN_TRACE {
        return (StatusCode::NOT_FOUND, Json(json!({}))).into_response();
    }
    Json(trace(&name)).into_response()
}

async fn trace_by_id_v2(State(name): State<String>, Path(id): Path<String>) -> impl IntoResponse {
    if id != KNOWN_TRACE {
        return (StatusCode::NOT_FOUND, Json(json!({}))).into_response();
    }
    Json(json!({ "trace": trace(&name), "status": "COMPLETE" })).into_response()
}

async fn search(State(name): State<String>) -> Json<Value> {
    Json(json!({
        "traces": [
            {
                "traceID": KNOWN_TRACE,
                "rootServiceName": "checkout",
                "rootTraceName": "GET /checkout",
                "startTimeUnixNano": "1700000000000000000",
                "durationMs": 250
            },
            {
                "traceID": format!("{:0>32}", name.len()),
                "rootServiceName": name,
                "rootTraceName": "cron",
                "startTimeUnixNano": "1690000000000000000",
                "durationMs": 12
            }
        ],
        "metrics": { "inspectedTraces": 2, "inspectedBytes": "4096" }
    }))
}

async fn tags() -> Json<Value> {
    Json(json!({ "tagNames": ["http.method", "region", "service.name"] }))
}

async fn tags_v2() -> Json<Value> {
    Json(json!({ "scopes": [
        { "name": "resource", "tags": ["region", "service.name"] },
        { "name": "span", "tags": ["http.method"] }
    ]}))
}

async fn tag_values(State(name): State<String>, Path(tag): Path<String>) -> Json<Value> {
    let values = match tag.as_str() {
        "region" => vec![name],
        "service.name" => vec!["checkout".to_string()],
        _ => Vec::new(),
    };
    Json(json!({ "tagValues": values }))
}

async fn tag_values_v2(State(name): State<String>, Path(tag): Path<String>) -> Json<Value> {
    let values: Vec<Value> = match tag.as_str() {
        "region" => vec![json!({ "type": "string", "value": name })],
        "service.name" => vec![json!({ "type": "string", "value": "checkout" })],
        _ => Vec::new(),
    };
    Json(json!({ "tagValues": values }))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let app = Router::new()
        .route("/api/traces/{id}", get(trace_by_id))
        .route("/api/v2/traces/{id}", get(trace_by_id_v2))
        .route("/api/search", get(search))
        .route("/api/search/tags", get(tags))
        .route("/api/v2/search/tags", get(tags_v2))
        .route("/api/search/tag/{tag}/values", get(tag_values))
        .route("/api/v2/search/tag/{tag}/values", get(tag_values_v2))
        .with_state(args.name.clone());

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    println!("Mock instance '{}' listening on http://{}", args.name, addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
