//! Metrics collection and exposition.
//!
//! # Metrics
//! - `federation_requests_total` (counter): client requests by endpoint, status
//! - `federation_request_duration_seconds` (histogram): end-to-end latency by endpoint
//! - `federation_instance_queries_total` (counter): instance calls by instance, kind, outcome, reason
//! - `federation_instance_query_duration_seconds` (histogram): instance call latency
//!
//! # Design Decisions
//! - Prometheus exporter runs its own listener, separate from the query API
//! - Recording without an installed exporter is a no-op

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::client::QueryKind;

pub const REQUESTS_TOTAL: &str = "federation_requests_total";
pub const REQUEST_DURATION: &str = "federation_request_duration_seconds";
pub const INSTANCE_QUERIES_TOTAL: &str = "federation_instance_queries_total";
pub const INSTANCE_QUERY_DURATION: &str = "federation_instance_query_duration_seconds";

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_counter!(REQUESTS_TOTAL, "Federated API requests by endpoint and status");
            describe_histogram!(REQUEST_DURATION, "Federated API request latency");
            describe_counter!(INSTANCE_QUERIES_TOTAL, "Instance calls by outcome");
            describe_histogram!(INSTANCE_QUERY_DURATION, "Instance call latency");
            tracing::info!(address = %addr, "Metrics exporter listening");
        }
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter");
        }
    }
}

/// Record one client-facing request.
pub fn record_request(endpoint: &'static str, status: u16, started: Instant) {
    counter!(REQUESTS_TOTAL, "endpoint" => endpoint, "status" => status.to_string()).increment(1);
    histogram!(REQUEST_DURATION, "endpoint" => endpoint).record(started.elapsed().as_secs_f64());
}

/// Record one instance call.
pub fn record_instance_query(
    instance: &str,
    kind: QueryKind,
    outcome: &'static str,
    reason: &'static str,
    elapsed: Duration,
) {
    counter!(
        INSTANCE_QUERIES_TOTAL,
        "instance" => instance.to_string(),
        "kind" => kind.as_str(),
        "outcome" => outcome,
        "reason" => reason
    )
    .increment(1);
    histogram!(
        INSTANCE_QUERY_DURATION,
        "instance" => instance.to_string(),
        "kind" => kind.as_str()
    )
    .record(elapsed.as_secs_f64());
}
