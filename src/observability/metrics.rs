//! Metrics collection and exposition.
//!
//! # Metrics
//! - `route_tree_requests_total` (counter): dispatched requests by outcome
//! - `route_tree_request_duration_seconds` (histogram): dispatch latency
//! - `route_tree_mutations_total` (counter): directory writes by operation, result
//!
//! # Design Decisions
//! - Outcome labels are a small fixed set (`ok`, `not_found`, ...)
//! - The exporter is only installed by the server binary

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint. Needs a running Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(outcome: &'static str, start: Instant) {
    ::metrics::counter!("route_tree_requests_total", "outcome" => outcome).increment(1);
    ::metrics::histogram!("route_tree_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_mutation(operation: &'static str, ok: bool) {
    let result = if ok { "ok" } else { "error" };
    ::metrics::counter!(
        "route_tree_mutations_total",
        "operation" => operation,
        "result" => result
    )
    .increment(1);
}
