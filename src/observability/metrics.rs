//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_requests_total` (counter): completed requests by method, status
//! - `gate_request_duration_seconds` (histogram): latency distribution
//! - `gate_rate_limited_total` (counter): admissions rejected
//! - `gate_tracked_clients` (gauge): client keys currently in the registry
//!
//! # Design Decisions
//! - Low-overhead metric updates; no locks on the hot path
//! - Recording is a no-op until an exporter is installed

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter, listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    let builder = PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => tracing::info!(address = %addr, "metrics exporter listening"),
        Err(err) => tracing::error!(error = %err, "failed to install metrics exporter"),
    }
}

/// Record one completed request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "gate_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gate_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record one rejected admission.
pub fn record_rate_limited() {
    counter!("gate_rate_limited_total").increment(1);
}

/// Record the current tracked-client count.
pub fn record_tracked_clients(count: usize) {
    gauge!("gate_tracked_clients").set(count as f64);
}
