//! Metrics collection and exposition.
//!
//! # Metrics
//! - `prefetch_requests_total` (counter): prefetch calls by outcome
//! - `prefetch_loader_invocations_total` (counter): loader calls by result
//! - `prefetch_lazy_failures_total` (counter): failed lazy accessors
//! - `prefetch_resolved_paths` (gauge): size of the resolved-path set
//! - `prefetch_chunk_bytes_total` (counter): bytes fetched for chunks
//! - `prefetch_load_duration_seconds` (histogram): loader invocation latency

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder with an HTTP scrape endpoint.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// `outcome` is one of `skipped`, `cached`, `unresolved`, `completed`.
pub fn record_prefetch(outcome: &'static str) {
    metrics::counter!("prefetch_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_loader_invocation(success: bool) {
    let result = if success { "success" } else { "failure" };
    metrics::counter!("prefetch_loader_invocations_total", "result" => result).increment(1);
}

pub fn record_lazy_failure() {
    metrics::counter!("prefetch_lazy_failures_total").increment(1);
}

pub fn record_resolved_paths(count: usize) {
    metrics::gauge!("prefetch_resolved_paths").set(count as f64);
}

pub fn record_chunk_bytes(bytes: usize) {
    metrics::counter!("prefetch_chunk_bytes_total").increment(bytes as u64);
}

pub fn record_load_duration(elapsed: Duration) {
    metrics::histogram!("prefetch_load_duration_seconds").record(elapsed.as_secs_f64());
}
