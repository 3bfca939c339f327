//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, status, route
//! - `proxy_request_duration_seconds` (histogram): latency by route
//! - `proxy_origin_fetch_total` (counter): origin fetches by outcome
//! - `proxy_origin_fetch_duration_seconds` (histogram): fetch latency
//! - `proxy_origin_inflight_permits` (gauge): free fetch slots
//!
//! # Design Decisions
//! - The `metrics` facade keeps call sites decoupled from the exporter
//! - Exporter failure is logged, never fatal: the proxy serves traffic
//!   with or without a scrape endpoint

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished request.
pub fn record_request(method: &str, status: u16, route: &'static str, start: Instant) {
    metrics::counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "route" => route,
    )
    .increment(1);
    metrics::histogram!("proxy_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

/// Record one origin fetch attempt.
pub fn record_origin_fetch(outcome: &'static str, start: Instant) {
    metrics::counter!("proxy_origin_fetch_total", "outcome" => outcome).increment(1);
    metrics::histogram!("proxy_origin_fetch_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}

/// Track free fetch permits.
pub fn set_inflight_fetches(available: usize) {
    metrics::gauge!("proxy_origin_inflight_permits").set(available as f64);
}
