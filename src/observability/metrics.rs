//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): responses by route, status
//! - `relay_upstream_errors_total` (counter): failed fetches by route
//! - `remux_sessions_active` (gauge): transcoders not yet reaped
//! - `remux_processes_spawned_total` (counter)
//! - `remux_process_exits_total` (counter): by outcome (success, failure, killed)
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(route: &'static str, status: u16) {
    metrics::counter!("relay_requests_total", "route" => route, "status" => status.to_string())
        .increment(1);
}

pub fn record_upstream_error(route: &'static str) {
    metrics::counter!("relay_upstream_errors_total", "route" => route).increment(1);
}

pub fn set_active_sessions(count: u64) {
    metrics::gauge!("remux_sessions_active").set(count as f64);
}

pub fn record_transcoder_spawned() {
    metrics::counter!("remux_processes_spawned_total").increment(1);
}

pub fn record_transcoder_exit(outcome: &'static str) {
    metrics::counter!("remux_process_exits_total", "outcome" => outcome).increment(1);
}
