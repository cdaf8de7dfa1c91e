//! Metrics collection and exposition.
//!
//! # Metrics
//! - `nf_requests_total` (counter): inbound requests by route, status
//! - `nf_outbound_requests_total` (counter): peer calls by status (0 = transport failure)
//! - `nf_correlation_wait_seconds` (histogram): trigger wait for the follow-up
//! - `nf_follow_ups_total` (counter): NF2 follow-ups by outcome

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(route: &'static str, status: u16) {
    ::metrics::counter!("nf_requests_total", "route" => route, "status" => status.to_string())
        .increment(1);
}

pub fn record_outbound(status: u16) {
    ::metrics::counter!("nf_outbound_requests_total", "peer_status" => status.to_string()).increment(1);
}

pub fn record_correlation_wait(start: Instant) {
    ::metrics::histogram!("nf_correlation_wait_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_follow_up(outcome: &'static str) {
    ::metrics::counter!("nf_follow_ups_total", "outcome" => outcome).increment(1);
}
