//! Metrics collection and exposition.
//!
//! # Metrics
//! - `movie_fetch_attempts_total` (counter): network attempts, including retries
//! - `movie_fetch_outcomes_total` (counter): refresh outcomes by `outcome`
//! - `movie_fetch_cache_reads_total` (counter): cache reads by `result` (hit, stale, miss)
//! - `movie_fetch_breaker_state` (gauge): 0=closed, 1=open, 2=half-open
//! - `movie_fetch_request_duration_seconds` (histogram): per-attempt latency
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with an HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one network attempt and its latency.
pub fn record_attempt(start: Instant, ok: bool) {
    counter!("movie_fetch_attempts_total", "ok" => if ok { "true" } else { "false" }).increment(1);
    histogram!("movie_fetch_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record how a refresh ended.
pub fn record_outcome(outcome: &'static str) {
    counter!("movie_fetch_outcomes_total", "outcome" => outcome).increment(1);
}

/// Record a cache lookup.
pub fn record_cache_read(result: &'static str) {
    counter!("movie_fetch_cache_reads_total", "result" => result).increment(1);
}

/// Record the breaker state gauge.
pub fn record_breaker_state(value: f64) {
    gauge!("movie_fetch_breaker_state").set(value);
}
