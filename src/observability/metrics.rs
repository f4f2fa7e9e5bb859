//! Metrics collection and exposition.
//!
//! # Metrics
//! - `iplist_reloads_total` (counter): list file parses, by `outcome` (`ok`/`error`)
//! - `iplist_watch_events_total` (counter): filesystem events that marked a list stale
//! - `iplist_matches_total` (counter): matcher evaluations, by `policy` and `result`
//!
//! All recording goes through the `metrics` facade and is a no-op until a
//! recorder is installed with [`init_metrics`].

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and serve `/metrics` on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_reload(outcome: &'static str) {
    metrics::counter!("iplist_reloads_total", "outcome" => outcome).increment(1);
}

pub fn record_watch_event() {
    metrics::counter!("iplist_watch_events_total").increment(1);
}

pub fn record_match(policy: &'static str, matched: bool) {
    let result = if matched { "match" } else { "no_match" };
    metrics::counter!("iplist_matches_total", "policy" => policy, "result" => result).increment(1);
}
