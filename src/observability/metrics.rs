//! Metrics collection and exposition.
//!
//! # Metrics
//! - `blx_queries_total` (counter): ledger reads by `kind`, `outcome` (ok, error)
//! - `blx_query_cache_entries` (gauge): entries held by the query cache
//! - `blx_transactions_submitted_total` (counter): broadcasts by `kind` (authorization, action)
//! - `blx_transactions_finished_total` (counter): terminal phases by `kind`, `outcome`
//!   (confirmed, reverted, network, abandoned)
//! - `blx_rpc_endpoint_health` (gauge): 1 when the last call to `endpoint` succeeded

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_query(kind: &'static str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    counter!("blx_queries_total", "kind" => kind, "outcome" => outcome).increment(1);
}

pub fn record_cache_size(entries: usize) {
    gauge!("blx_query_cache_entries").set(entries as f64);
}

pub fn record_transaction_submitted(kind: &'static str) {
    counter!("blx_transactions_submitted_total", "kind" => kind).increment(1);
}

pub fn record_transaction_finished(kind: &'static str, outcome: &'static str) {
    counter!("blx_transactions_finished_total", "kind" => kind, "outcome" => outcome).increment(1);
}

pub fn record_endpoint_health(endpoint: usize, healthy: bool) {
    gauge!("blx_rpc_endpoint_health", "endpoint" => endpoint.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}
