use ::metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Start the Prometheus HTTP exporter on `addr`.
/// After this call, any metrics recorded via the `metrics` crate
/// macros (counter!, gauge!, histogram!) are exported at /metrics.
/// Must be called from inside the tokio runtime.
pub fn init_metrics_server(addr: SocketAddr) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    Ok(())
}

// ── Refresher metrics ────────────────────────────────────────────

pub fn record_refresh(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("market_refresh_total", "outcome" => outcome).increment(1);
}

pub fn set_snapshot_size(symbols: usize) {
    gauge!("market_snapshot_symbols").set(symbols as f64);
}

pub fn record_fetch_latency(latency_ms: f64) {
    histogram!("market_fetch_latency_ms").record(latency_ms);
}

// ── HTTP metrics ─────────────────────────────────────────────────

pub fn record_request(route: &'static str, status: u16) {
    counter!("http_requests_total", "route" => route, "status" => status.to_string())
        .increment(1);
}
