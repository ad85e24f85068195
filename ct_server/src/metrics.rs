//! Prometheus metrics for monitoring server health.
//!
//! Metrics are exposed in Prometheus text format on a separate listener,
//! only when a metrics address is configured. Without an installed
//! recorder every call below is a no-op.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use ct_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::websocket_connections_active(10);
//! ```

use card_table::ErrorCode;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// WebSocket Metrics
// ============================================================================

/// Set current active WebSocket connections count.
pub fn websocket_connections_active(count: u64) {
    metrics::gauge!("websocket_connections_active").set(count as f64);
}

/// Increment total WebSocket connections counter.
pub fn websocket_connections_total() {
    metrics::counter!("websocket_connections_total").increment(1);
}

/// Increment WebSocket messages received counter.
pub fn websocket_messages_received() {
    metrics::counter!("websocket_messages_received").increment(1);
}

/// Increment WebSocket messages sent counter.
pub fn websocket_messages_sent() {
    metrics::counter!("websocket_messages_sent").increment(1);
}

// ============================================================================
// Table Metrics
// ============================================================================

/// Count an `ERROR` frame sent back to a client.
pub fn client_errors_total(code: ErrorCode) {
    metrics::counter!("client_errors_total", "code" => code.as_str()).increment(1);
}

/// Set current table count.
pub fn active_tables(count: usize) {
    metrics::gauge!("active_tables").set(count as f64);
}
