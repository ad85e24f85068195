//! WebSocket server for the card table engine.
//!
//! - [`api`]: axum router, `/health` and the `/ws` endpoint
//! - [`config`]: environment configuration
//! - [`logging`]: tracing subscriber setup
//! - [`metrics`]: Prometheus exporter and counters

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
