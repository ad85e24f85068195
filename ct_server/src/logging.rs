//! Structured logging configuration.
//!
//! The library crate logs through the `log` facade; the fmt subscriber
//! picks those records up alongside the server's own `tracing` events.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,tower_http=warn,hyper=warn";

/// Initialize structured logging
///
/// Configurable log levels via RUST_LOG env var.
///
/// # Example
///
/// ```no_run
/// use ct_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log a WebSocket connection lifecycle event
pub fn log_connection_event(connection_id: &str, event: &str, user_id: Option<&str>) {
    tracing::info!(
        connection_id = connection_id,
        user_id = user_id,
        "WebSocket {}",
        event
    );
}

/// Log a rejected client message
pub fn log_client_error(connection_id: &str, code: &str) {
    tracing::debug!(
        connection_id = connection_id,
        error_code = code,
        "Client message rejected"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_helpers_without_subscriber() {
        // Just ensure it doesn't panic
        log_connection_event("c1", "connected", None);
        log_connection_event("c1", "disconnected", Some("usr_1234abcd"));
        log_client_error("c1", "BAD_MESSAGE");
    }

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }
}
