//! Card table server using the async actor model.
//!
//! Tables are created on first reference and each runs in its own actor
//! task. Clients connect over WebSocket and exchange JSON envelopes.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Error};
use card_table::{DevIdentityProvider, TableManager};
use ct_server::{api, config::ServerConfig, logging, metrics};
use log::{info, warn};
use pico_args::Arguments;

const HELP: &str = "\
Run the card table server

USAGE:
  ct_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address     [default: env SERVER_BIND or 127.0.0.1:8000]
  --metrics    IP:PORT     Prometheus exporter address    [default: env METRICS_BIND, disabled if unset]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8000)
  METRICS_BIND             Prometheus exporter bind address
  CORS_ORIGINS             Comma-separated allowed origins, or *
  TABLE_NAME               Name given to new tables
  TABLE_MAX_SEATS          Seats per table (2-10)
  TABLE_STARTING_STACK     Chips given when taking a seat (1-1000000000)
  RUST_LOG                 Log filter (default: info)
";

struct Args {
    bind: Option<SocketAddr>,
    metrics: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        metrics: pargs.opt_value_from_str("--metrics")?,
    };

    logging::init();

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        warn!("Ignoring unknown arguments: {:?}", remaining);
    }

    let config = ServerConfig::from_env(args.bind, args.metrics)?;
    config.validate()?;

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(Error::msg)?;
        info!("Prometheus metrics at http://{}/metrics", addr);
    }

    info!(
        "Tables: '{}', {} seats, starting stack {}",
        config.table.name, config.table.max_seats, config.table.starting_stack
    );

    let table_manager = Arc::new(TableManager::new(config.table.clone()));
    let state = api::AppState::new(table_manager.clone(), Arc::new(DevIdentityProvider));
    let app = api::create_router(state, &config.cors_origins);

    info!("Starting HTTP/WebSocket server on {}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");
    table_manager.shutdown().await;

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to install CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }
}
