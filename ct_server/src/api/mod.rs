//! HTTP/WebSocket API for the card table server.
//!
//! # Architecture
//!
//! The API is built with:
//! - **Axum**: Async web framework for HTTP/WebSocket
//! - **Tower**: CORS middleware
//! - **Actor Model**: Table state managed by dedicated actor tasks
//!
//! # Endpoints Overview
//!
//! - `GET /health` - Server health status
//! - `GET /ws` - WebSocket carrying the JSON message envelopes
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use card_table::{DevIdentityProvider, TableConfig, TableManager};
//! use ct_server::{api::{AppState, create_router}, config::CorsOrigins};
//! use std::sync::Arc;
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let tables = Arc::new(TableManager::new(TableConfig::default()));
//! let state = AppState::new(tables, Arc::new(DevIdentityProvider));
//! let app = create_router(state, &CorsOrigins::Any);
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod websocket;

use axum::{
    Router,
    extract::State,
    http::{HeaderValue, Method},
    response::Json,
    routing::get,
};
use card_table::{Dispatcher, IdentityProvider, TableManager};
use serde::Serialize;
use std::sync::{Arc, atomic::AtomicU64};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::{config::CorsOrigins, metrics};

/// Application state shared across all HTTP handlers and WebSocket connections.
///
/// Cloned for each request (cheap due to Arc wrappers).
#[derive(Clone)]
pub struct AppState {
    pub table_manager: Arc<TableManager>,
    pub dispatcher: Arc<Dispatcher>,
    /// Open WebSocket connections
    pub connections: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(table_manager: Arc<TableManager>, identity: Arc<dyn IdentityProvider>) -> Self {
        let dispatcher = Arc::new(Dispatcher::new(table_manager.clone(), identity));
        Self {
            table_manager,
            dispatcher,
            connections: Arc::new(AtomicU64::new(0)),
        }
    }
}

/// Create the API router with all endpoints and middleware.
///
/// ```text
/// GET  /health   - Health check
/// GET  /ws       - WebSocket
/// ```
pub fn create_router(state: AppState, cors_origins: &CorsOrigins) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ws", get(websocket::websocket_handler))
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// CORS for the browser client. Origins that aren't valid header values are
/// skipped.
pub fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    match origins {
        CorsOrigins::Any => CorsLayer::permissive(),
        CorsOrigins::List(list) => {
            let origins: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        log::warn!("Ignoring invalid CORS origin {origin:?}");
                        None
                    }
                })
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([Method::GET, Method::OPTIONS])
                .allow_headers(Any)
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub tables: usize,
    pub timestamp: String,
}

/// Health check endpoint for monitoring and load balancers.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8000/health
/// # {"status":"ok","version":"0.1.0","tables":1,"timestamp":"2026-10-16T10:30:00+00:00"}
/// ```
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let tables = state.table_manager.table_count().await;
    metrics::active_tables(tables);

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        tables,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
