//! WebSocket handler for real-time table updates.
//!
//! # Connection Flow
//!
//! 1. Client connects via `GET /ws`
//! 2. Server spawns a send task draining the connection's outbox
//! 3. Every text frame goes through the dispatcher; replies and table
//!    broadcasts arrive through the outbox
//! 4. On close, the session is detached from its table and the send task
//!    is stopped
//!
//! # Example
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:8000/ws');
//!
//! ws.onopen = () => {
//!   ws.send(JSON.stringify({ type: "AUTH", requestId: "1", payload: { token: "dev", displayName: "Alice" } }));
//!   ws.send(JSON.stringify({ type: "JOIN_TABLE", payload: { tableId: "friday" } }));
//! };
//!
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   if (msg.type === "STATE") {
//!     render(msg.payload.table);
//!   }
//! };
//! ```

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use card_table::{
    Connection, Session,
    net::connection::DEFAULT_OUTBOX_CAPACITY,
};
use futures_util::{SinkExt, StreamExt};
use log::{error, warn};
use std::sync::atomic::Ordering;

use super::AppState;
use crate::{logging, metrics};

/// Upgrade HTTP connection to WebSocket.
///
/// Authentication happens in-band with an `AUTH` message.
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    let (connection, mut outbox) = Connection::channel(DEFAULT_OUTBOX_CAPACITY);
    let mut session = Session::new(connection);
    let connection_id = session.connection().id().to_string();

    let open = state.connections.fetch_add(1, Ordering::Relaxed) + 1;
    metrics::websocket_connections_total();
    metrics::websocket_connections_active(open);
    logging::log_connection_event(&connection_id, "connected", None);

    // Spawn task to write replies and table broadcasts
    let send_task = tokio::spawn(async move {
        while let Some(message) = outbox.recv().await {
            let json = match message.to_json() {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize outbound message: {}", e);
                    continue;
                }
            };

            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
            metrics::websocket_messages_sent();
        }
    });

    // Receive messages from client
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                metrics::websocket_messages_received();
                if let Some(code) = state.dispatcher.handle_text(&mut session, text.as_str()).await {
                    metrics::client_errors_total(code);
                    logging::log_client_error(&connection_id, code.as_str());
                }
            }
            Ok(Message::Close(_)) => break,
            Err(e) => {
                warn!("WebSocket {} error: {}", connection_id, e);
                break;
            }
            _ => {}
        }
    }

    state.dispatcher.handle_disconnect(&mut session).await;
    send_task.abort();

    let open = state.connections.fetch_sub(1, Ordering::Relaxed).saturating_sub(1);
    metrics::websocket_connections_active(open);
    logging::log_connection_event(
        &connection_id,
        "disconnected",
        session.identity().map(|i| i.user_id.as_str()),
    );
}
