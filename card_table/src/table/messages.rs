//! Table actor message types.

use tokio::sync::oneshot;

use super::{
    entities::{Identity, PlayerAction, TableSnapshot},
    errors::TableResult,
};
use crate::net::connection::{Connection, ConnectionId};

/// Reply channel for mutating requests.
pub type Responder = oneshot::Sender<TableResult<()>>;

/// Messages that can be sent to a TableActor
#[derive(Debug)]
pub enum TableMessage {
    /// Subscribe the connection and announce the user at the table
    Join {
        connection: Connection,
        user: Identity,
        response: Responder,
    },

    /// Unsubscribe the connection and announce the user leaving
    Leave {
        connection_id: ConnectionId,
        user: Identity,
        response: Responder,
    },

    /// Add a subscriber without announcing anything
    Subscribe { connection: Connection },

    /// Remove a subscriber without announcing anything
    Unsubscribe { connection_id: ConnectionId },

    TakeSeat {
        user: Identity,
        seat_index: i64,
        response: Responder,
    },

    LeaveSeat {
        user: Identity,
        response: Responder,
    },

    StartHand {
        user: Identity,
        response: Responder,
    },

    /// Player action (fold, check, call, bet, raise)
    Action {
        user: Identity,
        action: PlayerAction,
        response: Responder,
    },

    /// Connection dropped: unsubscribe and flag the user's seat
    Disconnect {
        connection_id: ConnectionId,
        user: Option<Identity>,
    },

    /// Get current table state
    GetSnapshot {
        response: oneshot::Sender<TableSnapshot>,
    },

    /// Number of live subscribers
    GetSubscriberCount {
        response: oneshot::Sender<usize>,
    },

    /// Close table
    Close,
}
