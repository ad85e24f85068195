//! Table actor implementation with async message handling.
//!
//! One task owns one [`Table`]. Messages are applied strictly one at a time
//! and every successful mutation is broadcast to the subscribers before the
//! next message is taken, so each subscriber observes versions in order.

use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};

use super::{
    config::TableConfig,
    entities::{Identity, PlayerAction, Table, TableId, TableSnapshot},
    errors::{TableError, TableResult},
    messages::{Responder, TableMessage},
};
use crate::net::{
    connection::{Connection, ConnectionId},
    errors::DeliveryError,
    messages::OutboundMessage,
};

/// Inbox capacity of each table actor.
const INBOX_CAPACITY: usize = 100;

/// Table actor handle for sending messages
#[derive(Clone, Debug)]
pub struct TableHandle {
    sender: mpsc::Sender<TableMessage>,
    table_id: TableId,
}

impl TableHandle {
    /// Create a new table handle
    pub fn new(sender: mpsc::Sender<TableMessage>, table_id: TableId) -> Self {
        Self { sender, table_id }
    }

    /// Get table ID
    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Send a message to the table
    pub async fn send(&self, message: TableMessage) -> TableResult<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| TableError::Closed)
    }

    async fn request<F>(&self, build: F) -> TableResult<()>
    where
        F: FnOnce(Responder) -> TableMessage,
    {
        let (tx, rx) = oneshot::channel();
        self.send(build(tx)).await?;
        rx.await.map_err(|_| TableError::Closed)?
    }

    pub async fn join(&self, connection: Connection, user: Identity) -> TableResult<()> {
        self.request(|response| TableMessage::Join {
            connection,
            user,
            response,
        })
        .await
    }

    pub async fn leave(&self, connection_id: ConnectionId, user: Identity) -> TableResult<()> {
        self.request(|response| TableMessage::Leave {
            connection_id,
            user,
            response,
        })
        .await
    }

    pub async fn subscribe(&self, connection: Connection) -> TableResult<()> {
        self.send(TableMessage::Subscribe { connection }).await
    }

    pub async fn unsubscribe(&self, connection_id: ConnectionId) -> TableResult<()> {
        self.send(TableMessage::Unsubscribe { connection_id }).await
    }

    pub async fn take_seat(&self, user: Identity, seat_index: i64) -> TableResult<()> {
        self.request(|response| TableMessage::TakeSeat {
            user,
            seat_index,
            response,
        })
        .await
    }

    pub async fn leave_seat(&self, user: Identity) -> TableResult<()> {
        self.request(|response| TableMessage::LeaveSeat { user, response })
            .await
    }

    pub async fn start_hand(&self, user: Identity) -> TableResult<()> {
        self.request(|response| TableMessage::StartHand { user, response })
            .await
    }

    pub async fn act(&self, user: Identity, action: PlayerAction) -> TableResult<()> {
        self.request(|response| TableMessage::Action {
            user,
            action,
            response,
        })
        .await
    }

    pub async fn disconnect(
        &self,
        connection_id: ConnectionId,
        user: Option<Identity>,
    ) -> TableResult<()> {
        self.send(TableMessage::Disconnect {
            connection_id,
            user,
        })
        .await
    }

    pub async fn snapshot(&self) -> TableResult<TableSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(TableMessage::GetSnapshot { response: tx }).await?;
        rx.await.map_err(|_| TableError::Closed)
    }

    pub async fn subscriber_count(&self) -> TableResult<usize> {
        let (tx, rx) = oneshot::channel();
        self.send(TableMessage::GetSubscriberCount { response: tx })
            .await?;
        rx.await.map_err(|_| TableError::Closed)
    }

    pub async fn close(&self) -> TableResult<()> {
        self.send(TableMessage::Close).await
    }
}

/// Table actor managing a single table
pub struct TableActor {
    /// Table state
    table: Table,

    /// Message inbox
    inbox: mpsc::Receiver<TableMessage>,

    /// Connections receiving a snapshot after every change
    subscribers: HashMap<ConnectionId, Connection>,

    /// Is table closed
    is_closed: bool,
}

impl TableActor {
    /// Create a new table actor
    ///
    /// # Returns
    ///
    /// * `(TableActor, TableHandle)` - Actor and handle for sending messages
    pub fn new(id: impl Into<TableId>, config: &TableConfig) -> (Self, TableHandle) {
        let id = id.into();
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);

        let actor = Self {
            table: Table::new(id.clone(), config),
            inbox,
            subscribers: HashMap::new(),
            is_closed: false,
        };

        (actor, TableHandle::new(sender, id))
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        log::info!("Table {} '{}' starting", self.table.id, self.table.name);

        while let Some(message) = self.inbox.recv().await {
            self.handle_message(message);
            if self.is_closed {
                break;
            }
        }

        log::info!("Table {} '{}' closed", self.table.id, self.table.name);
    }

    fn handle_message(&mut self, message: TableMessage) {
        match message {
            TableMessage::Join {
                connection,
                user,
                response,
            } => {
                self.add_subscriber(connection);
                self.table.join(&user);
                self.broadcast();
                let _ = response.send(Ok(()));
            }

            TableMessage::Leave {
                connection_id,
                user,
                response,
            } => {
                self.remove_subscriber(connection_id);
                self.table.leave(&user);
                self.broadcast();
                let _ = response.send(Ok(()));
            }

            TableMessage::Subscribe { connection } => self.add_subscriber(connection),

            TableMessage::Unsubscribe { connection_id } => self.remove_subscriber(connection_id),

            TableMessage::TakeSeat {
                user,
                seat_index,
                response,
            } => {
                let result = self.apply(|table| table.take_seat(&user, seat_index));
                let _ = response.send(result);
            }

            TableMessage::LeaveSeat { user, response } => {
                let result = self.apply(|table| table.leave_seat(&user));
                let _ = response.send(result);
            }

            TableMessage::StartHand { user, response } => {
                let result = self.apply(|table| table.start_hand(&user));
                let _ = response.send(result);
            }

            TableMessage::Action {
                user,
                action,
                response,
            } => {
                let result = self.apply(|table| table.apply_action(&user, &action));
                let _ = response.send(result.map(|_| ()));
            }

            TableMessage::Disconnect {
                connection_id,
                user,
            } => {
                self.remove_subscriber(connection_id);
                if let Some(user) = user
                    && self.table.mark_connected(&user, false)
                {
                    self.broadcast();
                }
            }

            TableMessage::GetSnapshot { response } => {
                let _ = response.send(self.table.snapshot());
            }

            TableMessage::GetSubscriberCount { response } => {
                let _ = response.send(self.subscribers.len());
            }

            TableMessage::Close => {
                self.is_closed = true;
            }
        }
    }

    /// Runs a mutation and broadcasts if it succeeded. Failed mutations leave
    /// the table untouched and nothing is sent.
    fn apply<T, F>(&mut self, mutation: F) -> TableResult<T>
    where
        F: FnOnce(&mut Table) -> TableResult<T>,
    {
        let result = mutation(&mut self.table);
        if result.is_ok() {
            self.broadcast();
        }
        result
    }

    fn add_subscriber(&mut self, connection: Connection) {
        log::debug!("Table {}: subscribe {}", self.table.id, connection.id());
        self.subscribers.insert(connection.id(), connection);
    }

    fn remove_subscriber(&mut self, connection_id: ConnectionId) {
        if self.subscribers.remove(&connection_id).is_some() {
            log::debug!("Table {}: unsubscribe {}", self.table.id, connection_id);
        }
    }

    /// Send the current snapshot to every subscriber, dropping the ones that
    /// can't take it.
    fn broadcast(&mut self) {
        let snapshot = self.table.snapshot();
        let table_id = &self.table.id;

        self.subscribers.retain(|connection_id, connection| {
            match connection.deliver(OutboundMessage::state(snapshot.clone())) {
                Ok(()) => true,
                Err(DeliveryError::Full) => {
                    log::warn!(
                        "Table {}: subscriber {} channel full, dropping",
                        table_id,
                        connection_id
                    );
                    false
                }
                Err(DeliveryError::Closed) => {
                    log::debug!(
                        "Table {}: subscriber {} disconnected, removing",
                        table_id,
                        connection_id
                    );
                    false
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::messages::ServerMessage;

    fn spawn_table() -> TableHandle {
        let (actor, handle) = TableActor::new("t1", &TableConfig::default());
        tokio::spawn(actor.run());
        handle
    }

    fn version_of(message: &OutboundMessage) -> u64 {
        match &message.body {
            ServerMessage::State { table } => table.version,
            other => panic!("expected STATE, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_join_broadcasts_to_new_subscriber() {
        let handle = spawn_table();
        let (connection, mut rx) = Connection::channel(8);

        handle
            .join(connection, Identity::new("usr_a", "Alice"))
            .await
            .unwrap();

        let message = rx.recv().await.unwrap();
        assert_eq!(version_of(&message), 2);
        assert!(message.request_id.is_none());
    }

    #[tokio::test]
    async fn test_failed_mutation_does_not_broadcast() {
        let handle = spawn_table();
        let (connection, mut rx) = Connection::channel(8);
        let alice = Identity::new("usr_a", "Alice");
        handle.join(connection, alice.clone()).await.unwrap();
        rx.recv().await.unwrap();

        assert_eq!(
            handle.take_seat(alice.clone(), 99).await,
            Err(TableError::SeatOutOfRange(99))
        );
        assert!(rx.try_recv().is_err());
        assert_eq!(handle.snapshot().await.unwrap().version, 2);
    }

    #[tokio::test]
    async fn test_full_subscriber_is_dropped() {
        let handle = spawn_table();
        let (slow, _slow_rx) = Connection::channel(1);
        let (fast, mut fast_rx) = Connection::channel(8);
        let alice = Identity::new("usr_a", "Alice");

        handle.join(slow, alice.clone()).await.unwrap();
        handle.join(fast, alice.clone()).await.unwrap();
        assert_eq!(handle.subscriber_count().await.unwrap(), 1);

        handle.take_seat(alice, 0).await.unwrap();
        assert_eq!(version_of(&fast_rx.recv().await.unwrap()), 3);
        assert_eq!(version_of(&fast_rx.recv().await.unwrap()), 4);
    }

    #[tokio::test]
    async fn test_closed_table_reports_closed() {
        let handle = spawn_table();
        handle.close().await.unwrap();
        handle.sender.closed().await;

        assert_eq!(handle.snapshot().await, Err(TableError::Closed));
        assert_eq!(
            handle.leave_seat(Identity::new("usr_a", "Alice")).await,
            Err(TableError::Closed)
        );
    }
}
