//! Inbound message routing.
//!
//! The checks run in a fixed order: envelope, `AUTH`, authentication,
//! table membership messages, table resolution, then the table commands.
//! A failing check answers the sender with one `ERROR` frame echoing its
//! `requestId`; successful table mutations are answered by the table's
//! `STATE` broadcast.

use std::sync::Arc;

use super::{
    errors::{DispatchError, MessageError},
    identity::{AuthError, IdentityProvider},
    messages::{
        ActionPayload, AuthPayload, ErrorCode, InboundMessage, MessageType, OutboundMessage,
        TableRef, TakeSeatPayload,
    },
    session::Session,
};
use crate::table::{
    entities::{Identity, PlayerAction},
    manager::TableManager,
};

pub struct Dispatcher {
    tables: Arc<TableManager>,
    identity: Arc<dyn IdentityProvider>,
}

impl Dispatcher {
    pub fn new(tables: Arc<TableManager>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { tables, identity }
    }

    pub fn tables(&self) -> &Arc<TableManager> {
        &self.tables
    }

    /// Handles one text frame from `session`. Returns the code of the error
    /// sent back, if any.
    pub async fn handle_text(&self, session: &mut Session, raw: &str) -> Option<ErrorCode> {
        let message = match InboundMessage::parse(raw) {
            Ok(message) => message,
            Err(e) => {
                log::debug!("Connection {}: {:?}", session.connection.id(), e);
                session.connection.notify_error(e.code(), e.to_string(), None);
                return Some(e.code());
            }
        };

        let request_id = message.request_id.clone();
        match self.route(session, &message).await {
            Ok(()) => None,
            Err(e) => {
                let code = e.code();
                log::debug!(
                    "Connection {}: {} rejected with {}: {}",
                    session.connection.id(),
                    message.kind,
                    code,
                    e
                );
                session.connection.notify_error(code, e.to_string(), request_id);
                Some(code)
            }
        }
    }

    /// Cleans up after a closed connection: the table drops the subscriber
    /// and flags the user's seat as disconnected.
    pub async fn handle_disconnect(&self, session: &mut Session) {
        let Some(table_id) = session.table_id.take() else {
            return;
        };

        if let Some(table) = self.tables.get_table(&table_id).await
            && let Err(e) = table
                .disconnect(session.connection.id(), session.identity.clone())
                .await
        {
            log::debug!("Table {table_id}: disconnect not delivered: {e}");
        }
    }

    async fn route(&self, session: &mut Session, message: &InboundMessage) -> Result<(), DispatchError> {
        let kind = MessageType::from_name(&message.kind);
        if kind == Some(MessageType::Auth) {
            return self.authenticate(session, message);
        }

        let user = session
            .identity
            .clone()
            .ok_or(DispatchError::NotAuthenticated)?;

        match kind {
            Some(MessageType::JoinTable) => return self.join_table(session, user, message).await,
            Some(MessageType::LeaveTable) => return self.leave_table(session, user, message).await,
            _ => {}
        }

        let table_ref: TableRef = message
            .payload_as()
            .map_err(|_| MessageError::InvalidRequest("tableId must be a string.".to_string()))?;
        let table_id = table_ref
            .table_id
            .filter(|id| !id.is_empty())
            .or_else(|| session.table_id.clone())
            .ok_or(DispatchError::NotInTable)?;
        let table = self
            .tables
            .get_table(&table_id)
            .await
            .ok_or(DispatchError::NotInTable)?;

        match kind {
            Some(MessageType::TakeSeat) => {
                let payload: TakeSeatPayload = message.payload_as().map_err(|_| {
                    MessageError::InvalidRequest("seatIndex must be an integer.".to_string())
                })?;
                table.take_seat(user, payload.seat_index).await?;
            }
            Some(MessageType::LeaveSeat) => table.leave_seat(user).await?,
            Some(MessageType::StartHand) => table.start_hand(user).await?,
            Some(MessageType::Action) => {
                let payload: ActionPayload = message.payload_as().map_err(|_| {
                    MessageError::InvalidRequest("Missing action.".to_string())
                })?;
                let action = PlayerAction::parse(&payload.action, payload.amount.as_ref());
                table.act(user, action).await?;
            }
            _ => return Err(DispatchError::NotImplemented(message.kind.clone())),
        }

        Ok(())
    }

    fn authenticate(&self, session: &mut Session, message: &InboundMessage) -> Result<(), DispatchError> {
        let payload: AuthPayload = message
            .payload_as()
            .map_err(|_| MessageError::InvalidRequest("Invalid AUTH payload.".to_string()))?;
        let token = payload.token.unwrap_or_default();
        if token.is_empty() {
            return Err(AuthError::MissingToken.into());
        }

        let identity = self
            .identity
            .authenticate(&token, payload.display_name.as_deref())?;
        log::info!(
            "Connection {} authenticated as {} ({})",
            session.connection.id(),
            identity.user_id,
            identity.display_name
        );

        session.identity = Some(identity.clone());
        self.reply(session, OutboundMessage::auth_ok(identity, message.request_id.clone()));
        Ok(())
    }

    async fn join_table(
        &self,
        session: &mut Session,
        user: Identity,
        message: &InboundMessage,
    ) -> Result<(), DispatchError> {
        let table_id = message
            .payload_as::<TableRef>()
            .ok()
            .and_then(|payload| payload.table_id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| MessageError::InvalidRequest("Missing tableId.".to_string()))?;

        if let Some(previous) = session.table_id.take()
            && previous != table_id
            && let Err(e) = self
                .tables
                .unsubscribe(&previous, session.connection.id())
                .await
        {
            log::debug!("Table {previous}: unsubscribe not delivered: {e}");
        }

        let table = self.tables.resolve_or_create(&table_id).await;
        table.join(session.connection.clone(), user).await?;
        session.table_id = Some(table_id);
        Ok(())
    }

    async fn leave_table(
        &self,
        session: &mut Session,
        user: Identity,
        message: &InboundMessage,
    ) -> Result<(), DispatchError> {
        let requested = message
            .payload_as::<TableRef>()
            .ok()
            .and_then(|payload| payload.table_id)
            .filter(|id| !id.is_empty());
        let table_id = requested
            .or_else(|| session.table_id.clone())
            .ok_or(DispatchError::TableNotFound)?;
        let table = self
            .tables
            .get_table(&table_id)
            .await
            .ok_or(DispatchError::TableNotFound)?;

        table.leave(session.connection.id(), user).await?;
        if session.table_id.as_deref() == Some(table_id.as_str()) {
            session.table_id = None;
        }
        Ok(())
    }

    fn reply(&self, session: &Session, message: OutboundMessage) {
        if let Err(e) = session.connection.deliver(message) {
            log::debug!("Connection {}: reply dropped: {}", session.connection.id(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{
        connection::Connection,
        identity::DevIdentityProvider,
        messages::ServerMessage,
    };
    use crate::table::config::TableConfig;
    use tokio::sync::mpsc;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(
            Arc::new(TableManager::new(TableConfig::default())),
            Arc::new(DevIdentityProvider),
        )
    }

    fn session() -> (Session, mpsc::Receiver<OutboundMessage>) {
        let (connection, rx) = Connection::channel(32);
        (Session::new(connection), rx)
    }

    async fn auth(d: &Dispatcher, s: &mut Session, token: &str) {
        let raw = format!(r#"{{"type":"AUTH","payload":{{"token":"{token}","displayName":"{token}"}}}}"#);
        assert_eq!(d.handle_text(s, &raw).await, None);
    }

    fn drain(rx: &mut mpsc::Receiver<OutboundMessage>) -> Vec<OutboundMessage> {
        let mut frames = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            frames.push(frame);
        }
        frames
    }

    #[tokio::test]
    async fn test_bad_json_is_bad_message() {
        let d = dispatcher();
        let (mut s, mut rx) = session();

        assert_eq!(d.handle_text(&mut s, "{not json").await, Some(ErrorCode::BadMessage));
        assert_eq!(d.handle_text(&mut s, r#"{"payload":{}}"#).await, Some(ErrorCode::BadMessage));

        let frames = drain(&mut rx);
        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(|f| f.request_id.is_none()));
    }

    #[tokio::test]
    async fn test_commands_require_auth() {
        let d = dispatcher();
        let (mut s, mut rx) = session();

        for raw in [
            r#"{"type":"JOIN_TABLE","requestId":"r1","payload":{"tableId":"t1"}}"#,
            r#"{"type":"TAKE_SEAT","requestId":"r1","payload":{"seatIndex":0}}"#,
            r#"{"type":"CHAT","requestId":"r1","payload":{}}"#,
        ] {
            assert_eq!(d.handle_text(&mut s, raw).await, Some(ErrorCode::NotAuthenticated));
        }

        let frames = drain(&mut rx);
        assert_eq!(frames.len(), 3);
        assert!(frames.iter().all(|f| f.request_id == Some(serde_json::json!("r1"))));
        assert_eq!(d.tables().table_count().await, 0);
    }

    #[tokio::test]
    async fn test_auth_replies_with_identity() {
        let d = dispatcher();
        let (mut s, mut rx) = session();

        let code = d
            .handle_text(&mut s, r#"{"type":"AUTH","requestId":1,"payload":{"token":"abc"}}"#)
            .await;
        assert_eq!(code, None);

        let frame = rx.try_recv().unwrap();
        assert_eq!(frame.request_id, Some(serde_json::json!(1)));
        match frame.body {
            ServerMessage::AuthOk(identity) => {
                assert_eq!(identity.display_name, "Player");
                assert_eq!(identity.user_id, DevIdentityProvider::user_id_for("abc"));
            }
            other => panic!("expected AUTH_OK, got {other:?}"),
        }
        assert!(s.is_authenticated());
    }

    #[tokio::test]
    async fn test_auth_without_token() {
        let d = dispatcher();
        let (mut s, _rx) = session();

        assert_eq!(
            d.handle_text(&mut s, r#"{"type":"AUTH","payload":{"token":""}}"#).await,
            Some(ErrorCode::NotAuthenticated)
        );
        assert_eq!(
            d.handle_text(&mut s, r#"{"type":"AUTH"}"#).await,
            Some(ErrorCode::NotAuthenticated)
        );
        assert!(!s.is_authenticated());
    }

    #[tokio::test]
    async fn test_join_requires_table_id() {
        let d = dispatcher();
        let (mut s, _rx) = session();
        auth(&d, &mut s, "alice").await;

        assert_eq!(
            d.handle_text(&mut s, r#"{"type":"JOIN_TABLE","payload":{}}"#).await,
            Some(ErrorCode::InvalidRequest)
        );
        assert_eq!(
            d.handle_text(&mut s, r#"{"type":"JOIN_TABLE","payload":{"tableId":""}}"#).await,
            Some(ErrorCode::InvalidRequest)
        );
    }

    #[tokio::test]
    async fn test_table_commands_before_join() {
        let d = dispatcher();
        let (mut s, _rx) = session();
        auth(&d, &mut s, "alice").await;

        assert_eq!(
            d.handle_text(&mut s, r#"{"type":"TAKE_SEAT","payload":{"seatIndex":"x"}}"#).await,
            Some(ErrorCode::NotInTable)
        );
        assert_eq!(
            d.handle_text(&mut s, r#"{"type":"LEAVE_TABLE","payload":{}}"#).await,
            Some(ErrorCode::TableNotFound)
        );
        assert_eq!(
            d.handle_text(&mut s, r#"{"type":"START_HAND","payload":{"tableId":"nope"}}"#).await,
            Some(ErrorCode::NotInTable)
        );
        assert_eq!(d.tables().table_count().await, 0);
    }

    #[tokio::test]
    async fn test_join_then_seat_broadcasts_state() {
        let d = dispatcher();
        let (mut s, mut rx) = session();
        auth(&d, &mut s, "alice").await;
        drain(&mut rx);

        assert_eq!(
            d.handle_text(&mut s, r#"{"type":"JOIN_TABLE","requestId":"j","payload":{"tableId":"t1"}}"#)
                .await,
            None
        );
        assert_eq!(s.table_id(), Some("t1"));
        assert_eq!(
            d.handle_text(&mut s, r#"{"type":"TAKE_SEAT","payload":{"seatIndex":2}}"#).await,
            None
        );
        assert_eq!(
            d.handle_text(&mut s, r#"{"type":"TAKE_SEAT","payload":{"seatIndex":"2"}}"#).await,
            Some(ErrorCode::InvalidRequest)
        );

        let snapshot = d.tables().snapshot("t1").await.unwrap();
        assert_eq!(snapshot.version, 3);
        assert_eq!(snapshot.seats[2].display_name.as_deref(), Some("alice"));

        let versions: Vec<u64> = drain(&mut rx)
            .into_iter()
            .filter_map(|f| match f.body {
                ServerMessage::State { table } => Some(table.version),
                _ => None,
            })
            .collect();
        assert_eq!(versions, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_unknown_type_after_join() {
        let d = dispatcher();
        let (mut s, _rx) = session();
        auth(&d, &mut s, "alice").await;
        d.handle_text(&mut s, r#"{"type":"JOIN_TABLE","payload":{"tableId":"t1"}}"#)
            .await;

        assert_eq!(
            d.handle_text(&mut s, r#"{"type":"CHAT","payload":{"text":"hi"}}"#).await,
            Some(ErrorCode::NotImplemented)
        );
    }

    #[tokio::test]
    async fn test_switching_tables_unsubscribes() {
        let d = dispatcher();
        let (mut s, _rx) = session();
        auth(&d, &mut s, "alice").await;

        d.handle_text(&mut s, r#"{"type":"JOIN_TABLE","payload":{"tableId":"a"}}"#)
            .await;
        d.handle_text(&mut s, r#"{"type":"JOIN_TABLE","payload":{"tableId":"b"}}"#)
            .await;

        let a = d.tables().get_table("a").await.unwrap();
        let b = d.tables().get_table("b").await.unwrap();
        assert_eq!(a.subscriber_count().await.unwrap(), 0);
        assert_eq!(b.subscriber_count().await.unwrap(), 1);
        assert_eq!(s.table_id(), Some("b"));
    }

    #[tokio::test]
    async fn test_disconnect_marks_seat() {
        let d = dispatcher();
        let (mut s, _rx) = session();
        auth(&d, &mut s, "alice").await;
        d.handle_text(&mut s, r#"{"type":"JOIN_TABLE","payload":{"tableId":"t1"}}"#)
            .await;
        d.handle_text(&mut s, r#"{"type":"TAKE_SEAT","payload":{"seatIndex":0}}"#)
            .await;

        d.handle_disconnect(&mut s).await;

        let snapshot = d.tables().snapshot("t1").await.unwrap();
        assert!(!snapshot.seats[0].is_connected);
        assert_eq!(snapshot.version, 4);
        let table = d.tables().get_table("t1").await.unwrap();
        assert_eq!(table.subscriber_count().await.unwrap(), 0);
    }
}
