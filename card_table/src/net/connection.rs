//! Connection handles.
//!
//! A [`Connection`] is the only thing the core knows about a client socket:
//! a stable id and a bounded channel of outbound frames. The transport owns
//! the receiving end and writes whatever arrives to the wire.

use log::debug;
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

use super::{
    errors::DeliveryError,
    messages::{ErrorCode, OutboundMessage, RequestId},
};

/// Outbound frames buffered per connection before it counts as stalled.
pub const DEFAULT_OUTBOX_CAPACITY: usize = 64;

pub type ConnectionId = Uuid;

#[derive(Clone, Debug)]
pub struct Connection {
    id: ConnectionId,
    outbox: mpsc::Sender<OutboundMessage>,
}

impl Connection {
    pub fn new(outbox: mpsc::Sender<OutboundMessage>) -> Self {
        Self {
            id: Uuid::new_v4(),
            outbox,
        }
    }

    /// Creates a connection together with the receiver its transport drains.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<OutboundMessage>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queues a frame without waiting.
    pub fn deliver(&self, message: OutboundMessage) -> Result<(), DeliveryError> {
        self.outbox.try_send(message).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::Full,
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }

    /// Sends an `ERROR` frame to this connection only.
    pub fn notify_error(
        &self,
        code: ErrorCode,
        message: impl Into<String>,
        request_id: Option<RequestId>,
    ) {
        if let Err(e) = self.deliver(OutboundMessage::error(code, message, request_id)) {
            debug!("Connection {}: dropped {} error: {}", self.id, code, e);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.outbox.is_closed()
    }
}
