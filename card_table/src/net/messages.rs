//! JSON envelopes exchanged with clients.
//!
//! Every frame in either direction is `{"type", "requestId"?, "payload"}`.
//! Inbound payloads are decoded lazily so the dispatcher can check
//! authentication and table membership before field validation.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::fmt;

use super::errors::MessageError;
use crate::table::entities::{Identity, TableId, TableSnapshot};

/// Opaque correlation value echoed back on direct replies.
pub type RequestId = Value;

/// Client-facing error codes.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    BadMessage,
    NotAuthenticated,
    InvalidRequest,
    TableNotFound,
    NotInTable,
    SeatOutOfRange,
    AlreadySeated,
    SeatTaken,
    NotSeated,
    NotAuthorized,
    InvalidState,
    HandNotActive,
    NotYourTurn,
    InvalidAction,
    InvalidAmount,
    NotImplemented,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadMessage => "BAD_MESSAGE",
            Self::NotAuthenticated => "NOT_AUTHENTICATED",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::TableNotFound => "TABLE_NOT_FOUND",
            Self::NotInTable => "NOT_IN_TABLE",
            Self::SeatOutOfRange => "SEAT_OUT_OF_RANGE",
            Self::AlreadySeated => "ALREADY_SEATED",
            Self::SeatTaken => "SEAT_TAKEN",
            Self::NotSeated => "NOT_SEATED",
            Self::NotAuthorized => "NOT_AUTHORIZED",
            Self::InvalidState => "INVALID_STATE",
            Self::HandNotActive => "HAND_NOT_ACTIVE",
            Self::NotYourTurn => "NOT_YOUR_TURN",
            Self::InvalidAction => "INVALID_ACTION",
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::NotImplemented => "NOT_IMPLEMENTED",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recognized inbound message types.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MessageType {
    Auth,
    JoinTable,
    LeaveTable,
    TakeSeat,
    LeaveSeat,
    StartHand,
    Action,
}

impl MessageType {
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "AUTH" => Self::Auth,
            "JOIN_TABLE" => Self::JoinTable,
            "LEAVE_TABLE" => Self::LeaveTable,
            "TAKE_SEAT" => Self::TakeSeat,
            "LEAVE_SEAT" => Self::LeaveSeat,
            "START_HAND" => Self::StartHand,
            "ACTION" => Self::Action,
            _ => return None,
        };
        Some(kind)
    }
}

/// A decoded client frame with its payload still untyped.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InboundMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub request_id: Option<RequestId>,
    #[serde(default)]
    pub payload: Value,
}

impl InboundMessage {
    /// Decodes a text frame. Anything that isn't a JSON object with a
    /// string `type` is a bad message.
    pub fn parse(raw: &str) -> Result<Self, MessageError> {
        let mut message: Self =
            serde_json::from_str(raw).map_err(|e| MessageError::Malformed(e.to_string()))?;
        if message.payload.is_null() {
            message.payload = Value::Object(Map::new());
        }
        Ok(message)
    }

    /// Decodes the payload into a typed request body.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.payload)
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Payload of every message that only addresses a table.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TableRef {
    #[serde(default)]
    pub table_id: Option<TableId>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TakeSeatPayload {
    pub seat_index: i64,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActionPayload {
    pub action: String,
    #[serde(default)]
    pub amount: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ErrorPayload {
    pub code: ErrorCode,
    pub message: String,
    pub details: Map<String, Value>,
}

/// Server message bodies, tagged as `{"type": ..., "payload": ...}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    AuthOk(Identity),
    State { table: TableSnapshot },
    Error(ErrorPayload),
}

/// A server frame. Only direct replies carry a `requestId`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OutboundMessage {
    #[serde(flatten)]
    pub body: ServerMessage,
    #[serde(rename = "requestId", skip_serializing_if = "Option::is_none")]
    pub request_id: Option<RequestId>,
}

impl OutboundMessage {
    pub fn auth_ok(identity: Identity, request_id: Option<RequestId>) -> Self {
        Self {
            body: ServerMessage::AuthOk(identity),
            request_id,
        }
    }

    /// Broadcast snapshot; never correlated with a request.
    pub fn state(table: TableSnapshot) -> Self {
        Self {
            body: ServerMessage::State { table },
            request_id: None,
        }
    }

    pub fn error(
        code: ErrorCode,
        message: impl Into<String>,
        request_id: Option<RequestId>,
    ) -> Self {
        Self {
            body: ServerMessage::Error(ErrorPayload {
                code,
                message: message.into(),
                details: Map::new(),
            }),
            request_id,
        }
    }

    /// Error code carried by this frame, if it is an error.
    pub fn error_code(&self) -> Option<ErrorCode> {
        match &self.body {
            ServerMessage::Error(payload) => Some(payload.code),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
