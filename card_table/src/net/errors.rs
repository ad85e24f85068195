//! Network error types for message parsing, delivery and dispatch.

use thiserror::Error;

use super::{identity::AuthError, messages::ErrorCode};
use crate::table::errors::TableError;

/// Errors decoding a client frame.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum MessageError {
    /// Not JSON, not an object, or no string `type`.
    #[error("Invalid JSON message.")]
    Malformed(String),

    /// A payload field is missing or has the wrong type.
    #[error("{0}")]
    InvalidRequest(String),
}

impl MessageError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Malformed(_) => ErrorCode::BadMessage,
            Self::InvalidRequest(_) => ErrorCode::InvalidRequest,
        }
    }
}

/// Why an outbound message could not be queued for a connection.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum DeliveryError {
    #[error("outbound channel full")]
    Full,

    #[error("connection closed")]
    Closed,
}

/// Everything the dispatcher can answer with an `ERROR` frame.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum DispatchError {
    #[error(transparent)]
    Message(#[from] MessageError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("Authenticate first using AUTH.")]
    NotAuthenticated,

    #[error("Table not found.")]
    TableNotFound,

    #[error("Join a table first.")]
    NotInTable,

    #[error("{0} not implemented yet.")]
    NotImplemented(String),
}

impl DispatchError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Message(e) => e.code(),
            Self::Auth(_) | Self::NotAuthenticated => ErrorCode::NotAuthenticated,
            Self::Table(e) => e.code(),
            Self::TableNotFound => ErrorCode::TableNotFound,
            Self::NotInTable => ErrorCode::NotInTable,
            Self::NotImplemented(_) => ErrorCode::NotImplemented,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_codes() {
        assert_eq!(
            DispatchError::from(MessageError::Malformed("eof".to_string())).code(),
            ErrorCode::BadMessage
        );
        assert_eq!(
            DispatchError::from(AuthError::MissingToken).code(),
            ErrorCode::NotAuthenticated
        );
        assert_eq!(
            DispatchError::from(TableError::NotSeated).code(),
            ErrorCode::NotSeated
        );
        assert_eq!(
            DispatchError::NotImplemented("CHAT".to_string()).to_string(),
            "CHAT not implemented yet."
        );
    }

    #[test]
    fn test_transparent_messages() {
        assert_eq!(
            DispatchError::from(TableError::SeatTaken).to_string(),
            "That seat is already taken."
        );
        assert_eq!(
            DispatchError::from(MessageError::InvalidRequest("Missing tableId.".to_string()))
                .to_string(),
            "Missing tableId."
        );
    }
}
