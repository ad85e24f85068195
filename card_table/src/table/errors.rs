//! Table error types.

use thiserror::Error;

use crate::net::messages::ErrorCode;

/// Validation failures of seat and hand operations.
///
/// None of these are fatal to the table: the state is left untouched and
/// only the requester is told.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum TableError {
    #[error("seatIndex {0} out of range")]
    SeatOutOfRange(i64),

    #[error("You are already seated.")]
    AlreadySeated,

    #[error("That seat is already taken.")]
    SeatTaken,

    #[error("You are not seated.")]
    NotSeated,

    #[error("Only the dealer can start a hand.")]
    NotAuthorized,

    #[error("{0}")]
    InvalidState(String),

    #[error("No hand in progress.")]
    HandNotActive,

    #[error("Not your turn.")]
    NotYourTurn,

    #[error("{0}")]
    InvalidAction(String),

    #[error("Amount must be a positive integer.")]
    InvalidAmount,

    /// The table's actor is gone (server shutting down).
    #[error("Table is closed.")]
    Closed,
}

impl TableError {
    /// Client-facing error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::SeatOutOfRange(_) => ErrorCode::SeatOutOfRange,
            Self::AlreadySeated => ErrorCode::AlreadySeated,
            Self::SeatTaken => ErrorCode::SeatTaken,
            Self::NotSeated => ErrorCode::NotSeated,
            Self::NotAuthorized => ErrorCode::NotAuthorized,
            Self::InvalidState(_) => ErrorCode::InvalidState,
            Self::HandNotActive => ErrorCode::HandNotActive,
            Self::NotYourTurn => ErrorCode::NotYourTurn,
            Self::InvalidAction(_) => ErrorCode::InvalidAction,
            Self::InvalidAmount => ErrorCode::InvalidAmount,
            Self::Closed => ErrorCode::TableNotFound,
        }
    }
}

/// Result type for table operations
pub type TableResult<T> = Result<T, TableError>;
