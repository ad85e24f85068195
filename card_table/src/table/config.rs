//! Table configuration models.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entities::Chips;

/// Largest supported seat count.
pub const MAX_SEATS: usize = 10;

/// Hard limit on the chips a seat starts with. Keeps every pot and bet
/// total of a full table far inside `u64`.
pub const MAX_STARTING_STACK: Chips = 1_000_000_000;

/// Table configuration applied to every lazily created table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Display name given to new tables
    pub name: String,

    /// Number of seats (default: 6)
    pub max_seats: usize,

    /// Chips a player receives when taking a seat (hard limit: 1,000,000,000)
    pub starting_stack: Chips,
}

/// Rejected table configuration.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum TableConfigError {
    #[error("Table name must not be empty")]
    EmptyName,

    #[error("Max seats must be between 2 and {MAX_SEATS}, got {0}")]
    SeatCount(usize),

    #[error("Starting stack must be between 1 and {MAX_STARTING_STACK}, got {0}")]
    StartingStack(Chips),
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: "Friday Night Poker".to_string(),
            max_seats: 6,
            starting_stack: 1500,
        }
    }
}

impl TableConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), TableConfigError> {
        if self.name.trim().is_empty() {
            return Err(TableConfigError::EmptyName);
        }

        if self.max_seats < 2 || self.max_seats > MAX_SEATS {
            return Err(TableConfigError::SeatCount(self.max_seats));
        }

        if self.starting_stack == 0 || self.starting_stack > MAX_STARTING_STACK {
            return Err(TableConfigError::StartingStack(self.starting_stack));
        }

        Ok(())
    }
}
