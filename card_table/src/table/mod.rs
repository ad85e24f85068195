//! Table module: the in-memory game engine and its actor runtime.
//!
//! - [`entities`]: seats, hands, events and the client-facing snapshot
//! - [`seats`], [`hand`]: the mutations, as plain methods on [`Table`]
//! - [`actor`]: one task per table serializing every mutation
//! - [`manager`]: the registry that creates tables on first reference
//!
//! ## Architecture
//!
//! Each table runs in a separate Tokio task with an mpsc message inbox.
//! A successful mutation bumps the table version and the actor pushes the
//! new snapshot to every subscribed connection before handling the next
//! message.
//!
//! ## Example
//!
//! ```
//! use card_table::table::{Identity, PlayerAction, Table, TableConfig};
//!
//! let mut table = Table::new("friday", &TableConfig::default());
//! let alice = Identity::new("usr_alice", "Alice");
//! let bob = Identity::new("usr_bob", "Bob");
//!
//! table.take_seat(&alice, 0).unwrap();
//! table.take_seat(&bob, 1).unwrap();
//! table.start_hand(&alice).unwrap();
//! table.apply_action(&alice, &PlayerAction::Fold).unwrap();
//!
//! assert_eq!(table.hand_number, 1);
//! assert!(table.hand.is_none());
//! ```

pub mod actor;
pub mod config;
pub mod entities;
pub mod errors;
pub mod events;
pub mod hand;
pub mod manager;
pub mod messages;
pub mod seats;

pub use actor::{TableActor, TableHandle};
pub use config::{MAX_SEATS, MAX_STARTING_STACK, TableConfig, TableConfigError};
pub use entities::{
    Chips, EventKind, Hand, Identity, PlayerAction, PlayerState, Seat, SeatIndex, Street, Table,
    TableEvent, TableId, TableSnapshot, TableStatus, UserId,
};
pub use errors::{TableError, TableResult};
pub use hand::ActionOutcome;
pub use manager::TableManager;
pub use messages::TableMessage;
