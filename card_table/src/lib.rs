//! # Card Table
//!
//! Authoritative, in-memory engine for multiplayer card tables: seating,
//! turn order and the betting-round state machine of a hand, with every
//! change pushed to the table's viewers as a versioned snapshot.
//!
//! ## Core Modules
//!
//! - [`table`]: table state, seat and hand mutations, the per-table actor
//!   and the registry that creates tables on first reference
//! - [`net`]: client message envelopes, sessions, identity and the
//!   dispatcher a transport feeds raw frames into
//!
//! ## Example
//!
//! ```
//! use card_table::{Table, TableConfig};
//!
//! let table = Table::new("friday", &TableConfig::default());
//! assert_eq!(table.snapshot().version, 1);
//! ```

/// Client-facing message handling.
pub mod net;
pub use net::{
    connection::{Connection, ConnectionId},
    dispatcher::Dispatcher,
    identity::{DevIdentityProvider, IdentityProvider},
    messages::{ErrorCode, OutboundMessage},
    session::Session,
};

/// Table state, engine and actor runtime.
pub mod table;
pub use table::{
    Identity, PlayerAction, Table, TableConfig, TableError, TableHandle, TableManager,
    TableSnapshot,
};
