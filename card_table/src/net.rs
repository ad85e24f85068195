//! Client-facing side of the core.
//!
//! The engine never touches a socket. A transport hands each connection a
//! [`Connection`](connection::Connection) (an id plus an outbound channel)
//! and feeds raw text frames to the [`Dispatcher`](dispatcher::Dispatcher).

/// Connection ids and the outbound delivery capability.
pub mod connection;

/// Routes inbound envelopes to tables.
pub mod dispatcher;

/// Parse, delivery and dispatch error types.
pub mod errors;

/// Identity resolution seam for the session layer.
pub mod identity;

/// Inbound and outbound message envelopes.
pub mod messages;

/// Per-connection session state.
pub mod session;
