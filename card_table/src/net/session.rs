//! Per-connection session state.

use super::connection::Connection;
use crate::table::entities::{Identity, TableId};

/// What the server remembers about one live connection.
#[derive(Clone, Debug)]
pub struct Session {
    pub(crate) connection: Connection,
    pub(crate) identity: Option<Identity>,
    pub(crate) table_id: Option<TableId>,
}

impl Session {
    pub fn new(connection: Connection) -> Self {
        Self {
            connection,
            identity: None,
            table_id: None,
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// The table this connection last joined.
    pub fn table_id(&self) -> Option<&str> {
        self.table_id.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}
