//! Versioning and audit events.
//!
//! Every externally visible mutation goes through [`Table::bump`], which is
//! the only place the version counter moves.

use chrono::Utc;
use uuid::Uuid;

use super::entities::{EventKind, Table, TableEvent};

/// Generates ids of the form `evt_1a2b3c4d`.
pub fn make_event_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("evt_{}", &hex[..8])
}

impl Table {
    /// Increments the version and replaces `last_event`.
    pub fn bump(&mut self, kind: EventKind, summary: impl Into<String>) {
        self.version += 1;
        self.last_event = Some(TableEvent {
            event_id: make_event_id(),
            at: Utc::now(),
            kind,
            summary: summary.into(),
        });
    }
}
