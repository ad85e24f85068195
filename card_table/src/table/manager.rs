//! Table registry: spawns table actors on first reference and routes
//! subscriptions to them.

use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{
    actor::{TableActor, TableHandle},
    config::TableConfig,
    entities::{TableId, TableSnapshot},
    errors::TableResult,
};
use crate::net::connection::{Connection, ConnectionId};

/// Table manager for managing multiple table instances
pub struct TableManager {
    /// Configuration applied to every new table
    config: TableConfig,

    /// Active table handles
    tables: RwLock<HashMap<TableId, TableHandle>>,
}

impl TableManager {
    pub fn new(config: TableConfig) -> Self {
        Self {
            config,
            tables: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the table with this id, spawning it if it doesn't exist yet
    /// or its actor has stopped.
    ///
    /// Concurrent first references to the same id observe a single table.
    pub async fn resolve_or_create(&self, table_id: &str) -> TableHandle {
        if let Some(handle) = self.tables.read().await.get(table_id)
            && !handle.is_closed()
        {
            return handle.clone();
        }

        let mut tables = self.tables.write().await;
        if let Some(handle) = tables.get(table_id) {
            if !handle.is_closed() {
                return handle.clone();
            }
            log::warn!("Table {table_id}: actor stopped, replacing it");
        }

        let (actor, handle) = TableActor::new(table_id, &self.config);
        tokio::spawn(actor.run());
        tables.insert(table_id.to_string(), handle.clone());

        log::info!("Created table {} '{}'", table_id, self.config.name);
        handle
    }

    pub async fn get_table(&self, table_id: &str) -> Option<TableHandle> {
        self.tables.read().await.get(table_id).cloned()
    }

    /// Adds a subscriber to the table, creating the table if needed.
    pub async fn subscribe(&self, table_id: &str, connection: Connection) -> TableResult<()> {
        self.resolve_or_create(table_id)
            .await
            .subscribe(connection)
            .await
    }

    /// Removes a subscriber. Unknown tables are ignored.
    pub async fn unsubscribe(&self, table_id: &str, connection_id: ConnectionId) -> TableResult<()> {
        match self.get_table(table_id).await {
            Some(handle) => handle.unsubscribe(connection_id).await,
            None => Ok(()),
        }
    }

    pub async fn snapshot(&self, table_id: &str) -> Option<TableSnapshot> {
        let handle = self.get_table(table_id).await?;
        handle.snapshot().await.ok()
    }

    pub async fn table_count(&self) -> usize {
        self.tables.read().await.len()
    }

    /// Closes every table. Later references create fresh tables.
    pub async fn shutdown(&self) {
        let handles: Vec<_> = self.tables.write().await.drain().map(|(_, h)| h).collect();
        for handle in &handles {
            if let Err(e) = handle.close().await {
                log::debug!("Table {} already closed: {}", handle.table_id(), e);
            }
        }
        log::info!("Closed {} tables", handles.len());
    }
}

impl Default for TableManager {
    fn default() -> Self {
        Self::new(TableConfig::default())
    }
}
