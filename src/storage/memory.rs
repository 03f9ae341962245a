//! In-process result store

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::store::{CheckRecord, ResultStore, StorageError, Table};

/// Result store kept in memory. Appending before `initialize` fails, the
/// same way inserting into a missing SQL table does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<Table, Vec<CheckRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Row count of a table, zero if it does not exist
    pub fn len(&self, table: Table) -> usize {
        self.tables.read().get(&table).map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self, table: Table) -> bool {
        self.len(table) == 0
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn initialize(&self) -> Result<(), StorageError> {
        let mut tables = self.tables.write();
        for table in Table::ALL {
            tables.entry(table).or_default();
        }
        Ok(())
    }

    async fn append(&self, table: Table, record: &CheckRecord) -> Result<(), StorageError> {
        let mut tables = self.tables.write();
        let rows = tables
            .get_mut(&table)
            .ok_or(StorageError::TableNotInitialized(table))?;
        rows.push(record.clone());
        Ok(())
    }

    async fn records(&self, table: Table) -> Result<Vec<CheckRecord>, StorageError> {
        let tables = self.tables.read();
        tables
            .get(&table)
            .cloned()
            .ok_or(StorageError::TableNotInitialized(table))
    }
}
