//! In-memory table store for tests and local development

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use super::{Row, StoreError, StoreResult, Table, TableStore};

/// In-memory implementation of [`TableStore`]
///
/// Tables must be created up front with [`MemoryTableStore::create_table`];
/// reads of unknown tables fail the same way the HTTP client does.
#[derive(Debug, Default)]
pub struct MemoryTableStore {
    tables: Mutex<HashMap<String, Table>>,
}

impl MemoryTableStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or reset) a table with the given header
    pub fn create_table(&self, name: &str, header: &[&str]) {
        let header: Row = header.iter().map(ToString::to_string).collect();
        self.tables
            .lock()
            .insert(name.to_string(), Table::new(header, Vec::new()));
    }

    /// Current number of data rows in a table (test helper)
    #[must_use]
    pub fn row_count(&self, name: &str) -> usize {
        self.tables.lock().get(name).map_or(0, Table::len)
    }
}

#[async_trait]
impl TableStore for MemoryTableStore {
    async fn read_all(&self, table: &str) -> StoreResult<Table> {
        self.tables
            .lock()
            .get(table)
            .cloned()
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))
    }

    async fn append(&self, table: &str, rows: &[Row]) -> StoreResult<()> {
        let mut tables = self.tables.lock();
        let entry = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        entry.rows.extend(rows.iter().cloned());
        Ok(())
    }

    async fn delete(&self, table: &str, row_indices: &[usize]) -> StoreResult<()> {
        let mut tables = self.tables.lock();
        let entry = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;

        if let Some(&max) = row_indices.iter().max() {
            if max >= entry.rows.len() {
                return Err(StoreError::IndexOutOfRange(max));
            }
        }

        // Remove highest-first so earlier indices stay valid
        let mut sorted: Vec<usize> = row_indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        for index in sorted.into_iter().rev() {
            entry.rows.remove(index);
        }
        Ok(())
    }
}
