//! Tabular store client - the three-operation contract
//!
//! Every other component talks to the store exclusively through
//! [`TableStore`]: `read_all`, `append`, `delete`. Row indices are
//! 0-based positions within the data rows returned by `read_all`
//! (the header row is not counted).

mod http;
mod memory;

pub use http::HttpTableStore;
pub use memory::MemoryTableStore;

use async_trait::async_trait;
use thiserror::Error;

/// One data row: cells as strings, in header order
pub type Row = Vec<String>;

/// A whole-table read: the header plus every data row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub header: Row,
    pub rows: Vec<Row>,
}

impl Table {
    /// Create a table from a header and data rows
    #[must_use]
    pub fn new(header: Row, rows: Vec<Row>) -> Self {
        Self { header, rows }
    }

    /// Number of data rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check whether the table has no data rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Store client errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// Network failure, rate limit, or server-side hiccup; retryable
    #[error("transient store failure: {0}")]
    Transient(String),

    #[error("row index out of range: {0}")]
    IndexOutOfRange(usize),

    #[error("store request failed: {0}")]
    Request(String),
}

/// Result type for store client operations
pub type StoreResult<T> = Result<T, StoreError>;

/// The backing store contract: whole-table read, batched append,
/// delete-by-row-index. Nothing else is available.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Read the entire table, header included
    async fn read_all(&self, table: &str) -> StoreResult<Table>;

    /// Append rows in one batched write
    async fn append(&self, table: &str, rows: &[Row]) -> StoreResult<()>;

    /// Delete the data rows at the given indices (0-based, header
    /// excluded, relative to the most recent `read_all`)
    async fn delete(&self, table: &str, row_indices: &[usize]) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_len() {
        let table = Table::new(
            vec!["A".to_string(), "B".to_string()],
            vec![vec!["1".to_string(), "2".to_string()]],
        );
        assert_eq!(table.len(), 1);
        assert!(!table.is_empty());
        assert!(Table::default().is_empty());
    }
}
