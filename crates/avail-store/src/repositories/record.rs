//! Tabular-store implementation of RecordRepository
//!
//! Each league maps to its own records table. As with polls, every lookup
//! is a whole-table read filtered in memory; deletes are row-index sets
//! computed from the same read and issued as one batched call.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{instrument, warn};

use avail_core::{
    AvailabilityRecord, DomainError, FactKey, League, RecordRepository, RepoResult, Snowflake,
};

use crate::client::TableStore;
use crate::models::{parse_record, record_to_row};

use super::error::map_store_error;

/// Per-league availability records repository backed by the tabular store
#[derive(Clone)]
pub struct SheetRecordRepository {
    store: Arc<dyn TableStore>,
    /// League name -> records table name
    tables: BTreeMap<String, String>,
}

impl SheetRecordRepository {
    /// Create a repository over the league -> table mapping
    pub fn new(store: Arc<dyn TableStore>, tables: BTreeMap<String, String>) -> Self {
        Self { store, tables }
    }

    fn table_for(&self, league: &League) -> RepoResult<&str> {
        self.tables
            .get(league.as_str())
            .map(String::as_str)
            .ok_or_else(|| DomainError::UnknownLeague(league.to_string()))
    }

    async fn read_indexed(
        &self,
        league: &League,
    ) -> RepoResult<Vec<(usize, AvailabilityRecord)>> {
        let table_name = self.table_for(league)?;
        let table = self
            .store
            .read_all(table_name)
            .await
            .map_err(map_store_error)?;

        let mut records = Vec::with_capacity(table.rows.len());
        for (index, row) in table.rows.iter().enumerate() {
            match parse_record(row) {
                Ok(record) => records.push((index, record)),
                Err(e) => {
                    warn!(table = table_name, index, error = %e, "skipping malformed record row");
                }
            }
        }
        Ok(records)
    }
}

#[async_trait]
impl RecordRepository for SheetRecordRepository {
    #[instrument(skip(self))]
    async fn find_by_league(&self, league: &League) -> RepoResult<Vec<AvailabilityRecord>> {
        Ok(self
            .read_indexed(league)
            .await?
            .into_iter()
            .map(|(_, r)| r)
            .collect())
    }

    #[instrument(skip(self, records), fields(count = records.len()))]
    async fn create_batch(
        &self,
        league: &League,
        records: &[AvailabilityRecord],
    ) -> RepoResult<()> {
        if records.is_empty() {
            return Ok(());
        }
        let table_name = self.table_for(league)?;
        let rows: Vec<_> = records.iter().map(record_to_row).collect();
        self.store
            .append(table_name, &rows)
            .await
            .map_err(map_store_error)
    }

    #[instrument(skip(self))]
    async fn delete_by_key(&self, league: &League, key: &FactKey) -> RepoResult<bool> {
        let indexed = match self.read_indexed(league).await {
            Ok(indexed) => indexed,
            Err(e) if e.is_not_found() => return Ok(false),
            Err(e) => return Err(e),
        };

        // One row per key is the invariant; duplicates observed here are
        // collapsed by deleting every match.
        let indices: Vec<usize> = indexed
            .iter()
            .filter(|(_, r)| &r.fact_key() == key)
            .map(|(index, _)| *index)
            .collect();

        if indices.is_empty() {
            return Ok(false);
        }
        if indices.len() > 1 {
            warn!(league = %league, key = %key, count = indices.len(), "duplicate rows for one fact");
        }

        let table_name = self.table_for(league)?;
        self.store
            .delete(table_name, &indices)
            .await
            .map_err(map_store_error)?;
        Ok(true)
    }

    #[instrument(skip(self, message_ids), fields(count = message_ids.len()))]
    async fn delete_by_messages(
        &self,
        league: &League,
        message_ids: &[Snowflake],
    ) -> RepoResult<u64> {
        if message_ids.is_empty() {
            return Ok(0);
        }
        let wanted: HashSet<Snowflake> = message_ids.iter().copied().collect();

        let indexed = match self.read_indexed(league).await {
            Ok(indexed) => indexed,
            Err(e) if e.is_not_found() => return Ok(0),
            Err(e) => return Err(e),
        };

        let indices: Vec<usize> = indexed
            .iter()
            .filter(|(_, r)| wanted.contains(&r.message_id) && &r.league == league)
            .map(|(index, _)| *index)
            .collect();

        if indices.is_empty() {
            return Ok(0);
        }

        let table_name = self.table_for(league)?;
        self.store
            .delete(table_name, &indices)
            .await
            .map_err(map_store_error)?;
        Ok(indices.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SheetRecordRepository>();
    }
}
