//! Tabular-store implementation of PollRepository
//!
//! The poll index table has no query pushdown: every lookup is a full read
//! filtered in memory, and deletes are computed as row-index sets from the
//! same read.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{instrument, warn};

use avail_core::{AvailabilityPoll, League, PollRepository, RepoResult, Snowflake};

use crate::client::TableStore;
use crate::models::{parse_poll, poll_to_row};

use super::error::map_store_error;

/// Poll index repository backed by the tabular store
#[derive(Clone)]
pub struct SheetPollRepository {
    store: Arc<dyn TableStore>,
    table: String,
}

impl SheetPollRepository {
    /// Create a repository over the given polls table
    pub fn new(store: Arc<dyn TableStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    /// Read and parse the whole table, skipping malformed rows.
    ///
    /// Returned entries are paired with their data-row index so delete
    /// paths can address them.
    async fn read_indexed(&self) -> RepoResult<Vec<(usize, AvailabilityPoll)>> {
        let table = self
            .store
            .read_all(&self.table)
            .await
            .map_err(map_store_error)?;

        let mut polls = Vec::with_capacity(table.rows.len());
        for (index, row) in table.rows.iter().enumerate() {
            match parse_poll(row) {
                Ok(poll) => polls.push((index, poll)),
                Err(e) => warn!(table = %self.table, index, error = %e, "skipping malformed poll row"),
            }
        }
        Ok(polls)
    }
}

#[async_trait]
impl PollRepository for SheetPollRepository {
    #[instrument(skip(self))]
    async fn find_all(&self) -> RepoResult<Vec<AvailabilityPoll>> {
        Ok(self.read_indexed().await?.into_iter().map(|(_, p)| p).collect())
    }

    #[instrument(skip(self))]
    async fn find_by_league_channel(
        &self,
        league: &League,
        channel_id: Snowflake,
    ) -> RepoResult<Vec<AvailabilityPoll>> {
        Ok(self
            .read_indexed()
            .await?
            .into_iter()
            .map(|(_, p)| p)
            .filter(|p| &p.league == league && p.channel_id == channel_id)
            .collect())
    }

    #[instrument(skip(self, polls), fields(count = polls.len()))]
    async fn create_batch(&self, polls: &[AvailabilityPoll]) -> RepoResult<()> {
        if polls.is_empty() {
            return Ok(());
        }
        let rows: Vec<_> = polls.iter().map(poll_to_row).collect();
        self.store
            .append(&self.table, &rows)
            .await
            .map_err(map_store_error)
    }

    #[instrument(skip(self))]
    async fn delete_by_league_channel(
        &self,
        league: &League,
        channel_id: Snowflake,
    ) -> RepoResult<u64> {
        // Absent table means nothing to delete: the delete path is
        // re-runnable and converges.
        let indexed = match self.read_indexed().await {
            Ok(indexed) => indexed,
            Err(e) if e.is_not_found() => return Ok(0),
            Err(e) => return Err(e),
        };

        let indices: Vec<usize> = indexed
            .iter()
            .filter(|(_, p)| &p.league == league && p.channel_id == channel_id)
            .map(|(index, _)| *index)
            .collect();

        if indices.is_empty() {
            return Ok(0);
        }

        self.store
            .delete(&self.table, &indices)
            .await
            .map_err(map_store_error)?;
        Ok(indices.len() as u64)
    }
}
