//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs; the store adapter provides the
//! implementation. The backing store offers only whole-table read, batched
//! append, and delete-by-row-index, so implementations filter in memory
//! and batch their writes.

use async_trait::async_trait;

use crate::entities::{AvailabilityPoll, AvailabilityRecord};
use crate::error::DomainError;
use crate::value_objects::{FactKey, League, Snowflake};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Poll Repository (the poll index table)
// ============================================================================

#[async_trait]
pub trait PollRepository: Send + Sync {
    /// All tracked polls across every league and channel
    async fn find_all(&self) -> RepoResult<Vec<AvailabilityPoll>>;

    /// Polls for one (league, channel) pair
    async fn find_by_league_channel(
        &self,
        league: &League,
        channel_id: Snowflake,
    ) -> RepoResult<Vec<AvailabilityPoll>>;

    /// Write a full posting cycle in one batched append
    async fn create_batch(&self, polls: &[AvailabilityPoll]) -> RepoResult<()>;

    /// Delete all polls for one (league, channel) pair; returns the count.
    /// Absent rows are not an error.
    async fn delete_by_league_channel(
        &self,
        league: &League,
        channel_id: Snowflake,
    ) -> RepoResult<u64>;
}

// ============================================================================
// Record Repository (per-league availability tables)
// ============================================================================

#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// All persisted records for a league
    async fn find_by_league(&self, league: &League) -> RepoResult<Vec<AvailabilityRecord>>;

    /// Append records in one batched write
    async fn create_batch(
        &self,
        league: &League,
        records: &[AvailabilityRecord],
    ) -> RepoResult<()>;

    /// Delete the record matching a fact key, if present.
    /// Returns true when a row was deleted; absence is a no-op.
    async fn delete_by_key(&self, league: &League, key: &FactKey) -> RepoResult<bool>;

    /// Delete every record whose message_id is in the given set, in one
    /// batched delete; returns the count. Absent rows are not an error.
    async fn delete_by_messages(
        &self,
        league: &League,
        message_ids: &[Snowflake],
    ) -> RepoResult<u64>;
}
