//! Poll index - in-memory classification of message ids
//!
//! The listener must decide for every raw signal whether its message is a
//! tracked poll, without a store round trip. The index caches the poll
//! table keyed by message id and is refreshed explicitly after poll writes
//! and implicitly once its TTL lapses. Message ids are reused across
//! posting cycles, so a refresh fully replaces the map - retired entries
//! never linger.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

use avail_core::{League, PollRepository, RepoResult, Snowflake, Weekday};

/// Classified poll context for one tracked message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollEntry {
    pub league: League,
    pub channel_id: Snowflake,
    pub day: Weekday,
    pub day_label: String,
}

#[derive(Debug, Default)]
struct IndexState {
    by_message: HashMap<Snowflake, PollEntry>,
    loaded_at: Option<Instant>,
}

/// Injected poll index with an explicit load/refresh lifecycle
pub struct PollIndex {
    polls: Arc<dyn PollRepository>,
    ttl: Duration,
    state: RwLock<IndexState>,
}

impl PollIndex {
    /// Create an index over the poll repository; it starts unloaded and
    /// loads on first use (or an explicit `refresh`).
    pub fn new(polls: Arc<dyn PollRepository>, ttl: Duration) -> Self {
        Self {
            polls,
            ttl,
            state: RwLock::new(IndexState::default()),
        }
    }

    /// Classify a message id against the current poll set, refreshing
    /// first if the cached view is stale.
    pub async fn lookup(&self, message_id: Snowflake) -> RepoResult<Option<PollEntry>> {
        if self.is_stale() {
            self.refresh().await?;
        }
        Ok(self.state.read().by_message.get(&message_id).cloned())
    }

    /// Reload the whole index from the poll repository, replacing the map
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> RepoResult<()> {
        let polls = self.polls.find_all().await?;

        let mut by_message = HashMap::with_capacity(polls.len());
        for poll in polls {
            let Some(day) = poll.weekday() else {
                warn!(message_id = %poll.message_id, label = %poll.day_label, "poll label has no weekday; skipping");
                continue;
            };
            by_message.insert(
                poll.message_id,
                PollEntry {
                    league: poll.league,
                    channel_id: poll.channel_id,
                    day,
                    day_label: poll.day_label,
                },
            );
        }

        debug!(entries = by_message.len(), "poll index refreshed");
        let mut state = self.state.write();
        state.by_message = by_message;
        state.loaded_at = Some(Instant::now());
        Ok(())
    }

    /// Force the next lookup to reload
    pub fn invalidate(&self) {
        self.state.write().loaded_at = None;
    }

    /// Number of tracked messages currently cached
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().by_message.len()
    }

    /// Check whether no messages are currently tracked
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_stale(&self) -> bool {
        match self.state.read().loaded_at {
            Some(loaded_at) => loaded_at.elapsed() >= self.ttl,
            None => true,
        }
    }
}
