//! Flush task - periodic batched drain of the queue into the store
//!
//! Drain algorithm (per flush):
//! 1. pop the whole queued batch (deduplicated by fact key);
//! 2. per league: read current store state once, discard events whose
//!    fact already has a persisted row, append the remainder in one
//!    batched write;
//! 3. a failed league append restores its events to the queue (they stay
//!    journaled), to be retried on the next drain;
//! 4. removals that arrived while the append was in flight are re-applied
//!    against anything just appended, and cancel any restored Add they
//!    out-sequence;
//! 5. the journal is compacted down to the still-pending set.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use avail_core::{FactKey, League, RecordRepository, RepoResult};

use crate::journal::{EventJournal, JournalEntry};

use super::{PendingAdd, QueuedAdd, ReactionQueue};

/// Outcome counters for one flush pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Rows appended to the store
    pub appended: usize,
    /// Events dropped because their fact was already persisted
    pub skipped_persisted: usize,
    /// Events restored to the queue after a failed append
    pub restored: usize,
    /// Mid-flight removals re-applied after the append
    pub removals_reapplied: usize,
}

/// Drains the queue into the record store on demand or on a timer
pub struct Flusher {
    queue: Arc<ReactionQueue>,
    journal: Arc<EventJournal>,
    records: Arc<dyn RecordRepository>,
    // Serializes overlapping flush triggers (timer + explicit calls)
    gate: tokio::sync::Mutex<()>,
}

impl Flusher {
    /// Create a flusher over the shared queue, journal, and record store
    pub fn new(
        queue: Arc<ReactionQueue>,
        journal: Arc<EventJournal>,
        records: Arc<dyn RecordRepository>,
    ) -> Self {
        Self {
            queue,
            journal,
            records,
            gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Run one flush pass. Never propagates store failures: affected
    /// events are restored to the queue and retried on the next pass.
    #[instrument(skip(self))]
    pub async fn flush_once(&self) -> FlushReport {
        let _guard = self.gate.lock().await;
        let mut report = FlushReport::default();

        let batch = self.queue.drain();
        if batch.is_empty() {
            self.compact_journal();
            return report;
        }
        debug!(batch = batch.len(), "flushing queued adds");

        // Group by league so each league's table is read and written once
        let mut by_league: HashMap<League, Vec<QueuedAdd>> = HashMap::new();
        for entry in batch {
            by_league.entry(entry.add.league.clone()).or_default().push(entry);
        }

        let mut appended: HashMap<FactKey, League> = HashMap::new();
        for (league, entries) in by_league {
            match self.flush_league(&league, &entries).await {
                Ok(outcome) => {
                    report.appended += outcome.appended.len();
                    report.skipped_persisted += outcome.skipped;
                    for key in outcome.appended {
                        appended.insert(key, league.clone());
                    }
                }
                Err(e) => {
                    warn!(league = %league, error = %e, "flush failed; restoring batch");
                    report.restored += entries.len();
                    for entry in entries {
                        self.queue.restore(entry);
                    }
                }
            }
        }

        // Removals that landed while the append was in flight: the
        // listener's own delete ran before the row existed, so re-apply
        // it now, and cancel any restored Add the removal out-sequences.
        for (key, stamp) in self.queue.take_removed() {
            if let Some(league) = appended.get(&key) {
                match self.records.delete_by_key(league, &key).await {
                    Ok(true) => report.removals_reapplied += 1,
                    Ok(false) => {}
                    Err(e) => warn!(key = %key, error = %e, "failed to re-apply removal"),
                }
            }
            self.queue.cancel_if_older(&key, stamp);
        }

        self.compact_journal();

        if report != FlushReport::default() {
            info!(
                appended = report.appended,
                skipped = report.skipped_persisted,
                restored = report.restored,
                removals = report.removals_reapplied,
                "flush complete"
            );
        }
        report
    }

    /// Flush one league's events: read once, skip persisted facts, append
    /// the rest in one batched write.
    async fn flush_league(
        &self,
        league: &League,
        entries: &[QueuedAdd],
    ) -> RepoResult<LeagueOutcome> {
        let existing = self.records.find_by_league(league).await?;
        let persisted: std::collections::HashSet<FactKey> =
            existing.iter().map(|r| r.fact_key()).collect();

        let mut survivors: Vec<&PendingAdd> = Vec::with_capacity(entries.len());
        let mut skipped = 0;
        for entry in entries {
            if persisted.contains(&entry.add.fact_key()) {
                skipped += 1;
            } else {
                survivors.push(&entry.add);
            }
        }

        if !survivors.is_empty() {
            let records: Vec<_> = survivors.iter().map(|add| add.record.clone()).collect();
            self.records.create_batch(league, &records).await?;
        }

        Ok(LeagueOutcome {
            appended: survivors.iter().map(|add| add.fact_key()).collect(),
            skipped,
        })
    }

    /// Rewrite the journal to match the still-pending set
    fn compact_journal(&self) {
        let entries: Vec<JournalEntry> = self
            .queue
            .snapshot()
            .into_iter()
            .map(|add| JournalEntry::Add {
                league: add.league.clone(),
                record: add.record,
            })
            .collect();
        if let Err(e) = self.journal.compact(&entries) {
            warn!(error = %e, "journal compaction failed");
        }
    }
}

struct LeagueOutcome {
    appended: Vec<FactKey>,
    skipped: usize,
}

/// Spawn the periodic flush task. Errors are logged, never fatal; the
/// task runs until the handle is aborted.
pub fn spawn_flush_task(flusher: Arc<Flusher>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick fires immediately; skip it so startup replay
        // settles before the first drain.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let report = flusher.flush_once().await;
            if report.restored > 0 {
                error!(restored = report.restored, "flush left events pending");
            }
        }
    })
}
