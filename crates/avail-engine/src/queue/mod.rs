//! Dedup & batch queue - the in-memory pending set
//!
//! One lock guards everything the listener and the flush task share. The
//! pending map is keyed by fact key, so duplicate Adds collapse on entry
//! (latest wins) and a Remove can cancel a queued Add before it ever
//! reaches the store.
//!
//! Every mutation is stamped from a single monotonic sequence. Removal
//! markers carry their stamp so the flusher can order a Remove against an
//! Add that was already drained or restored: a marker newer than the Add
//! wins (the fact ends Absent), a marker older than the Add loses (the
//! user re-added after removing). This is what keeps per-fact transitions
//! linearizable across an in-flight flush.

mod flush;

pub use flush::{spawn_flush_task, FlushReport, Flusher};

use parking_lot::Mutex;
use std::collections::HashMap;

use avail_core::{AvailabilityRecord, FactKey, League};

/// A queued Add waiting for the next flush
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAdd {
    pub league: League,
    pub record: AvailabilityRecord,
}

impl PendingAdd {
    /// The identity tuple of the queued fact
    #[must_use]
    pub fn fact_key(&self) -> FactKey {
        self.record.fact_key()
    }
}

/// A drained Add together with its queue sequence stamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedAdd {
    pub seq: u64,
    pub add: PendingAdd,
}

#[derive(Debug, Default)]
struct QueueState {
    seq: u64,
    pending: HashMap<FactKey, QueuedAdd>,
    removed: HashMap<FactKey, u64>,
}

impl QueueState {
    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }
}

/// Single-lock dedup & batch queue
#[derive(Debug, Default)]
pub struct ReactionQueue {
    state: Mutex<QueueState>,
}

impl ReactionQueue {
    /// Create an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an Add; a pending Add for the same fact key is replaced
    /// (the latest event wins).
    pub fn enqueue(&self, add: PendingAdd) {
        let mut state = self.state.lock();
        let seq = state.next_seq();
        state.pending.insert(add.fact_key(), QueuedAdd { seq, add });
    }

    /// Cancel a queued Add for the given fact key, if present.
    /// Returns true when something was cancelled.
    pub fn cancel(&self, key: &FactKey) -> bool {
        self.state.lock().pending.remove(key).is_some()
    }

    /// Record that a Remove was applied for this key. The flusher orders
    /// this marker against the batch it has in flight, so a Remove racing
    /// an append still wins.
    pub fn mark_removed(&self, key: FactKey) {
        let mut state = self.state.lock();
        let seq = state.next_seq();
        state.removed.insert(key, seq);
    }

    /// Pop the whole pending batch, already deduplicated by fact key.
    ///
    /// Markers present at drain time are cleared: their removes were fully
    /// applied on the listener path (cancel + immediate store delete)
    /// before the marker was set. Only markers set after a drain matter to
    /// the flusher.
    pub fn drain(&self) -> Vec<QueuedAdd> {
        let mut state = self.state.lock();
        let entries: Vec<QueuedAdd> = state.pending.drain().map(|(_, e)| e).collect();
        state.removed.clear();
        entries
    }

    /// Put a drained Add back with its original stamp (flush failure
    /// path). A newer pending Add for the same key wins over the restore.
    pub fn restore(&self, entry: QueuedAdd) {
        let mut state = self.state.lock();
        let key = entry.add.fact_key();
        match state.pending.get(&key) {
            Some(existing) if existing.seq >= entry.seq => {}
            _ => {
                state.pending.insert(key, entry);
            }
        }
    }

    /// Take and clear the accumulated removal markers with their stamps
    pub fn take_removed(&self) -> HashMap<FactKey, u64> {
        std::mem::take(&mut self.state.lock().removed)
    }

    /// Cancel a pending Add only if it is older than the given stamp.
    /// Returns true when something was cancelled.
    pub fn cancel_if_older(&self, key: &FactKey, seq: u64) -> bool {
        let mut state = self.state.lock();
        match state.pending.get(key) {
            Some(existing) if existing.seq < seq => {
                state.pending.remove(key);
                true
            }
            _ => false,
        }
    }

    /// Snapshot the pending batch without draining it
    #[must_use]
    pub fn snapshot(&self) -> Vec<PendingAdd> {
        self.state
            .lock()
            .pending
            .values()
            .map(|e| e.add.clone())
            .collect()
    }

    /// Number of queued Adds
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Check whether no Adds are queued
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
