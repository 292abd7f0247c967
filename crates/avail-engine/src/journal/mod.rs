//! Durable event journal - write-ahead log for reaction events
//!
//! Ingestion always writes here first; the in-memory batch queue is just
//! the journal's pending set. This decouples event capture from store
//! availability: a failed flush leaves entries journaled and pending
//! instead of dropping the batch, and a restart replays the file to
//! rebuild the queue.
//!
//! Format: one JSON entry per line, append-only. After a successful flush
//! the file is compacted down to the still-pending entries via an atomic
//! temp-file rename.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use avail_core::{AvailabilityRecord, DomainError, FactKey, League, RepoResult};

use crate::queue::{PendingAdd, ReactionQueue};

/// One journaled reaction event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum JournalEntry {
    Add {
        league: League,
        record: AvailabilityRecord,
    },
    Remove {
        league: League,
        key: FactKey,
    },
}

/// Append-only JSON-lines journal
pub struct EventJournal {
    path: PathBuf,
    file: Mutex<File>,
}

impl EventJournal {
    /// Open (or create) the journal at the given path
    pub fn open(path: impl Into<PathBuf>) -> RepoResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(journal_error)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(journal_error)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Append one entry and flush it to disk
    pub fn append(&self, entry: &JournalEntry) -> RepoResult<()> {
        let line = serde_json::to_string(entry).map_err(journal_error)?;
        let mut file = self.file.lock();
        writeln!(file, "{line}").map_err(journal_error)?;
        file.flush().map_err(journal_error)?;
        Ok(())
    }

    /// Read every entry currently in the journal.
    ///
    /// Malformed lines (e.g. from an interrupted write) are skipped with a
    /// warning rather than poisoning the replay.
    pub fn replay(&self) -> RepoResult<Vec<JournalEntry>> {
        let _guard = self.file.lock();
        read_entries(&self.path)
    }

    /// Rewrite the journal to exactly the given pending entries.
    ///
    /// Writes a temp file alongside and renames it into place, so a crash
    /// mid-compact leaves either the old or the new journal, never a
    /// truncated one.
    pub fn compact(&self, pending: &[JournalEntry]) -> RepoResult<()> {
        let mut file = self.file.lock();

        let tmp_path = self.path.with_extension("tmp");
        {
            let tmp = File::create(&tmp_path).map_err(journal_error)?;
            let mut writer = BufWriter::new(tmp);
            for entry in pending {
                let line = serde_json::to_string(entry).map_err(journal_error)?;
                writeln!(writer, "{line}").map_err(journal_error)?;
            }
            writer.flush().map_err(journal_error)?;
        }
        std::fs::rename(&tmp_path, &self.path).map_err(journal_error)?;

        *file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(journal_error)?;

        debug!(entries = pending.len(), "journal compacted");
        Ok(())
    }

    /// Path of the journal file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_entries(path: &Path) -> RepoResult<Vec<JournalEntry>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(journal_error(e)),
    };

    let mut entries = Vec::new();
    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(journal_error)?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(entry) => entries.push(entry),
            Err(e) => warn!(line = number + 1, error = %e, "skipping malformed journal line"),
        }
    }
    Ok(entries)
}

fn journal_error(e: impl std::fmt::Display) -> DomainError {
    DomainError::JournalError(e.to_string())
}

/// Fold the journal into the queue at startup.
///
/// Adds become pending again; a Remove tombstone cancels the pending Add
/// with the same fact key (its store-side delete already ran, or will
/// self-correct on the next flush read). Returns the number of events
/// re-enqueued.
pub fn replay_into_queue(journal: &EventJournal, queue: &ReactionQueue) -> RepoResult<usize> {
    let entries = journal.replay()?;

    let mut pending: Vec<PendingAdd> = Vec::new();
    for entry in entries {
        match entry {
            JournalEntry::Add { league, record } => {
                pending.retain(|add| add.record.fact_key() != record.fact_key());
                pending.push(PendingAdd { league, record });
            }
            JournalEntry::Remove { key, .. } => {
                pending.retain(|add| add.record.fact_key() != key);
            }
        }
    }

    let count = pending.len();
    for add in pending {
        queue.enqueue(add);
    }
    Ok(count)
}
