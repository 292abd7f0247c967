//! Reaction event listener
//!
//! Classifies raw gateway signals against the poll index and turns them
//! into engine transitions. The Add path only touches the journal and the
//! in-memory queue; the Remove path cancels any queued Add and deletes the
//! persisted row immediately - removals are never batched, because a
//! user's "no longer available" signal must take effect promptly.

use tracing::{debug, error, instrument, warn};

use avail_core::{
    canonical_emoji, AvailabilityEvent, AvailabilityRecord, ReactionKind, RepoResult,
};

use crate::dto::InboundReaction;
use crate::journal::JournalEntry;
use crate::queue::PendingAdd;

use super::context::EngineContext;

/// What the listener did with a raw signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenOutcome {
    /// Self-originated or bot-originated signal
    IgnoredBot,
    /// Emoji is not a recognized time slot
    IgnoredEmoji,
    /// Message is not a tracked poll
    UnknownMessage,
    /// Add journaled and queued for the next flush
    Queued,
    /// Remove applied immediately
    Removed {
        cancelled_queued: bool,
        deleted_persisted: bool,
    },
}

/// Reaction listener service
pub struct ListenerService<'a> {
    ctx: &'a EngineContext,
}

impl<'a> ListenerService<'a> {
    /// Create a new ListenerService
    pub fn new(ctx: &'a EngineContext) -> Self {
        Self { ctx }
    }

    /// Event-loop entry point: classification errors are logged, never
    /// propagated, so a bad signal cannot take the loop down.
    pub async fn on_event(&self, raw: InboundReaction) {
        match self.process(raw).await {
            Ok(outcome) => debug!(?outcome, "reaction processed"),
            Err(e) => error!(error = %e, "reaction processing failed"),
        }
    }

    /// Classify and apply one raw reaction signal
    #[instrument(skip(self, raw), fields(user = %raw.user_id, message = %raw.message_id))]
    pub async fn process(&self, raw: InboundReaction) -> RepoResult<ListenOutcome> {
        if raw.is_bot || raw.user_id == self.ctx.bot_user_id() {
            return Ok(ListenOutcome::IgnoredBot);
        }

        let emoji = canonical_emoji(&raw.emoji_name);
        if !self.ctx.slots().contains(&emoji) {
            return Ok(ListenOutcome::IgnoredEmoji);
        }

        let Some(entry) = self.ctx.index().lookup(raw.message_id).await? else {
            return Ok(ListenOutcome::UnknownMessage);
        };

        let event = AvailabilityEvent::new(
            raw.kind.into(),
            raw.user_id,
            raw.display_name(),
            emoji,
            raw.message_id,
        );

        match event.kind {
            ReactionKind::Add => {
                let record =
                    AvailabilityRecord::from_event(&event, entry.day, entry.league.clone());

                // Journal first; capture proceeds even if the disk write
                // fails, the fact just loses crash durability.
                let journaled = JournalEntry::Add {
                    league: entry.league.clone(),
                    record: record.clone(),
                };
                if let Err(e) = self.ctx.journal().append(&journaled) {
                    warn!(error = %e, "journal append failed for add");
                }

                self.ctx.queue().enqueue(PendingAdd {
                    league: entry.league,
                    record,
                });
                Ok(ListenOutcome::Queued)
            }
            ReactionKind::Remove => {
                let key = event.fact_key();

                // Cancel a queued Add so it cannot win a race against this
                // remove, then mark for the flusher before touching the store.
                let cancelled_queued = self.ctx.queue().cancel(&key);
                self.ctx.queue().mark_removed(key.clone());

                let journaled = JournalEntry::Remove {
                    league: entry.league.clone(),
                    key: key.clone(),
                };
                if let Err(e) = self.ctx.journal().append(&journaled) {
                    warn!(error = %e, "journal append failed for remove");
                }

                let deleted_persisted =
                    self.ctx.records().delete_by_key(&entry.league, &key).await?;
                Ok(ListenOutcome::Removed {
                    cancelled_queued,
                    deleted_persisted,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    // Listener behavior is covered end-to-end in the workspace
    // integration tests, which run it against the in-memory store.
}
