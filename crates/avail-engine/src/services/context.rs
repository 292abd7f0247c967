//! Engine context - dependency container for services
//!
//! Holds the repositories, outbound ports, poll index, queue, and journal
//! shared by every service. Built once at startup and cloned cheaply.

use std::sync::Arc;

use avail_core::{
    ChatPort, ConfirmPrompt, DomainError, League, PollRepository, RecordRepository, RepoResult,
    SlotOrder, Snowflake,
};

use crate::index::PollIndex;
use crate::journal::EventJournal;
use crate::queue::ReactionQueue;

/// Dependency container for the engine services
#[derive(Clone)]
pub struct EngineContext {
    polls: Arc<dyn PollRepository>,
    records: Arc<dyn RecordRepository>,
    chat: Arc<dyn ChatPort>,
    confirm: Arc<dyn ConfirmPrompt>,
    index: Arc<PollIndex>,
    queue: Arc<ReactionQueue>,
    journal: Arc<EventJournal>,
    slots: SlotOrder,
    leagues: Vec<League>,
    bot_user_id: Snowflake,
}

impl EngineContext {
    /// Start building a context
    #[must_use]
    pub fn builder() -> EngineContextBuilder {
        EngineContextBuilder::default()
    }

    /// Get the poll repository
    pub fn polls(&self) -> &dyn PollRepository {
        self.polls.as_ref()
    }

    /// Get the record repository
    pub fn records(&self) -> &dyn RecordRepository {
        self.records.as_ref()
    }

    /// Get the record repository as a shareable handle
    pub fn records_arc(&self) -> Arc<dyn RecordRepository> {
        self.records.clone()
    }

    /// Get the message-surface port
    pub fn chat(&self) -> &dyn ChatPort {
        self.chat.as_ref()
    }

    /// Get the confirmation port
    pub fn confirm(&self) -> &dyn ConfirmPrompt {
        self.confirm.as_ref()
    }

    /// Get the poll index
    pub fn index(&self) -> &PollIndex {
        self.index.as_ref()
    }

    /// Get the dedup & batch queue
    pub fn queue(&self) -> &ReactionQueue {
        self.queue.as_ref()
    }

    /// Get the queue as a shareable handle
    pub fn queue_arc(&self) -> Arc<ReactionQueue> {
        self.queue.clone()
    }

    /// Get the durable event journal
    pub fn journal(&self) -> &EventJournal {
        self.journal.as_ref()
    }

    /// Get the journal as a shareable handle
    pub fn journal_arc(&self) -> Arc<EventJournal> {
        self.journal.clone()
    }

    /// Canonical slot ordering
    pub fn slots(&self) -> &SlotOrder {
        &self.slots
    }

    /// Configured leagues
    pub fn leagues(&self) -> &[League] {
        &self.leagues
    }

    /// The bot's own user id (its reactions are ignored)
    pub fn bot_user_id(&self) -> Snowflake {
        self.bot_user_id
    }

    /// Reject operations against leagues that are not configured
    pub fn require_league(&self, league: &League) -> RepoResult<()> {
        if self.leagues.contains(league) {
            Ok(())
        } else {
            Err(DomainError::UnknownLeague(league.to_string()))
        }
    }
}

impl std::fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineContext")
            .field("leagues", &self.leagues)
            .field("slots", &self.slots)
            .field("bot_user_id", &self.bot_user_id)
            .finish()
    }
}

/// Builder for creating an EngineContext
#[derive(Default)]
pub struct EngineContextBuilder {
    polls: Option<Arc<dyn PollRepository>>,
    records: Option<Arc<dyn RecordRepository>>,
    chat: Option<Arc<dyn ChatPort>>,
    confirm: Option<Arc<dyn ConfirmPrompt>>,
    index: Option<Arc<PollIndex>>,
    queue: Option<Arc<ReactionQueue>>,
    journal: Option<Arc<EventJournal>>,
    slots: Option<SlotOrder>,
    leagues: Vec<League>,
    bot_user_id: Option<Snowflake>,
}

impl EngineContextBuilder {
    pub fn polls(mut self, repo: Arc<dyn PollRepository>) -> Self {
        self.polls = Some(repo);
        self
    }

    pub fn records(mut self, repo: Arc<dyn RecordRepository>) -> Self {
        self.records = Some(repo);
        self
    }

    pub fn chat(mut self, chat: Arc<dyn ChatPort>) -> Self {
        self.chat = Some(chat);
        self
    }

    pub fn confirm(mut self, confirm: Arc<dyn ConfirmPrompt>) -> Self {
        self.confirm = Some(confirm);
        self
    }

    pub fn index(mut self, index: Arc<PollIndex>) -> Self {
        self.index = Some(index);
        self
    }

    pub fn queue(mut self, queue: Arc<ReactionQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    pub fn journal(mut self, journal: Arc<EventJournal>) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn slots(mut self, slots: SlotOrder) -> Self {
        self.slots = Some(slots);
        self
    }

    pub fn leagues(mut self, leagues: Vec<League>) -> Self {
        self.leagues = leagues;
        self
    }

    pub fn bot_user_id(mut self, id: Snowflake) -> Self {
        self.bot_user_id = Some(id);
        self
    }

    /// Build the context
    ///
    /// # Errors
    /// Returns `DomainError::ConfigError` if any required dependency is
    /// missing or no leagues are configured.
    pub fn build(self) -> RepoResult<EngineContext> {
        if self.leagues.is_empty() {
            return Err(DomainError::ConfigError("no leagues configured".to_string()));
        }
        Ok(EngineContext {
            polls: self.polls.ok_or_else(|| missing("polls"))?,
            records: self.records.ok_or_else(|| missing("records"))?,
            chat: self.chat.ok_or_else(|| missing("chat"))?,
            confirm: self.confirm.ok_or_else(|| missing("confirm"))?,
            index: self.index.ok_or_else(|| missing("index"))?,
            queue: self.queue.ok_or_else(|| missing("queue"))?,
            journal: self.journal.ok_or_else(|| missing("journal"))?,
            slots: self.slots.unwrap_or_default(),
            leagues: self.leagues,
            bot_user_id: self.bot_user_id.ok_or_else(|| missing("bot_user_id"))?,
        })
    }
}

fn missing(what: &str) -> DomainError {
    DomainError::ConfigError(format!("{what} is required"))
}
