//! Test harness - a fully wired engine over in-memory backends

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use avail_core::{ConfirmPrompt, League, SlotOrder, Snowflake};
use avail_engine::{EngineContext, EventJournal, Flusher, PollIndex, ReactionQueue};
use avail_store::models::{POLL_HEADER, RECORD_HEADER};
use avail_store::{MemoryTableStore, SheetPollRepository, SheetRecordRepository};

use crate::fixtures::FakeChat;

/// Table names used by every harness
pub const POLLS_TABLE: &str = "currentavailability";
pub const HC_TABLE: &str = "availability";
pub const AL_TABLE: &str = "alavailability";

/// The bot's own user id in tests
pub const BOT_USER_ID: i64 = 999;

/// A fully wired engine with in-memory store, fake chat, and scripted
/// confirmation
pub struct TestHarness {
    pub store: Arc<MemoryTableStore>,
    pub chat: Arc<FakeChat>,
    pub ctx: EngineContext,
    pub flusher: Flusher,
    // Keeps the journal's backing directory alive for the harness lifetime
    _journal_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Build a harness with the given confirmation behavior
    pub fn with_confirm(confirm: Arc<dyn ConfirmPrompt>) -> Self {
        let store = Arc::new(MemoryTableStore::new());
        store.create_table(POLLS_TABLE, &POLL_HEADER);
        store.create_table(HC_TABLE, &RECORD_HEADER);
        store.create_table(AL_TABLE, &RECORD_HEADER);

        let polls = Arc::new(SheetPollRepository::new(store.clone(), POLLS_TABLE));
        let records = Arc::new(SheetRecordRepository::new(
            store.clone(),
            BTreeMap::from([
                ("HC".to_string(), HC_TABLE.to_string()),
                ("AL".to_string(), AL_TABLE.to_string()),
            ]),
        ));

        let chat = Arc::new(FakeChat::new());
        let index = Arc::new(PollIndex::new(polls.clone(), Duration::from_secs(300)));
        let queue = Arc::new(ReactionQueue::new());

        let journal_dir = tempfile::tempdir().expect("tempdir");
        let journal = Arc::new(
            EventJournal::open(journal_dir.path().join("journal.jsonl")).expect("journal"),
        );

        let ctx = EngineContext::builder()
            .polls(polls)
            .records(records.clone())
            .chat(chat.clone())
            .confirm(confirm)
            .index(index)
            .queue(queue.clone())
            .journal(journal.clone())
            .slots(SlotOrder::default())
            .leagues(vec![league("HC"), league("AL")])
            .bot_user_id(Snowflake::new(BOT_USER_ID))
            .build()
            .expect("engine context");

        let flusher = Flusher::new(queue, journal, records);

        Self {
            store,
            chat,
            ctx,
            flusher,
            _journal_dir: journal_dir,
        }
    }

    /// Harness whose confirmation prompt always approves
    pub fn new() -> Self {
        Self::with_confirm(Arc::new(crate::fixtures::ScriptedConfirm::approving()))
    }

    /// Rows currently persisted for a league table
    pub fn rows(&self, table: &str) -> usize {
        self.store.row_count(table)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a league name
pub fn league(name: &str) -> League {
    League::parse(name).expect("valid league")
}
