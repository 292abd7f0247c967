//! # avail-engine
//!
//! Application layer of the availability reaction aggregation engine:
//! the poll publisher, the reaction listener, the dedup & batch queue with
//! its durable journal, the flush task, and the reconciliation/query
//! services.
//!
//! The engine is single-process and event-driven. The listener path only
//! ever touches in-memory state (queue + journal); all store traffic goes
//! through the periodic flush or the immediate removal path.

pub mod dto;
pub mod index;
pub mod journal;
pub mod queue;
pub mod services;

// Re-export commonly used types at crate root
pub use dto::{
    DayCounts, DayRoster, DeletePollReport, InboundKind, InboundReaction, LeagueAvailability,
    PostPollReport, SlotCount, UserSlots,
};
pub use index::{PollEntry, PollIndex};
pub use journal::{replay_into_queue, EventJournal, JournalEntry};
pub use queue::{spawn_flush_task, FlushReport, Flusher, PendingAdd, QueuedAdd, ReactionQueue};
pub use services::{
    EngineContext, EngineContextBuilder, ListenOutcome, ListenerService, PollService, QueryService,
};
