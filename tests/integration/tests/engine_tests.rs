//! End-to-end tests for the availability engine
//!
//! Drive the engine the way the bot does - listener signals in, flush
//! timer ticks, command operations - against the in-memory store and the
//! recording fake chat surface.

use std::sync::Arc;

use chrono::NaiveDate;

use avail_core::{DomainError, Snowflake, Weekday};
use avail_engine::{
    replay_into_queue, Flusher, LeagueAvailability, ListenOutcome, ListenerService, PollService,
    QueryService, ReactionQueue,
};

use integration_tests::{
    league, reaction_add, reaction_remove, ScriptedConfirm, TestHarness, BOT_USER_ID, HC_TABLE,
    POLLS_TABLE,
};

const CHANNEL: Snowflake = Snowflake::new(1);

/// A Wednesday; its week runs SUNDAY 04/13 through SATURDAY 04/19
fn test_week() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, 16).unwrap()
}

/// Post the HC weekly grid and return the message id for one day
async fn post_week(harness: &TestHarness, day: &str) -> Snowflake {
    let service = PollService::new(&harness.ctx);
    let report = service
        .post_week(CHANNEL, &league("HC"), test_week())
        .await
        .unwrap();
    assert_eq!(report.posted, 7);

    harness
        .chat
        .sent
        .lock()
        .iter()
        .find(|m| m.text.contains(day))
        .map(|m| m.message_id)
        .expect("day message posted")
}

fn count(availability: &LeagueAvailability, day: Weekday, emoji: &str) -> u32 {
    availability
        .days
        .iter()
        .find(|d| d.day == day)
        .unwrap()
        .slots
        .iter()
        .find(|s| s.emoji == emoji)
        .unwrap()
        .count
}

// ============================================================================
// Add, flush, remove: the full round trip
// ============================================================================

#[tokio::test]
async fn add_flush_then_remove_reports_zero() {
    let harness = TestHarness::new();
    let monday = post_week(&harness, "MONDAY").await;
    let listener = ListenerService::new(&harness.ctx);

    let outcome = listener
        .process(reaction_add(1, "7PM", monday))
        .await
        .unwrap();
    assert_eq!(outcome, ListenOutcome::Queued);
    assert_eq!(harness.rows(HC_TABLE), 0, "adds are batched, not written inline");

    let report = harness.flusher.flush_once().await;
    assert_eq!(report.appended, 1);
    assert_eq!(harness.rows(HC_TABLE), 1);

    // Removal applies immediately - no flush needed
    let outcome = listener
        .process(reaction_remove(1, "7PM", monday))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ListenOutcome::Removed {
            cancelled_queued: false,
            deleted_persisted: true
        }
    );
    assert_eq!(harness.rows(HC_TABLE), 0);

    let availability = QueryService::new(&harness.ctx)
        .check_availability(&league("HC"))
        .await
        .unwrap();
    assert_eq!(count(&availability, Weekday::Monday, "7PM"), 0);
}

// ============================================================================
// Idempotent add
// ============================================================================

#[tokio::test]
async fn duplicate_adds_persist_once() {
    let harness = TestHarness::new();
    let monday = post_week(&harness, "MONDAY").await;
    let listener = ListenerService::new(&harness.ctx);

    // Redundant signals before any flush
    for _ in 0..4 {
        listener
            .process(reaction_add(1, "7PM", monday))
            .await
            .unwrap();
    }
    harness.flusher.flush_once().await;
    assert_eq!(harness.rows(HC_TABLE), 1);

    // The same signal again after the fact is also idempotent
    listener
        .process(reaction_add(1, "7PM", monday))
        .await
        .unwrap();
    let report = harness.flusher.flush_once().await;
    assert_eq!(report.skipped_persisted, 1);
    assert_eq!(harness.rows(HC_TABLE), 1);
}

// ============================================================================
// Two users, double drain trigger
// ============================================================================

#[tokio::test]
async fn two_users_survive_double_drain() {
    let harness = TestHarness::new();
    let tuesday = post_week(&harness, "TUESDAY").await;
    let listener = ListenerService::new(&harness.ctx);

    listener
        .process(reaction_add(1, "5PM", tuesday))
        .await
        .unwrap();
    listener
        .process(reaction_add(2, "5PM", tuesday))
        .await
        .unwrap();

    // Drain timer fires twice back to back
    harness.flusher.flush_once().await;
    harness.flusher.flush_once().await;

    assert_eq!(harness.rows(HC_TABLE), 2, "exactly 2 rows, never more");
}

// ============================================================================
// Remove with no record
// ============================================================================

#[tokio::test]
async fn remove_without_record_is_noop() {
    let harness = TestHarness::new();
    let monday = post_week(&harness, "MONDAY").await;
    let listener = ListenerService::new(&harness.ctx);

    let outcome = listener
        .process(reaction_remove(1, "7PM", monday))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ListenOutcome::Removed {
            cancelled_queued: false,
            deleted_persisted: false
        }
    );
    assert_eq!(harness.rows(HC_TABLE), 0);
}

// ============================================================================
// Add/remove races
// ============================================================================

#[tokio::test]
async fn remove_cancels_queued_add() {
    let harness = TestHarness::new();
    let monday = post_week(&harness, "MONDAY").await;
    let listener = ListenerService::new(&harness.ctx);

    listener
        .process(reaction_add(1, "7PM", monday))
        .await
        .unwrap();
    let outcome = listener
        .process(reaction_remove(1, "7PM", monday))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ListenOutcome::Removed {
            cancelled_queued: true,
            deleted_persisted: false
        }
    );

    // The cancelled add must not resurface on flush
    let report = harness.flusher.flush_once().await;
    assert_eq!(report.appended, 0);
    assert_eq!(harness.rows(HC_TABLE), 0);
}

#[tokio::test]
async fn remove_after_flush_converges_to_absent() {
    let harness = TestHarness::new();
    let monday = post_week(&harness, "MONDAY").await;
    let listener = ListenerService::new(&harness.ctx);

    listener
        .process(reaction_add(1, "7PM", monday))
        .await
        .unwrap();
    harness.flusher.flush_once().await;

    listener
        .process(reaction_remove(1, "7PM", monday))
        .await
        .unwrap();
    assert_eq!(harness.rows(HC_TABLE), 0);

    // Nothing pending resurrects it later
    harness.flusher.flush_once().await;
    assert_eq!(harness.rows(HC_TABLE), 0);
}

#[tokio::test]
async fn remove_then_readd_stays_present() {
    let harness = TestHarness::new();
    let monday = post_week(&harness, "MONDAY").await;
    let listener = ListenerService::new(&harness.ctx);

    listener
        .process(reaction_add(1, "7PM", monday))
        .await
        .unwrap();
    harness.flusher.flush_once().await;

    listener
        .process(reaction_remove(1, "7PM", monday))
        .await
        .unwrap();
    listener
        .process(reaction_add(1, "7PM", monday))
        .await
        .unwrap();
    harness.flusher.flush_once().await;

    assert_eq!(harness.rows(HC_TABLE), 1, "the re-add is the latest signal");
}

// ============================================================================
// Poll deletion completeness
// ============================================================================

#[tokio::test]
async fn delete_poll_purges_records_even_when_message_deletes_fail() {
    let harness = TestHarness::new();
    let monday = post_week(&harness, "MONDAY").await;
    let tuesday = harness
        .chat
        .sent
        .lock()
        .iter()
        .find(|m| m.text.contains("TUESDAY"))
        .unwrap()
        .message_id;
    let listener = ListenerService::new(&harness.ctx);

    listener
        .process(reaction_add(1, "5PM", monday))
        .await
        .unwrap();
    listener
        .process(reaction_add(2, "9PM", tuesday))
        .await
        .unwrap();
    harness.flusher.flush_once().await;
    assert_eq!(harness.rows(HC_TABLE), 2);

    // One of the posted messages refuses to die
    harness.chat.refuse_delete(monday);

    let service = PollService::new(&harness.ctx);
    let report = service.delete_poll(CHANNEL, &league("HC")).await.unwrap();

    assert_eq!(report.messages_deleted, 6);
    assert_eq!(report.records_deleted, 2, "records are purged regardless");
    assert_eq!(report.polls_deleted, 7);
    assert_eq!(harness.rows(HC_TABLE), 0);
    assert_eq!(harness.rows(POLLS_TABLE), 0);

    // Re-running converges cleanly on the already-clean state
    let report = service.delete_poll(CHANNEL, &league("HC")).await.unwrap();
    assert_eq!(report.records_deleted, 0);
    assert_eq!(report.polls_deleted, 0);
}

// ============================================================================
// Aggregation correctness
// ============================================================================

#[tokio::test]
async fn counts_and_slot_order_are_canonical() {
    let harness = TestHarness::new();
    let monday = post_week(&harness, "MONDAY").await;
    let listener = ListenerService::new(&harness.ctx);

    // Slots arrive in scrambled order
    for (user, emoji) in [(1, "12AM"), (1, "5PM"), (1, "9PM"), (2, "9PM"), (3, "9PM")] {
        listener
            .process(reaction_add(user, emoji, monday))
            .await
            .unwrap();
    }
    harness.flusher.flush_once().await;

    let query = QueryService::new(&harness.ctx);
    let availability = query.check_availability(&league("HC")).await.unwrap();
    assert_eq!(count(&availability, Weekday::Monday, "5PM"), 1);
    assert_eq!(count(&availability, Weekday::Monday, "9PM"), 3);
    assert_eq!(count(&availability, Weekday::Monday, "12AM"), 1);
    assert_eq!(count(&availability, Weekday::Monday, "6PM"), 0);
    assert_eq!(count(&availability, Weekday::Tuesday, "9PM"), 0);

    // Every day is present in week order, every slot in canonical order
    assert_eq!(availability.days.len(), 7);
    assert_eq!(availability.days[0].day, Weekday::Sunday);
    let slot_names: Vec<&str> = availability.days[1]
        .slots
        .iter()
        .map(|s| s.emoji.as_str())
        .collect();
    assert_eq!(
        slot_names,
        ["5PM", "6PM", "7PM", "8PM", "9PM", "10PM", "11PM", "12AM"]
    );

    // The per-user view orders slots canonically despite insertion order
    let roster = query
        .view_availability(&league("HC"), Weekday::Monday)
        .await
        .unwrap();
    let user1 = roster
        .users
        .iter()
        .find(|u| u.user_id == Snowflake::new(1))
        .unwrap();
    assert_eq!(user1.slots, ["5PM", "9PM", "12AM"]);
}

#[tokio::test]
async fn empty_league_is_a_valid_result() {
    let harness = TestHarness::new();

    let query = QueryService::new(&harness.ctx);
    let availability = query.check_availability(&league("HC")).await.unwrap();
    assert_eq!(availability.days.len(), 7);
    assert!(availability
        .days
        .iter()
        .all(|d| d.slots.iter().all(|s| s.count == 0)));

    let roster = query
        .view_availability(&league("HC"), Weekday::Friday)
        .await
        .unwrap();
    assert!(roster.is_empty());
}

// ============================================================================
// Listener classification
// ============================================================================

#[tokio::test]
async fn listener_ignores_bots_unknown_messages_and_foreign_emoji() {
    let harness = TestHarness::new();
    let monday = post_week(&harness, "MONDAY").await;
    let listener = ListenerService::new(&harness.ctx);

    // The bot's own affordance reactions
    let mut own = reaction_add(BOT_USER_ID, "5PM", monday);
    own.is_bot = false;
    assert_eq!(
        listener.process(own).await.unwrap(),
        ListenOutcome::IgnoredBot
    );

    // Another bot account
    let mut other_bot = reaction_add(5, "5PM", monday);
    other_bot.is_bot = true;
    assert_eq!(
        listener.process(other_bot).await.unwrap(),
        ListenOutcome::IgnoredBot
    );

    // A message the poll index does not track
    assert_eq!(
        listener
            .process(reaction_add(1, "5PM", Snowflake::new(424242)))
            .await
            .unwrap(),
        ListenOutcome::UnknownMessage
    );

    // An emoji outside the slot set
    assert_eq!(
        listener
            .process(reaction_add(1, "\u{1F44D}", monday))
            .await
            .unwrap(),
        ListenOutcome::IgnoredEmoji
    );

    harness.flusher.flush_once().await;
    assert_eq!(harness.rows(HC_TABLE), 0);
}

#[tokio::test]
async fn listener_canonicalizes_custom_emoji_markup() {
    let harness = TestHarness::new();
    let monday = post_week(&harness, "MONDAY").await;
    let listener = ListenerService::new(&harness.ctx);

    // Add arrives as custom markup, remove as a bare lowercase name
    listener
        .process(reaction_add(1, "<:7PM:1353482149096853606>", monday))
        .await
        .unwrap();
    harness.flusher.flush_once().await;
    assert_eq!(harness.rows(HC_TABLE), 1);

    listener
        .process(reaction_remove(1, "7pm", monday))
        .await
        .unwrap();
    assert_eq!(harness.rows(HC_TABLE), 0, "both paths share one emoji identity");
}

// ============================================================================
// Confirmation
// ============================================================================

#[tokio::test]
async fn declined_confirmation_aborts_repost_with_no_state_change() {
    let harness = TestHarness::with_confirm(Arc::new(ScriptedConfirm::declining()));
    post_week(&harness, "MONDAY").await;
    let sent_before = harness.chat.sent.lock().len();

    let service = PollService::new(&harness.ctx);
    let err = service.post_poll(CHANNEL, &league("HC")).await.unwrap_err();
    assert!(matches!(err, DomainError::ConfirmationDeclined));

    assert_eq!(harness.chat.sent.lock().len(), sent_before);
    assert_eq!(harness.rows(POLLS_TABLE), 7, "old cycle untouched");
}

#[tokio::test]
async fn approved_confirmation_supersedes_old_cycle() {
    let confirm = Arc::new(ScriptedConfirm::approving());
    let harness = TestHarness::with_confirm(confirm.clone());
    let monday = post_week(&harness, "MONDAY").await;
    let listener = ListenerService::new(&harness.ctx);

    listener
        .process(reaction_add(1, "5PM", monday))
        .await
        .unwrap();
    harness.flusher.flush_once().await;
    assert_eq!(harness.rows(HC_TABLE), 1);

    let service = PollService::new(&harness.ctx);
    let report = service.post_poll(CHANNEL, &league("HC")).await.unwrap();
    assert_eq!(report.posted, 7);
    assert_eq!(confirm.prompt_count(), 1);

    // Old cycle fully retired: records purged, index rows replaced
    assert_eq!(harness.rows(HC_TABLE), 0);
    assert_eq!(harness.rows(POLLS_TABLE), 7);
    assert_eq!(harness.chat.deleted.lock().len(), 7);
}

#[tokio::test]
async fn first_post_never_prompts() {
    let confirm = Arc::new(ScriptedConfirm::approving());
    let harness = TestHarness::with_confirm(confirm.clone());

    let service = PollService::new(&harness.ctx);
    service.post_poll(CHANNEL, &league("HC")).await.unwrap();
    assert_eq!(confirm.prompt_count(), 0);
}

// ============================================================================
// Journal replay (crash recovery)
// ============================================================================

#[tokio::test]
async fn journal_replay_recovers_unflushed_adds() {
    let harness = TestHarness::new();
    let monday = post_week(&harness, "MONDAY").await;
    let listener = ListenerService::new(&harness.ctx);

    listener
        .process(reaction_add(1, "5PM", monday))
        .await
        .unwrap();
    listener
        .process(reaction_add(2, "6PM", monday))
        .await
        .unwrap();
    listener
        .process(reaction_remove(2, "6PM", monday))
        .await
        .unwrap();

    // Crash before the flush: the in-memory queue is lost, the journal
    // survives. A fresh queue replays to exactly the pending set.
    let fresh_queue = Arc::new(ReactionQueue::new());
    let replayed = replay_into_queue(harness.ctx.journal(), &fresh_queue).unwrap();
    assert_eq!(replayed, 1, "the removed add is not resurrected");

    let flusher = Flusher::new(
        fresh_queue,
        harness.ctx.journal_arc(),
        harness.ctx.records_arc(),
    );
    let report = flusher.flush_once().await;
    assert_eq!(report.appended, 1);
    assert_eq!(harness.rows(HC_TABLE), 1);
}

// ============================================================================
// Unknown league
// ============================================================================

#[tokio::test]
async fn unknown_league_is_rejected_not_crashed() {
    let harness = TestHarness::new();

    let service = PollService::new(&harness.ctx);
    let err = service
        .post_poll(CHANNEL, &league("XX"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "UNKNOWN_LEAGUE");

    let query = QueryService::new(&harness.ctx);
    let err = query.check_availability(&league("XX")).await.unwrap_err();
    assert_eq!(err.code(), "UNKNOWN_LEAGUE");
}
