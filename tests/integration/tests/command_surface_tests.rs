//! Tests for the thin command surface over the engine
//!
//! Calls the bot's handlers directly with a hand-built application state,
//! so the request parsing and error mapping are exercised without a
//! running HTTP server.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::Json;

use avail_common::{
    AppSettings, AvailConfig, ChatConfig, EngineConfig, Environment, ServerConfig, StoreConfig,
    TablesConfig,
};
use avail_core::DEFAULT_SLOT_NAMES;
use avail_engine::Flusher;
use avail_bot::confirm::ConfirmationBroker;
use avail_bot::handlers::{commands, confirmations, health};
use avail_bot::AppState;

use integration_tests::{FakeChat, TestHarness};

fn test_config() -> AvailConfig {
    AvailConfig {
        app: AppSettings {
            name: "avail-bot-test".to_string(),
            env: Environment::Development,
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        store: StoreConfig {
            base_url: "http://store.invalid".to_string(),
            api_token: "test".to_string(),
            workbook: "AOS".to_string(),
            max_retries: 0,
        },
        chat: ChatConfig {
            base_url: "http://chat.invalid".to_string(),
            token: "test".to_string(),
            bot_user_id: 999,
            summary_channel_id: None,
        },
        tables: TablesConfig {
            polls: "currentavailability".to_string(),
            leagues: BTreeMap::from([
                ("HC".to_string(), "availability".to_string()),
                ("AL".to_string(), "alavailability".to_string()),
            ]),
        },
        engine: EngineConfig {
            flush_interval_secs: 30,
            journal_path: "./journal.jsonl".to_string(),
            index_ttl_secs: 60,
            confirm_timeout_secs: 1,
            slots: DEFAULT_SLOT_NAMES.iter().map(ToString::to_string).collect(),
        },
    }
}

fn app_state(harness: &TestHarness) -> AppState {
    let flusher = Arc::new(Flusher::new(
        harness.ctx.queue_arc(),
        harness.ctx.journal_arc(),
        harness.ctx.records_arc(),
    ));
    let broker = Arc::new(ConfirmationBroker::new(
        Arc::new(FakeChat::new()),
        Duration::from_secs(1),
    ));
    AppState::new(harness.ctx.clone(), flusher, broker, test_config())
}

#[tokio::test]
async fn post_poll_command_posts_the_grid() {
    let harness = TestHarness::new();
    let state = app_state(&harness);

    let response = commands::post_poll(
        State(state),
        Json(commands::PostPollRequest {
            channel_id: avail_core::Snowflake::new(1),
            league: "hc".to_string(),
        }),
    )
    .await
    .unwrap();

    assert_eq!(response.0.posted, 7);
    assert_eq!(harness.chat.sent.lock().len(), 7);
    // Affordances in canonical order on each day message
    assert_eq!(harness.chat.reactions.lock().len(), 7 * 8);
}

#[tokio::test]
async fn bad_league_maps_to_validation_error() {
    let harness = TestHarness::new();
    let state = app_state(&harness);

    let err = commands::check_availability(
        State(state),
        Json(commands::CheckAvailabilityRequest {
            league: "not a league".to_string(),
        }),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bad_day_maps_to_bad_request() {
    let harness = TestHarness::new();
    let state = app_state(&harness);

    let err = commands::view_availability(
        State(state),
        Json(commands::ViewAvailabilityRequest {
            league: "HC".to_string(),
            day: "SOMEDAY".to_string(),
        }),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn view_availability_reports_empty_day() {
    let harness = TestHarness::new();
    let state = app_state(&harness);

    let response = commands::view_availability(
        State(state),
        Json(commands::ViewAvailabilityRequest {
            league: "HC".to_string(),
            day: "monday".to_string(),
        }),
    )
    .await
    .unwrap();

    assert!(response.0.roster.is_empty());
    assert!(response.0.rendered.contains("No data found"));
}

#[tokio::test]
async fn unknown_confirmation_resolves_false() {
    let harness = TestHarness::new();
    let state = app_state(&harness);

    let response = confirmations::resolve(
        State(state),
        Path(uuid::Uuid::new_v4().to_string()),
        Json(confirmations::ResolveRequest { approved: true }),
    )
    .await
    .unwrap();
    assert!(!response.0.resolved);
}

#[tokio::test]
async fn malformed_confirmation_id_is_rejected() {
    let harness = TestHarness::new();
    let state = app_state(&harness);

    let err = confirmations::resolve(
        State(state),
        Path("not-a-uuid".to_string()),
        Json(confirmations::ResolveRequest { approved: true }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_reports_engine_state() {
    let harness = TestHarness::new();
    let state = app_state(&harness);

    let response = health::health_check(State(state)).await;
    assert_eq!(response.0.status, "ok");
    assert_eq!(response.0.queued, 0);
}
