//! Bot server setup
//!
//! Builds the HTTP surface, wires the engine's dependencies, and runs the
//! flush task alongside the server.

mod state;

pub use state::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use avail_common::{AppError, AvailConfig};
use avail_core::League;
use avail_engine::{
    replay_into_queue, spawn_flush_task, EngineContext, EventJournal, Flusher, PollIndex,
    ReactionQueue,
};
use avail_store::{HttpTableStore, SheetPollRepository, SheetRecordRepository};

use crate::chat::RestChat;
use crate::confirm::ConfirmationBroker;
use crate::handlers::{commands, confirmations, events, health};

/// Create the router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/gateway/events", post(events::ingest_reaction))
        .route("/commands/post-poll", post(commands::post_poll))
        .route("/commands/delete-poll", post(commands::delete_poll))
        .route("/commands/view-availability", post(commands::view_availability))
        .route("/commands/check-availability", post(commands::check_availability))
        .route("/commands/flush", post(commands::flush_now))
        .route("/confirmations/:id", post(confirmations::resolve))
        .route("/health", get(health::health_check))
}

/// Build the complete application
pub fn create_app(state: AppState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize all dependencies and create the application state.
///
/// Wiring order: store client -> repositories -> index/queue/journal ->
/// context -> broker. The journal is replayed into the queue here so
/// events captured before a crash are pending again before the first
/// drain.
pub async fn create_state(config: AvailConfig) -> Result<AppState, AppError> {
    let store = Arc::new(HttpTableStore::new(&config.store));

    let polls = Arc::new(SheetPollRepository::new(
        store.clone(),
        config.tables.polls.clone(),
    ));
    let records = Arc::new(SheetRecordRepository::new(
        store,
        config.tables.leagues.clone(),
    ));

    let chat = Arc::new(RestChat::new(&config.chat));
    let broker = Arc::new(ConfirmationBroker::new(
        chat.clone(),
        Duration::from_secs(config.engine.confirm_timeout_secs),
    ));

    let index = Arc::new(PollIndex::new(
        polls.clone(),
        Duration::from_secs(config.engine.index_ttl_secs),
    ));
    let queue = Arc::new(ReactionQueue::new());
    let journal = Arc::new(
        EventJournal::open(&config.engine.journal_path).map_err(AppError::Domain)?,
    );

    let replayed = replay_into_queue(&journal, &queue).map_err(AppError::Domain)?;
    if replayed > 0 {
        info!(replayed, "journal replayed into the queue");
    }

    let leagues: Vec<League> = config
        .tables
        .league_names()
        .iter()
        .map(|name| League::parse(name))
        .collect::<Result<_, _>>()
        .map_err(AppError::Domain)?;

    let ctx = EngineContext::builder()
        .polls(polls)
        .records(records)
        .chat(chat)
        .confirm(broker.clone())
        .index(index)
        .queue(queue)
        .journal(journal)
        .slots(avail_core::SlotOrder::new(config.engine.slots.clone()))
        .leagues(leagues)
        .bot_user_id(avail_core::Snowflake::new(config.chat.bot_user_id))
        .build()
        .map_err(AppError::Domain)?;

    let flusher = Arc::new(Flusher::new(
        ctx.queue_arc(),
        ctx.journal_arc(),
        ctx.records_arc(),
    ));

    Ok(AppState::new(ctx, flusher, broker, config))
}

/// Run the HTTP server
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    info!("Starting bot server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete bot: state wiring, flush task, and HTTP server
pub async fn run(config: AvailConfig) -> Result<(), AppError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let flush_interval = Duration::from_secs(config.engine.flush_interval_secs);

    let state = create_state(config).await?;

    // Warm the poll index before taking traffic; a cold store is not
    // fatal, the TTL path will retry.
    if let Err(e) = state.ctx().index().refresh().await {
        tracing::warn!(error = %e, "initial poll index load failed");
    }

    let flush_task = spawn_flush_task(state.flusher_arc(), flush_interval);

    let app = create_app(state);
    let result = run_server(app, addr).await;

    flush_task.abort();
    result
}
