//! Gateway event handlers
//!
//! The event source POSTs raw reaction signals here. Classification and
//! everything after it happens inside the engine; this handler never
//! rejects a signal for engine-level reasons, because a bad signal must
//! not look like a gateway failure.

use axum::{extract::State, http::StatusCode, Json};

use avail_engine::{InboundReaction, ListenerService};

use crate::server::AppState;

/// Ingest one raw reaction signal
///
/// POST /gateway/events
pub async fn ingest_reaction(
    State(state): State<AppState>,
    Json(raw): Json<InboundReaction>,
) -> StatusCode {
    let listener = ListenerService::new(state.ctx());
    listener.on_event(raw).await;
    StatusCode::ACCEPTED
}
