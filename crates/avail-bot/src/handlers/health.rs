//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub queued: usize,
    pub tracked_polls: usize,
}

/// Liveness probe with a peek at engine state
///
/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        queued: state.ctx().queue().len(),
        tracked_polls: state.ctx().index().len(),
    })
}
