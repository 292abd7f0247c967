//! Command surface handlers
//!
//! The thin layer over the engine's four operations: post poll, delete
//! poll, view availability by day, check aggregate counts. Argument
//! parsing happens here; everything else is the engine's.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::warn;

use avail_core::{League, Snowflake, Weekday};
use avail_engine::{
    DayRoster, DeletePollReport, LeagueAvailability, PollService, PostPollReport, QueryService,
};

use crate::response::{ApiError, ApiResult};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct PostPollRequest {
    pub channel_id: Snowflake,
    pub league: String,
}

#[derive(Debug, Deserialize)]
pub struct DeletePollRequest {
    pub channel_id: Snowflake,
    pub league: String,
}

#[derive(Debug, Deserialize)]
pub struct ViewAvailabilityRequest {
    pub league: String,
    pub day: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckAvailabilityRequest {
    pub league: String,
}

#[derive(Debug, Serialize)]
pub struct ViewAvailabilityResponse {
    #[serde(flatten)]
    pub roster: DayRoster,
    pub rendered: String,
}

#[derive(Debug, Serialize)]
pub struct CheckAvailabilityResponse {
    #[serde(flatten)]
    pub availability: LeagueAvailability,
    pub rendered: String,
}

fn parse_league(raw: &str) -> ApiResult<League> {
    League::parse(raw).map_err(ApiError::Domain)
}

fn parse_day(raw: &str) -> ApiResult<Weekday> {
    raw.parse()
        .map_err(|_| ApiError::invalid_path(format!("Invalid day: {raw}")))
}

/// Post the weekly availability grid
///
/// POST /commands/post-poll
pub async fn post_poll(
    State(state): State<AppState>,
    Json(request): Json<PostPollRequest>,
) -> ApiResult<Json<PostPollReport>> {
    let league = parse_league(&request.league)?;
    let service = PollService::new(state.ctx());
    let report = service.post_poll(request.channel_id, &league).await?;
    Ok(Json(report))
}

/// Delete a league's polls and their records
///
/// POST /commands/delete-poll
pub async fn delete_poll(
    State(state): State<AppState>,
    Json(request): Json<DeletePollRequest>,
) -> ApiResult<Json<DeletePollReport>> {
    let league = parse_league(&request.league)?;
    let service = PollService::new(state.ctx());
    let report = service.delete_poll(request.channel_id, &league).await?;
    Ok(Json(report))
}

/// Per-user slots for one day, posted to the summary channel when one is
/// configured
///
/// POST /commands/view-availability
pub async fn view_availability(
    State(state): State<AppState>,
    Json(request): Json<ViewAvailabilityRequest>,
) -> ApiResult<Json<ViewAvailabilityResponse>> {
    let league = parse_league(&request.league)?;
    let day = parse_day(&request.day)?;

    let service = QueryService::new(state.ctx());
    let roster = service.view_availability(&league, day).await?;

    let rendered = if roster.is_empty() {
        format!("No data found for {league} - {day}.")
    } else {
        roster.render()
    };

    post_summary(&state, &rendered).await;
    Ok(Json(ViewAvailabilityResponse { roster, rendered }))
}

/// Aggregate per-slot counts for a league
///
/// POST /commands/check-availability
pub async fn check_availability(
    State(state): State<AppState>,
    Json(request): Json<CheckAvailabilityRequest>,
) -> ApiResult<Json<CheckAvailabilityResponse>> {
    let league = parse_league(&request.league)?;

    let service = QueryService::new(state.ctx());
    let availability = service.check_availability(&league).await?;
    let rendered = availability.render();

    post_summary(&state, &rendered).await;
    Ok(Json(CheckAvailabilityResponse {
        availability,
        rendered,
    }))
}

/// Flush the queue immediately instead of waiting for the timer
///
/// POST /commands/flush
pub async fn flush_now(State(state): State<AppState>) -> Json<serde_json::Value> {
    let report = state.flusher().flush_once().await;
    Json(serde_json::json!({
        "appended": report.appended,
        "skipped_persisted": report.skipped_persisted,
        "restored": report.restored,
        "removals_reapplied": report.removals_reapplied,
    }))
}

/// Post a rendered block to the configured summary channel, if any.
/// Failures are logged; the command response still carries the text.
async fn post_summary(state: &AppState, rendered: &str) {
    let Some(channel_id) = state.config().chat.summary_channel_id else {
        return;
    };
    if let Err(e) = state
        .ctx()
        .chat()
        .send_message(Snowflake::new(channel_id), rendered)
        .await
    {
        warn!(error = %e, "failed to post summary");
    }
}
