//! Confirmation resolution handler

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::response::{ApiError, ApiResult};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub approved: bool,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub resolved: bool,
}

/// Resolve a pending confirmation prompt
///
/// POST /confirmations/{id}
pub async fn resolve(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ResolveRequest>,
) -> ApiResult<Json<ResolveResponse>> {
    let id: Uuid = id
        .parse()
        .map_err(|_| ApiError::invalid_path("Invalid confirmation id"))?;

    let resolved = state.broker().resolve(id, request.approved);
    Ok(Json(ResolveResponse { resolved }))
}
