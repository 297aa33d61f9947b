//! Drill endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use qdrill_common::models::Drill;
use qdrill_common::validation::validate_and_normalize_drill;
use serde_json::Value;
use tracing::debug;

use super::{json_body, path_id};
use crate::error::ApiResult;
use crate::AppState;

/// POST /api/drills
///
/// Validates and normalizes the payload, then stores it. Responds 201 with the
/// stored drill, 400 with field errors, or 500 when storage fails.
pub async fn create_drill(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Drill>)> {
    let payload = json_body(body)?;
    let drill = validate_and_normalize_drill(&payload, &state.rules)?;

    let stored = state.drills.insert(drill).await?;
    debug!("Created drill {} ({})", stored.id, stored.details.name);

    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /api/drills
pub async fn list_drills(State(state): State<AppState>) -> ApiResult<Json<Vec<Drill>>> {
    let drills = state.drills.list_all().await?;
    debug!("Listing {} drills", drills.len());
    Ok(Json(drills))
}

/// GET /api/drills/:id
pub async fn get_drill(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Drill>> {
    let id = path_id(id)?;
    Ok(Json(state.drills.get_by_id(id).await?))
}
