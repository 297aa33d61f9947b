//! Practice plan endpoints
//!
//! Plans are returned together with their computed schedule: each section's
//! parallel-aware duration and, when the plan has a start time, its wall-clock
//! window.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use qdrill_common::duration::plan_duration;
use qdrill_common::models::PracticePlan;
use qdrill_common::schedule::{section_timings, SectionTiming};
use qdrill_common::validation::validate_and_normalize_practice_plan;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{json_body, path_id};
use crate::error::ApiResult;
use crate::AppState;

/// Stored plan plus its computed timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResponse {
    #[serde(flatten)]
    pub plan: PracticePlan,
    /// Minutes across all sections
    pub total_duration: u32,
    pub schedule: Vec<SectionTiming>,
}

impl From<PracticePlan> for PlanResponse {
    fn from(plan: PracticePlan) -> Self {
        Self {
            total_duration: plan_duration(&plan.details),
            schedule: section_timings(&plan.details),
            plan,
        }
    }
}

/// POST /api/practice-plans
///
/// The plan, its sections and items are stored as one unit.
pub async fn create_practice_plan(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PlanResponse>)> {
    let payload = json_body(body)?;
    let plan = validate_and_normalize_practice_plan(&payload)?;

    let stored = state.plans.insert(plan).await?;
    let response = PlanResponse::from(stored);
    debug!(
        "Created practice plan {} ({}), {} minutes",
        response.plan.id, response.plan.details.name, response.total_duration
    );

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/practice-plans
pub async fn list_practice_plans(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PlanResponse>>> {
    let plans = state.plans.list_all().await?;
    debug!("Listing {} practice plans", plans.len());
    Ok(Json(plans.into_iter().map(PlanResponse::from).collect()))
}

/// GET /api/practice-plans/:id
pub async fn get_practice_plan(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<PlanResponse>> {
    let plan = state.plans.get_by_id(path_id(id)?).await?;
    Ok(Json(PlanResponse::from(plan)))
}

/// POST /api/practice-plans/:id/duplicate
///
/// Responds 201 with the stored copy, named `"<name> (Copy)"`.
pub async fn duplicate_practice_plan(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<(StatusCode, Json<PlanResponse>)> {
    let copy = state.plans.duplicate(path_id(id)?).await?;
    Ok((StatusCode::CREATED, Json(PlanResponse::from(copy))))
}
