//! HTTP API handlers for qdrill-api

pub mod drills;
pub mod health;
pub mod practice_plans;

pub use drills::{create_drill, get_drill, list_drills};
pub use health::health_routes;
pub use practice_plans::{
    create_practice_plan, duplicate_practice_plan, get_practice_plan, list_practice_plans,
    PlanResponse,
};

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::Path;
use axum::Json;
use serde_json::Value;

use crate::error::ApiError;

/// Unwrap a JSON body, turning axum's rejection into a 400
///
/// Handlers take `Value` rather than a typed body so the validator can report
/// every field problem at once.
pub(crate) fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Unwrap a numeric `:id` segment; anything else is a JSON 400
pub(crate) fn path_id(id: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    id.map(|Path(id)| id)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}
