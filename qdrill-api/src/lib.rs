//! qdrill-api library - drill and practice plan HTTP service
//!
//! Thin HTTP wrapper over the validator, the duration calculator and the
//! SQLite repositories in `qdrill-common`, plus a client for submitting
//! payloads to a running service.

use axum::Router;
use qdrill_common::db::{DrillRepository, PracticePlanRepository};
use qdrill_common::ValidationRules;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod client;
pub mod error;

pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub drills: DrillRepository,
    pub plans: PracticePlanRepository,
    /// Deployment-level validation switches
    pub rules: ValidationRules,
}

impl AppState {
    /// Create new application state over one database pool
    pub fn new(db: SqlitePool, rules: ValidationRules) -> Self {
        Self {
            drills: DrillRepository::new(db.clone()),
            plans: PracticePlanRepository::new(db),
            rules,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/api/drills", get(api::list_drills).post(api::create_drill))
        .route("/api/drills/:id", get(api::get_drill))
        .route(
            "/api/practice-plans",
            get(api::list_practice_plans).post(api::create_practice_plan),
        )
        .route("/api/practice-plans/:id", get(api::get_practice_plan))
        .route(
            "/api/practice-plans/:id/duplicate",
            post(api::duplicate_practice_plan),
        )
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
