//! Client for submitting drills and practice plans to a running service
//!
//! Payloads are validated with the same rules the service applies before
//! anything is sent, so most mistakes never leave the machine.

use qdrill_common::models::Drill;
use qdrill_common::validation::{validate_and_normalize_drill, validate_and_normalize_practice_plan};
use qdrill_common::{FieldErrors, ValidationRules};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::api::PlanResponse;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Rejected locally or by the service (400 with field errors)
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Service answered 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success answer
    #[error("Service returned {status}: {message}")]
    Rejected { status: u16, message: String },

    /// Transport or decoding failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<FieldErrors> for ClientError {
    fn from(errors: FieldErrors) -> Self {
        ClientError::Validation(errors)
    }
}

/// Error body produced by the service
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    details: Option<FieldErrors>,
}

/// HTTP client for the drill and practice plan API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    rules: ValidationRules,
}

impl ApiClient {
    /// Client for the service at `base_url` (e.g. `http://127.0.0.1:5000`)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            rules: ValidationRules::default(),
        }
    }

    /// Apply stricter local validation to match a service that enforces it
    pub fn with_rules(mut self, rules: ValidationRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Validate locally, then POST /api/drills
    pub async fn create_drill(&self, payload: &Value) -> Result<Drill, ClientError> {
        let drill = validate_and_normalize_drill(payload, &self.rules)?;
        let url = format!("{}/api/drills", self.base_url);
        debug!("POST {}", url);

        let response = self.http.post(&url).json(&drill).send().await?;
        let stored: Drill = read_response(response).await?;
        info!("Submitted drill {} ({})", stored.id, stored.details.name);
        Ok(stored)
    }

    /// Validate locally, then POST /api/practice-plans
    pub async fn create_practice_plan(&self, payload: &Value) -> Result<PlanResponse, ClientError> {
        let plan = validate_and_normalize_practice_plan(payload)?;
        let url = format!("{}/api/practice-plans", self.base_url);
        debug!("POST {}", url);

        let response = self.http.post(&url).json(&plan).send().await?;
        let stored: PlanResponse = read_response(response).await?;
        info!(
            "Submitted practice plan {} ({})",
            stored.plan.id, stored.plan.details.name
        );
        Ok(stored)
    }

    /// GET /api/practice-plans/:id
    pub async fn get_practice_plan(&self, id: i64) -> Result<PlanResponse, ClientError> {
        let url = format!("{}/api/practice-plans/{}", self.base_url, id);
        debug!("GET {}", url);

        let response = self.http.get(&url).send().await?;
        read_response(response).await
    }
}

async fn read_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let text = response.text().await?;
    let envelope = serde_json::from_str::<ErrorEnvelope>(&text).ok();

    match (status, envelope) {
        (StatusCode::BAD_REQUEST, Some(ErrorEnvelope { error: ErrorBody { details: Some(details), .. } })) => {
            Err(ClientError::Validation(details))
        }
        (StatusCode::NOT_FOUND, envelope) => Err(ClientError::NotFound(
            envelope.map(|e| e.error.message).unwrap_or(text),
        )),
        (status, envelope) => Err(ClientError::Rejected {
            status: status.as_u16(),
            message: envelope.map(|e| e.error.message).unwrap_or(text),
        }),
    }
}
