//! # API Handlers
//!
//! HTTP endpoint handlers for the gymhub API.

use axum::extract::State;
use axum::response::Json;

use crate::error::{ApiError, ErrorType};
use crate::models::ServiceInfo;
use crate::server::AppState;

pub mod auth;
pub mod classes;
pub mod members;
pub mod memberships;
pub mod plans;
pub mod profile;
pub mod records;
pub mod routines;
pub mod types;

/// Root handler that returns basic service information
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    ),
    tag = "root"
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}

/// Health check verifying database connectivity
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service healthy"),
        (status = 503, description = "Database unavailable", body = ApiError)
    ),
    tag = "root"
)]
pub async fn health(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    crate::db::health_check(&state.db)
        .await
        .map_err(|err| {
            tracing::error!("Health check failed: {:?}", err);
            ApiError::from(ErrorType::ServiceUnavailable)
        })?;

    Ok(Json(serde_json::json!({ "status": "ok" })))
}
