//! # Plan Handlers
//!
//! Admin surface for the membership plan catalogue.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{CurrentMember, require_role};
use crate::error::ApiError;
use crate::handlers::types::PlanDto;
use crate::repositories::{CreatePlanRequest, PlanRepository, UpdatePlanRequest};
use crate::roles::Role;
use crate::server::AppState;

/// Request payload for creating a plan
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatePlanDto {
    #[schema(example = "PREMIUM")]
    pub name: String,
    /// Monthly price in cents
    pub price_cents: i64,
    /// Defaults to 30 days
    pub duration_days: Option<i32>,
    pub description: Option<String>,
}

/// Request payload for editing a plan
#[derive(Debug, Serialize, Deserialize, ToSchema, Default)]
pub struct UpdatePlanDto {
    pub name: Option<String>,
    pub price_cents: Option<i64>,
    pub duration_days: Option<i32>,
    pub description: Option<String>,
}

/// List all plans (admin)
#[utoipa::path(
    get,
    path = "/api/v1/admin/plans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Plan catalogue", body = [PlanDto]),
        (status = 403, description = "Admin only", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn list_plans(
    State(state): State<AppState>,
    current: CurrentMember,
) -> Result<Json<Vec<PlanDto>>, ApiError> {
    require_role(&current, &[Role::Admin])?;

    let plans = PlanRepository::new(&state.db).list_plans().await?;
    Ok(Json(plans.into_iter().map(PlanDto::from).collect()))
}

/// Create a plan (admin)
#[utoipa::path(
    post,
    path = "/api/v1/admin/plans",
    security(("bearer_auth" = [])),
    request_body = CreatePlanDto,
    responses(
        (status = 201, description = "Plan created", body = PlanDto),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 403, description = "Admin only", body = ApiError),
        (status = 409, description = "Plan name already exists", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn create_plan(
    State(state): State<AppState>,
    current: CurrentMember,
    Json(request): Json<CreatePlanDto>,
) -> Result<(StatusCode, Json<PlanDto>), ApiError> {
    require_role(&current, &[Role::Admin])?;

    let plan = PlanRepository::new(&state.db)
        .create_plan(CreatePlanRequest {
            name: request.name,
            price_cents: request.price_cents,
            duration_days: request.duration_days.unwrap_or(30),
            description: request.description,
        })
        .await?;

    tracing::info!(plan_id = %plan.id, "Plan created");

    Ok((StatusCode::CREATED, Json(plan.into())))
}

/// Edit a plan (admin)
#[utoipa::path(
    patch,
    path = "/api/v1/admin/plans/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Plan UUID")),
    request_body = UpdatePlanDto,
    responses(
        (status = 200, description = "Plan updated", body = PlanDto),
        (status = 403, description = "Admin only", body = ApiError),
        (status = 404, description = "Plan not found", body = ApiError),
        (status = 409, description = "Plan name already exists", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn update_plan(
    State(state): State<AppState>,
    current: CurrentMember,
    Path(plan_id): Path<Uuid>,
    Json(request): Json<UpdatePlanDto>,
) -> Result<Json<PlanDto>, ApiError> {
    require_role(&current, &[Role::Admin])?;

    let plan = PlanRepository::new(&state.db)
        .update_plan(
            plan_id,
            UpdatePlanRequest {
                name: request.name,
                price_cents: request.price_cents,
                duration_days: request.duration_days,
                description: request.description,
            },
        )
        .await?;

    Ok(Json(plan.into()))
}
