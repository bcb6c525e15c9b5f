//! # Routine Handlers
//!
//! Trainer surface for authoring and assigning workout routines. The trainer
//! recorded on a routine is always the authenticated principal.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{CurrentMember, require_role};
use crate::error::{ApiError, forbidden, not_found};
use crate::handlers::types::RoutineDto;
use crate::repositories::{AssignRoutineRequest, RoutineRepository, UpdateRoutineRequest};
use crate::roles::Role;
use crate::server::AppState;

/// Request payload for assigning a routine
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignRoutineDto {
    /// Target account; must hold the member role
    pub member_id: Uuid,
    #[schema(example = "Strength block A")]
    pub name: String,
    pub description: String,
    /// Defaults to today
    pub assigned_date: Option<NaiveDate>,
}

/// Request payload for editing a routine
#[derive(Debug, Serialize, Deserialize, ToSchema, Default)]
pub struct UpdateRoutineDto {
    pub name: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
}

/// List routines authored by the authenticated trainer
#[utoipa::path(
    get,
    path = "/api/v1/routines",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Authored routines", body = [RoutineDto]),
        (status = 403, description = "Trainer or admin only", body = ApiError)
    ),
    tag = "routines"
)]
pub async fn list_authored_routines(
    State(state): State<AppState>,
    current: CurrentMember,
) -> Result<Json<Vec<RoutineDto>>, ApiError> {
    require_role(&current, &[Role::Trainer])?;

    let routines = RoutineRepository::new(&state.db)
        .list_for_trainer(current.0.id)
        .await?;

    Ok(Json(routines.into_iter().map(RoutineDto::from).collect()))
}

/// Assign a routine to a member
#[utoipa::path(
    post,
    path = "/api/v1/routines",
    security(("bearer_auth" = [])),
    request_body = AssignRoutineDto,
    responses(
        (status = 201, description = "Routine assigned", body = RoutineDto),
        (status = 400, description = "Target is not a member-role account", body = ApiError),
        (status = 403, description = "Trainer or admin only", body = ApiError),
        (status = 404, description = "Member not found", body = ApiError)
    ),
    tag = "routines"
)]
pub async fn assign_routine(
    State(state): State<AppState>,
    current: CurrentMember,
    Json(request): Json<AssignRoutineDto>,
) -> Result<(StatusCode, Json<RoutineDto>), ApiError> {
    require_role(&current, &[Role::Trainer])?;

    let routine = RoutineRepository::new(&state.db)
        .assign_routine(AssignRoutineRequest {
            member_id: request.member_id,
            trainer_id: current.0.id,
            name: request.name,
            description: request.description,
            assigned_date: request.assigned_date,
        })
        .await?;

    tracing::info!(routine_id = %routine.id, member_id = %routine.member_id, "Routine assigned");

    Ok((StatusCode::CREATED, Json(routine.into())))
}

/// Edit a routine; only the authoring trainer or an admin may touch it
#[utoipa::path(
    patch,
    path = "/api/v1/routines/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Routine UUID")),
    request_body = UpdateRoutineDto,
    responses(
        (status = 200, description = "Routine updated", body = RoutineDto),
        (status = 403, description = "Not the authoring trainer", body = ApiError),
        (status = 404, description = "Routine not found", body = ApiError)
    ),
    tag = "routines"
)]
pub async fn update_routine(
    State(state): State<AppState>,
    current: CurrentMember,
    Path(routine_id): Path<Uuid>,
    Json(request): Json<UpdateRoutineDto>,
) -> Result<Json<RoutineDto>, ApiError> {
    require_role(&current, &[Role::Trainer])?;

    let repo = RoutineRepository::new(&state.db);
    authorize_routine_access(&repo, routine_id, &current).await?;

    let routine = repo
        .update_routine(
            routine_id,
            UpdateRoutineRequest {
                name: request.name,
                description: request.description,
                active: request.active,
            },
        )
        .await?;

    Ok(Json(routine.into()))
}

/// Delete a routine; only the authoring trainer or an admin may touch it
#[utoipa::path(
    delete,
    path = "/api/v1/routines/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Routine UUID")),
    responses(
        (status = 204, description = "Routine deleted"),
        (status = 403, description = "Not the authoring trainer", body = ApiError),
        (status = 404, description = "Routine not found", body = ApiError)
    ),
    tag = "routines"
)]
pub async fn delete_routine(
    State(state): State<AppState>,
    current: CurrentMember,
    Path(routine_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_role(&current, &[Role::Trainer])?;

    let repo = RoutineRepository::new(&state.db);
    authorize_routine_access(&repo, routine_id, &current).await?;

    repo.delete_routine(routine_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn authorize_routine_access(
    repo: &RoutineRepository<'_>,
    routine_id: Uuid,
    current: &CurrentMember,
) -> Result<(), ApiError> {
    let routine = repo
        .get_routine_by_id(routine_id)
        .await?
        .ok_or_else(|| not_found("Routine not found"))?;

    if current.0.role != Role::Admin && routine.trainer_id != Some(current.0.id) {
        return Err(forbidden(Some(
            "Only the authoring trainer can modify this routine",
        )));
    }
    Ok(())
}
