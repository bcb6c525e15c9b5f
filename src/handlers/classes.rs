//! # Class Handlers
//!
//! The class schedule, member enrollment, and the admin schedule surface.
//! Enrollment writes go through the coordinator; the handlers only translate
//! its verdicts to HTTP.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{CurrentMember, require_role};
use crate::enrollment::EnrollmentCoordinator;
use crate::error::ApiError;
use crate::handlers::types::ClassSessionDto;
use crate::models::class_session::Weekday;
use crate::repositories::{
    ClassSessionRepository, CreateClassSessionRequest, EnrollmentRepository,
    UpdateClassSessionRequest,
};
use crate::roles::Role;
use crate::server::AppState;

/// Request payload for creating a class session
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateClassSessionDto {
    #[schema(example = "Yoga")]
    pub name: String,
    pub weekday: Weekday,
    #[schema(example = "18:00:00")]
    pub start_time: NaiveTime,
    /// Defaults to 20 seats
    pub capacity: Option<i32>,
    pub trainer_id: Option<Uuid>,
}

/// Request payload for editing a class session
#[derive(Debug, Serialize, Deserialize, ToSchema, Default)]
pub struct UpdateClassSessionDto {
    pub name: Option<String>,
    pub weekday: Option<Weekday>,
    pub start_time: Option<NaiveTime>,
    pub capacity: Option<i32>,
    /// Explicit null clears the trainer assignment; absent leaves it alone
    #[serde(default, deserialize_with = "deserialize_explicit_null")]
    #[schema(value_type = Option<Uuid>)]
    pub trainer_id: Option<Option<Uuid>>,
}

/// Distinguishes an absent field (outer `None`) from an explicit JSON null
/// (inner `None`).
fn deserialize_explicit_null<'de, D>(deserializer: D) -> Result<Option<Option<Uuid>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<Uuid>::deserialize(deserializer).map(Some)
}

const DEFAULT_CAPACITY: i32 = 20;

/// List the class schedule with live seat counts
#[utoipa::path(
    get,
    path = "/api/v1/classes",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Class schedule", body = [ClassSessionDto]),
        (status = 401, description = "Not authenticated", body = ApiError)
    ),
    tag = "classes"
)]
pub async fn list_classes(
    State(state): State<AppState>,
    CurrentMember(current): CurrentMember,
) -> Result<Json<Vec<ClassSessionDto>>, ApiError> {
    let sessions = ClassSessionRepository::new(&state.db)
        .list_sessions_with_counts()
        .await?;
    let mine = EnrollmentRepository::new(&state.db)
        .session_ids_for_member(current.id)
        .await?;

    Ok(Json(
        sessions
            .into_iter()
            .map(|(session, enrolled)| {
                let enrolled_by_me = mine.contains(&session.id);
                ClassSessionDto::from_model(session, enrolled, enrolled_by_me)
            })
            .collect(),
    ))
}

/// Enroll the authenticated member into a class session
#[utoipa::path(
    post,
    path = "/api/v1/classes/{id}/enroll",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Class session UUID")),
    responses(
        (status = 201, description = "Seat claimed"),
        (status = 403, description = "Not an active member account", body = ApiError),
        (status = 404, description = "Class session not found", body = ApiError),
        (status = 409, description = "Already enrolled or class full", body = ApiError)
    ),
    tag = "classes"
)]
pub async fn enroll(
    State(state): State<AppState>,
    CurrentMember(current): CurrentMember,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    EnrollmentCoordinator::new(&state.db)
        .enroll(current.id, session_id)
        .await?;

    Ok(StatusCode::CREATED)
}

/// Cancel the authenticated member's enrollment
#[utoipa::path(
    delete,
    path = "/api/v1/classes/{id}/enroll",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Class session UUID")),
    responses(
        (status = 204, description = "Enrollment cancelled"),
        (status = 404, description = "Not enrolled in this class", body = ApiError)
    ),
    tag = "classes"
)]
pub async fn cancel_enrollment(
    State(state): State<AppState>,
    CurrentMember(current): CurrentMember,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    EnrollmentCoordinator::new(&state.db)
        .cancel(current.id, session_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Create a class session (admin)
#[utoipa::path(
    post,
    path = "/api/v1/admin/classes",
    security(("bearer_auth" = [])),
    request_body = CreateClassSessionDto,
    responses(
        (status = 201, description = "Class session created", body = ClassSessionDto),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 403, description = "Admin only", body = ApiError),
        (status = 409, description = "Schedule slot already taken", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn create_class(
    State(state): State<AppState>,
    current: CurrentMember,
    Json(request): Json<CreateClassSessionDto>,
) -> Result<(StatusCode, Json<ClassSessionDto>), ApiError> {
    require_role(&current, &[Role::Admin])?;

    let session = ClassSessionRepository::new(&state.db)
        .create_session(CreateClassSessionRequest {
            name: request.name,
            weekday: request.weekday,
            start_time: request.start_time,
            capacity: request.capacity.unwrap_or(DEFAULT_CAPACITY),
            trainer_id: request.trainer_id,
        })
        .await?;

    tracing::info!(session_id = %session.id, "Class session created");

    Ok((
        StatusCode::CREATED,
        Json(ClassSessionDto::from_model(session, 0, false)),
    ))
}

/// Edit a class session (admin)
#[utoipa::path(
    patch,
    path = "/api/v1/admin/classes/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Class session UUID")),
    request_body = UpdateClassSessionDto,
    responses(
        (status = 200, description = "Class session updated", body = ClassSessionDto),
        (status = 403, description = "Admin only", body = ApiError),
        (status = 404, description = "Class session not found", body = ApiError),
        (status = 409, description = "Conflict with schedule or enrollments", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn update_class(
    State(state): State<AppState>,
    current: CurrentMember,
    Path(session_id): Path<Uuid>,
    Json(request): Json<UpdateClassSessionDto>,
) -> Result<Json<ClassSessionDto>, ApiError> {
    require_role(&current, &[Role::Admin])?;

    let repo = ClassSessionRepository::new(&state.db);
    let session = repo
        .update_session(
            session_id,
            UpdateClassSessionRequest {
                name: request.name,
                weekday: request.weekday,
                start_time: request.start_time,
                capacity: request.capacity,
                trainer_id: request.trainer_id,
            },
        )
        .await?;
    let enrolled = repo.enrolled_count(session.id).await?;

    Ok(Json(ClassSessionDto::from_model(session, enrolled, false)))
}
