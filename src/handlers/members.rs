//! # Member Handlers
//!
//! The trainer-facing student roster and the admin account surface.

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{CurrentMember, require_role};
use crate::error::{ApiError, validation_error};
use crate::handlers::types::MemberDto;
use crate::repositories::{MemberRepository, UpdateMemberAdminRequest};
use crate::roles::Role;
use crate::server::AppState;

/// Admin request payload for account changes
#[derive(Debug, Serialize, Deserialize, ToSchema, Default)]
pub struct UpdateMemberAdminDto {
    pub role: Option<Role>,
    /// Set false to deactivate the account; accounts are never hard-deleted
    pub active: Option<bool>,
}

/// List active member-role accounts (trainer's student roster)
#[utoipa::path(
    get,
    path = "/api/v1/students",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active students", body = [MemberDto]),
        (status = 403, description = "Trainer or admin only", body = ApiError)
    ),
    tag = "members"
)]
pub async fn list_students(
    State(state): State<AppState>,
    current: CurrentMember,
) -> Result<Json<Vec<MemberDto>>, ApiError> {
    require_role(&current, &[Role::Trainer])?;

    let students = MemberRepository::new(&state.db).list_students().await?;
    Ok(Json(students.into_iter().map(MemberDto::from).collect()))
}

/// List every account (admin)
#[utoipa::path(
    get,
    path = "/api/v1/admin/members",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All accounts", body = [MemberDto]),
        (status = 403, description = "Admin only", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn list_members(
    State(state): State<AppState>,
    current: CurrentMember,
) -> Result<Json<Vec<MemberDto>>, ApiError> {
    require_role(&current, &[Role::Admin])?;

    let members = MemberRepository::new(&state.db).list_members().await?;
    Ok(Json(members.into_iter().map(MemberDto::from).collect()))
}

/// Change an account's role or deactivate it (admin)
#[utoipa::path(
    patch,
    path = "/api/v1/admin/members/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Member UUID")),
    request_body = UpdateMemberAdminDto,
    responses(
        (status = 200, description = "Updated account", body = MemberDto),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 403, description = "Admin only", body = ApiError),
        (status = 404, description = "Member not found", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn update_member(
    State(state): State<AppState>,
    current: CurrentMember,
    Path(member_id): Path<Uuid>,
    Json(request): Json<UpdateMemberAdminDto>,
) -> Result<Json<MemberDto>, ApiError> {
    require_role(&current, &[Role::Admin])?;

    // Admins cannot lock themselves out.
    if member_id == current.0.id && request.active == Some(false) {
        return Err(validation_error(
            "Cannot deactivate your own account",
            serde_json::json!({ "active": "Ask another administrator" }),
        ));
    }

    let updated = MemberRepository::new(&state.db)
        .update_member_admin(
            member_id,
            UpdateMemberAdminRequest {
                role: request.role,
                active: request.active,
            },
        )
        .await?;

    tracing::info!(member_id = %updated.id, role = ?updated.role, active = updated.active, "Account updated by admin");

    Ok(Json(updated.into()))
}
