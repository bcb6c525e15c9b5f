//! # Membership Handlers
//!
//! Admin surface for assigning plans to members. A member holds at most one
//! membership; a second assignment is rejected with a conflict pointing the
//! caller at the edit endpoint.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{NaiveDate, Utc};
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{CurrentMember, require_role};
use crate::error::{ApiError, RepositoryError, conflict};
use crate::handlers::types::MembershipDto;
use crate::repositories::{
    AssignMembershipRequest, MembershipRepository, UpdateMembershipRequest,
};
use crate::roles::Role;
use crate::server::AppState;

/// Request payload for assigning a plan to a member
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignMembershipDto {
    pub member_id: Uuid,
    pub plan_id: Uuid,
    /// Defaults to today
    pub start_date: Option<NaiveDate>,
}

/// Request payload for editing a membership
#[derive(Debug, Serialize, Deserialize, ToSchema, Default)]
pub struct UpdateMembershipDto {
    pub plan_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub active: Option<bool>,
}

/// List all memberships with derived expiry state (admin)
#[utoipa::path(
    get,
    path = "/api/v1/admin/memberships",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All memberships", body = [MembershipDto]),
        (status = 403, description = "Admin only", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn list_memberships(
    State(state): State<AppState>,
    current: CurrentMember,
) -> Result<Json<Vec<MembershipDto>>, ApiError> {
    require_role(&current, &[Role::Admin])?;

    let today = Utc::now().date_naive();
    let memberships = MembershipRepository::new(&state.db).list_memberships().await?;

    Ok(Json(
        memberships
            .into_iter()
            .map(|(model, plan)| MembershipDto::from_model(model, plan, today))
            .collect(),
    ))
}

/// Assign a plan to a member (admin)
#[utoipa::path(
    post,
    path = "/api/v1/admin/memberships",
    security(("bearer_auth" = [])),
    request_body = AssignMembershipDto,
    responses(
        (status = 201, description = "Membership assigned", body = MembershipDto),
        (status = 403, description = "Admin only", body = ApiError),
        (status = 404, description = "Member or plan not found", body = ApiError),
        (status = 409, description = "Member already has a membership", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn assign_membership(
    State(state): State<AppState>,
    current: CurrentMember,
    Json(request): Json<AssignMembershipDto>,
) -> Result<(StatusCode, Json<MembershipDto>), ApiError> {
    require_role(&current, &[Role::Admin])?;

    let repo = MembershipRepository::new(&state.db);
    let membership = repo
        .assign_membership(AssignMembershipRequest {
            member_id: request.member_id,
            plan_id: request.plan_id,
            start_date: request.start_date,
        })
        .await
        .map_err(|err| match err {
            RepositoryError::Conflict(_) => conflict(
                "Member already has a membership; edit the existing one instead",
                "duplicate_membership",
            ),
            other => other.into(),
        })?;

    tracing::info!(membership_id = %membership.id, member_id = %request.member_id, "Membership assigned");

    let plan = crate::models::plan::Entity::find_by_id(membership.plan_id)
        .one(&state.db)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MembershipDto::from_model(
            membership,
            plan,
            Utc::now().date_naive(),
        )),
    ))
}

/// Edit a membership (admin)
#[utoipa::path(
    patch,
    path = "/api/v1/admin/memberships/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Membership UUID")),
    request_body = UpdateMembershipDto,
    responses(
        (status = 200, description = "Membership updated", body = MembershipDto),
        (status = 403, description = "Admin only", body = ApiError),
        (status = 404, description = "Membership not found", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn update_membership(
    State(state): State<AppState>,
    current: CurrentMember,
    Path(membership_id): Path<Uuid>,
    Json(request): Json<UpdateMembershipDto>,
) -> Result<Json<MembershipDto>, ApiError> {
    require_role(&current, &[Role::Admin])?;

    let membership = MembershipRepository::new(&state.db)
        .update_membership(
            membership_id,
            UpdateMembershipRequest {
                plan_id: request.plan_id,
                start_date: request.start_date,
                expiry_date: request.expiry_date,
                active: request.active,
            },
        )
        .await?;

    let plan = crate::models::plan::Entity::find_by_id(membership.plan_id)
        .one(&state.db)
        .await?;

    Ok(Json(MembershipDto::from_model(
        membership,
        plan,
        Utc::now().date_naive(),
    )))
}
