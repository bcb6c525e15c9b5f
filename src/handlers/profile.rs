//! # Profile Handlers
//!
//! Self-service endpoints: dashboard, own profile, own membership and
//! routines. Role changes never happen here; that is the admin surface.

use axum::{extract::State, response::Json};
use chrono::{NaiveDate, Utc};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{CurrentMember, require_role};
use crate::error::{ApiError, not_found};
use crate::handlers::types::{MemberDto, MembershipDto, RoutineDto};
use crate::models::{class_session, enrollment, member, membership, plan, routine};
use crate::repositories::{
    MemberRepository, MembershipRepository, RoutineRepository, UpdateProfileRequest,
};
use crate::roles::Role;
use crate::server::AppState;

/// Role-specific dashboard summary
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum DashboardDto {
    Member {
        membership: Option<MembershipDto>,
        enrolled_classes: u64,
        routines: u64,
    },
    Trainer {
        students: u64,
        assigned_classes: u64,
        routines_authored: u64,
    },
    Admin {
        members: u64,
        plans: u64,
        classes: u64,
        memberships: u64,
    },
}

/// Request payload for profile edits; absent fields stay untouched
#[derive(Debug, Serialize, Deserialize, ToSchema, Default)]
pub struct UpdateProfileDto {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

/// Role-specific dashboard summary
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard summary", body = DashboardDto),
        (status = 401, description = "Not authenticated", body = ApiError)
    ),
    tag = "profile"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    CurrentMember(current): CurrentMember,
) -> Result<Json<DashboardDto>, ApiError> {
    let summary = match current.role {
        Role::Member => {
            let membership = MembershipRepository::new(&state.db)
                .get_membership_for_member(current.id)
                .await?
                .map(|(model, plan)| {
                    MembershipDto::from_model(model, plan, Utc::now().date_naive())
                });
            let enrolled_classes = enrollment::Entity::find()
                .filter(enrollment::Column::MemberId.eq(current.id))
                .count(&state.db)
                .await?;
            let routines = routine::Entity::find()
                .filter(routine::Column::MemberId.eq(current.id))
                .count(&state.db)
                .await?;
            DashboardDto::Member {
                membership,
                enrolled_classes,
                routines,
            }
        }
        Role::Trainer => {
            let students = member::Entity::find()
                .filter(member::Column::Role.eq(Role::Member))
                .filter(member::Column::Active.eq(true))
                .count(&state.db)
                .await?;
            let assigned_classes = class_session::Entity::find()
                .filter(class_session::Column::TrainerId.eq(current.id))
                .count(&state.db)
                .await?;
            let routines_authored = routine::Entity::find()
                .filter(routine::Column::TrainerId.eq(current.id))
                .count(&state.db)
                .await?;
            DashboardDto::Trainer {
                students,
                assigned_classes,
                routines_authored,
            }
        }
        Role::Admin => DashboardDto::Admin {
            members: member::Entity::find().count(&state.db).await?,
            plans: plan::Entity::find().count(&state.db).await?,
            classes: class_session::Entity::find().count(&state.db).await?,
            memberships: membership::Entity::find().count(&state.db).await?,
        },
    };

    Ok(Json(summary))
}

/// Get the authenticated account's profile
#[utoipa::path(
    get,
    path = "/api/v1/me/profile",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own profile", body = MemberDto),
        (status = 401, description = "Not authenticated", body = ApiError)
    ),
    tag = "profile"
)]
pub async fn get_profile(CurrentMember(current): CurrentMember) -> Json<MemberDto> {
    Json(current.into())
}

/// Edit the authenticated account's profile (never the role)
#[utoipa::path(
    patch,
    path = "/api/v1/me/profile",
    security(("bearer_auth" = [])),
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Updated profile", body = MemberDto),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Not authenticated", body = ApiError)
    ),
    tag = "profile"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentMember(current): CurrentMember,
    Json(request): Json<UpdateProfileDto>,
) -> Result<Json<MemberDto>, ApiError> {
    let updated = MemberRepository::new(&state.db)
        .update_profile(
            current.id,
            UpdateProfileRequest {
                email: request.email,
                first_name: request.first_name,
                last_name: request.last_name,
                phone: request.phone,
                birth_date: request.birth_date,
            },
        )
        .await?;

    Ok(Json(updated.into()))
}

/// Get the authenticated member's membership with its derived expiry state
#[utoipa::path(
    get,
    path = "/api/v1/me/membership",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own membership", body = MembershipDto),
        (status = 403, description = "Not a member-role account", body = ApiError),
        (status = 404, description = "No membership assigned", body = ApiError)
    ),
    tag = "profile"
)]
pub async fn get_my_membership(
    State(state): State<AppState>,
    current: CurrentMember,
) -> Result<Json<MembershipDto>, ApiError> {
    require_role(&current, &[Role::Member])?;

    let (model, plan) = MembershipRepository::new(&state.db)
        .get_membership_for_member(current.0.id)
        .await?
        .ok_or_else(|| not_found("No membership assigned"))?;

    Ok(Json(MembershipDto::from_model(
        model,
        plan,
        Utc::now().date_naive(),
    )))
}

/// List the authenticated member's routines, current first
#[utoipa::path(
    get,
    path = "/api/v1/me/routines",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own routines", body = [RoutineDto]),
        (status = 403, description = "Not a member-role account", body = ApiError)
    ),
    tag = "profile"
)]
pub async fn get_my_routines(
    State(state): State<AppState>,
    current: CurrentMember,
) -> Result<Json<Vec<RoutineDto>>, ApiError> {
    require_role(&current, &[Role::Member])?;

    let routines = RoutineRepository::new(&state.db)
        .list_for_member(current.0.id)
        .await?;

    Ok(Json(routines.into_iter().map(RoutineDto::from).collect()))
}
