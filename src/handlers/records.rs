//! # Generic Record Deletion
//!
//! One admin endpoint deleting a record by target kind and ID. The target
//! tag parses into a closed enum, so a request can never name a table this
//! endpoint was not written for.

use std::str::FromStr;

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{CurrentMember, require_role};
use crate::error::{ApiError, validation_error};
use crate::repositories::{ClassSessionRepository, MembershipRepository, PlanRepository};
use crate::roles::Role;
use crate::server::AppState;

/// The record kinds the generic delete endpoint accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeleteTarget {
    Plan,
    Membership,
    Class,
}

impl FromStr for DeleteTarget {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plan" => Ok(Self::Plan),
            "membership" => Ok(Self::Membership),
            "class" => Ok(Self::Class),
            _ => Err(()),
        }
    }
}

/// Delete a plan, membership, or class session by ID (admin)
#[utoipa::path(
    delete,
    path = "/api/v1/admin/records/{target}/{id}",
    security(("bearer_auth" = [])),
    params(
        ("target" = String, Path, description = "One of: plan, membership, class"),
        ("id" = Uuid, Path, description = "Record UUID")
    ),
    responses(
        (status = 204, description = "Record deleted"),
        (status = 400, description = "Unknown target kind", body = ApiError),
        (status = 403, description = "Admin only", body = ApiError),
        (status = 404, description = "Record not found", body = ApiError),
        (status = 409, description = "Record still referenced", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn delete_record(
    State(state): State<AppState>,
    current: CurrentMember,
    Path((target, record_id)): Path<(String, Uuid)>,
) -> Result<StatusCode, ApiError> {
    require_role(&current, &[Role::Admin])?;

    let target: DeleteTarget = target.parse().map_err(|_| {
        validation_error(
            "Unknown delete target",
            serde_json::json!({
                "target": target,
                "allowed": ["plan", "membership", "class"],
            }),
        )
    })?;

    match target {
        DeleteTarget::Plan => PlanRepository::new(&state.db).delete_plan(record_id).await?,
        DeleteTarget::Membership => {
            MembershipRepository::new(&state.db)
                .delete_membership(record_id)
                .await?
        }
        DeleteTarget::Class => {
            ClassSessionRepository::new(&state.db)
                .delete_session(record_id)
                .await?
        }
    }

    tracing::info!(?target, %record_id, "Record deleted by admin");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_tags_parse_into_the_closed_set() {
        assert_eq!("plan".parse(), Ok(DeleteTarget::Plan));
        assert_eq!("membership".parse(), Ok(DeleteTarget::Membership));
        assert_eq!("class".parse(), Ok(DeleteTarget::Class));
        assert_eq!("member".parse::<DeleteTarget>(), Err(()));
        assert_eq!("routine".parse::<DeleteTarget>(), Err(()));
        assert_eq!("Plan".parse::<DeleteTarget>(), Err(()));
    }
}
