//! # Membership Repository
//!
//! Assignment of plans to members. At most one membership per member; the
//! validity window is computed from the plan's duration at assignment time
//! and expiry is always derived at read time (`crate::expiry`).

use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::error::{RepositoryError, is_unique_violation};
use crate::models::membership::{self, Entity as Membership, Model as MembershipModel};
use crate::models::{member, plan};

/// Request data for assigning a plan to a member
#[derive(Debug, Clone)]
pub struct AssignMembershipRequest {
    pub member_id: Uuid,
    pub plan_id: Uuid,
    /// Defaults to today when absent
    pub start_date: Option<NaiveDate>,
}

/// Partial update for an existing membership
#[derive(Debug, Clone, Default)]
pub struct UpdateMembershipRequest {
    pub plan_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub active: Option<bool>,
}

/// Repository for membership database operations
pub struct MembershipRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> MembershipRepository<'a> {
    /// Create a new MembershipRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Assign a plan to a member, creating their membership.
    ///
    /// The expiry date is inclusive: a 30-day plan starting today is valid
    /// today plus the next 29 days.
    pub async fn assign_membership(
        &self,
        request: AssignMembershipRequest,
    ) -> Result<MembershipModel, RepositoryError> {
        let target = member::Entity::find_by_id(request.member_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::NotFound("Member not found".to_string()))?;

        let chosen_plan = plan::Entity::find_by_id(request.plan_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::NotFound("Plan not found".to_string()))?;

        let start_date = request
            .start_date
            .unwrap_or_else(|| Utc::now().date_naive());
        let expiry_date = start_date + Duration::days(i64::from(chosen_plan.duration_days) - 1);

        let record = membership::ActiveModel {
            id: Set(Uuid::new_v4()),
            member_id: Set(target.id),
            plan_id: Set(chosen_plan.id),
            start_date: Set(start_date),
            expiry_date: Set(expiry_date),
            active: Set(true),
            created_at: Set(Utc::now().into()),
        };

        record.insert(self.db).await.map_err(|err| {
            if is_unique_violation(&err) {
                RepositoryError::Conflict("Member already has a membership".to_string())
            } else {
                RepositoryError::database_error(err)
            }
        })
    }

    /// Get a membership by ID
    pub async fn get_membership_by_id(
        &self,
        membership_id: Uuid,
    ) -> Result<Option<MembershipModel>, RepositoryError> {
        Membership::find_by_id(membership_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Get a member's membership together with its plan
    pub async fn get_membership_for_member(
        &self,
        member_id: Uuid,
    ) -> Result<Option<(MembershipModel, Option<plan::Model>)>, RepositoryError> {
        Membership::find()
            .filter(membership::Column::MemberId.eq(member_id))
            .find_also_related(plan::Entity)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// List all memberships with their plans, newest first
    pub async fn list_memberships(
        &self,
    ) -> Result<Vec<(MembershipModel, Option<plan::Model>)>, RepositoryError> {
        Membership::find()
            .find_also_related(plan::Entity)
            .order_by_desc(membership::Column::CreatedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Update an existing membership.
    ///
    /// Changing the plan without supplying an explicit expiry recomputes the
    /// window from the new plan's duration (a renewal onto the new plan).
    pub async fn update_membership(
        &self,
        membership_id: Uuid,
        request: UpdateMembershipRequest,
    ) -> Result<MembershipModel, RepositoryError> {
        let record = self
            .get_membership_by_id(membership_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Membership not found".to_string()))?;

        let start_date = request.start_date.unwrap_or(record.start_date);
        let mut expiry_date = request.expiry_date;

        if let Some(plan_id) = request.plan_id {
            let chosen_plan = plan::Entity::find_by_id(plan_id)
                .one(self.db)
                .await
                .map_err(RepositoryError::database_error)?
                .ok_or_else(|| RepositoryError::NotFound("Plan not found".to_string()))?;
            if expiry_date.is_none() {
                expiry_date =
                    Some(start_date + Duration::days(i64::from(chosen_plan.duration_days) - 1));
            }
        }

        let mut active_record = record.into_active_model();
        if let Some(plan_id) = request.plan_id {
            active_record.plan_id = Set(plan_id);
        }
        active_record.start_date = Set(start_date);
        if let Some(expiry_date) = expiry_date {
            active_record.expiry_date = Set(expiry_date);
        }
        if let Some(active) = request.active {
            active_record.active = Set(active);
        }

        active_record
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Delete a membership
    pub async fn delete_membership(&self, membership_id: Uuid) -> Result<(), RepositoryError> {
        let record = self
            .get_membership_by_id(membership_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Membership not found".to_string()))?;

        record
            .delete(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(())
    }
}
