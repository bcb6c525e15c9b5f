//! # Routine Repository
//!
//! Trainer-authored workout routines assigned to members.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::member;
use crate::models::routine::{self, Entity as Routine, Model as RoutineModel};
use crate::roles::Role;

/// Request data for assigning a routine to a member
#[derive(Debug, Clone)]
pub struct AssignRoutineRequest {
    pub member_id: Uuid,
    pub trainer_id: Uuid,
    pub name: String,
    pub description: String,
    /// Defaults to today when absent
    pub assigned_date: Option<NaiveDate>,
}

/// Partial update for an existing routine
#[derive(Debug, Clone, Default)]
pub struct UpdateRoutineRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
}

/// Repository for routine database operations
pub struct RoutineRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> RoutineRepository<'a> {
    /// Create a new RoutineRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Assign a routine to a member. The target must hold the member role.
    pub async fn assign_routine(
        &self,
        request: AssignRoutineRequest,
    ) -> Result<RoutineModel, RepositoryError> {
        Self::validate_name(&request.name)?;

        let target = member::Entity::find_by_id(request.member_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::NotFound("Member not found".to_string()))?;

        if target.role != Role::Member {
            return Err(RepositoryError::validation_error(
                "Routines can only be assigned to member-role accounts",
            ));
        }

        let record = routine::ActiveModel {
            id: Set(Uuid::new_v4()),
            member_id: Set(target.id),
            trainer_id: Set(Some(request.trainer_id)),
            name: Set(request.name),
            description: Set(request.description),
            active: Set(true),
            assigned_date: Set(request
                .assigned_date
                .unwrap_or_else(|| Utc::now().date_naive())),
            created_at: Set(Utc::now().into()),
        };

        record
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Get a routine by ID
    pub async fn get_routine_by_id(
        &self,
        routine_id: Uuid,
    ) -> Result<Option<RoutineModel>, RepositoryError> {
        Routine::find_by_id(routine_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// List a member's routines, most recently assigned first
    pub async fn list_for_member(
        &self,
        member_id: Uuid,
    ) -> Result<Vec<RoutineModel>, RepositoryError> {
        Routine::find()
            .filter(routine::Column::MemberId.eq(member_id))
            .order_by_desc(routine::Column::AssignedDate)
            .order_by_desc(routine::Column::CreatedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// List every routine a trainer has authored, most recent first
    pub async fn list_for_trainer(
        &self,
        trainer_id: Uuid,
    ) -> Result<Vec<RoutineModel>, RepositoryError> {
        Routine::find()
            .filter(routine::Column::TrainerId.eq(trainer_id))
            .order_by_desc(routine::Column::AssignedDate)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Update an existing routine
    pub async fn update_routine(
        &self,
        routine_id: Uuid,
        request: UpdateRoutineRequest,
    ) -> Result<RoutineModel, RepositoryError> {
        let record = self
            .get_routine_by_id(routine_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Routine not found".to_string()))?;

        if let Some(name) = &request.name {
            Self::validate_name(name)?;
        }

        let mut active_record = record.into_active_model();
        if let Some(name) = request.name {
            active_record.name = Set(name);
        }
        if let Some(description) = request.description {
            active_record.description = Set(description);
        }
        if let Some(active) = request.active {
            active_record.active = Set(active);
        }

        active_record
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Delete a routine
    pub async fn delete_routine(&self, routine_id: Uuid) -> Result<(), RepositoryError> {
        let record = self
            .get_routine_by_id(routine_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Routine not found".to_string()))?;

        record
            .delete(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(())
    }

    fn validate_name(name: &str) -> Result<(), RepositoryError> {
        if name.trim().is_empty() {
            return Err(RepositoryError::validation_error(
                "Routine name cannot be empty",
            ));
        }
        if name.len() > 100 {
            return Err(RepositoryError::validation_error(
                "Routine name cannot exceed 100 characters",
            ));
        }
        Ok(())
    }
}
