//! # Plan Repository
//!
//! CRUD operations for the membership plan catalogue.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait, QueryOrder, Set,
};
use sea_orm::{ColumnTrait, QueryFilter};
use uuid::Uuid;

use crate::error::{RepositoryError, is_unique_violation};
use crate::models::plan::{self, Entity as Plan, Model as PlanModel};

/// Request data for creating a new plan
#[derive(Debug, Clone)]
pub struct CreatePlanRequest {
    pub name: String,
    pub price_cents: i64,
    pub duration_days: i32,
    pub description: Option<String>,
}

/// Partial update for an existing plan
#[derive(Debug, Clone, Default)]
pub struct UpdatePlanRequest {
    pub name: Option<String>,
    pub price_cents: Option<i64>,
    pub duration_days: Option<i32>,
    pub description: Option<String>,
}

/// Repository for plan database operations
pub struct PlanRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> PlanRepository<'a> {
    /// Create a new PlanRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a new plan
    pub async fn create_plan(
        &self,
        request: CreatePlanRequest,
    ) -> Result<PlanModel, RepositoryError> {
        Self::validate_plan(&request.name, request.price_cents, request.duration_days)?;

        let record = plan::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            price_cents: Set(request.price_cents),
            duration_days: Set(request.duration_days),
            description: Set(request.description),
            created_at: Set(Utc::now().into()),
        };

        record.insert(self.db).await.map_err(|err| {
            if is_unique_violation(&err) {
                RepositoryError::Conflict("A plan with this name already exists".to_string())
            } else {
                RepositoryError::database_error(err)
            }
        })
    }

    /// Get a plan by ID
    pub async fn get_plan_by_id(&self, plan_id: Uuid) -> Result<Option<PlanModel>, RepositoryError> {
        Plan::find_by_id(plan_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Get a plan by its unique name
    pub async fn get_plan_by_name(&self, name: &str) -> Result<Option<PlanModel>, RepositoryError> {
        Plan::find()
            .filter(plan::Column::Name.eq(name))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// List all plans, cheapest first
    pub async fn list_plans(&self) -> Result<Vec<PlanModel>, RepositoryError> {
        Plan::find()
            .order_by_asc(plan::Column::PriceCents)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Update an existing plan
    pub async fn update_plan(
        &self,
        plan_id: Uuid,
        request: UpdatePlanRequest,
    ) -> Result<PlanModel, RepositoryError> {
        let record = self
            .get_plan_by_id(plan_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Plan not found".to_string()))?;

        let name = request.name.clone().unwrap_or_else(|| record.name.clone());
        let price_cents = request.price_cents.unwrap_or(record.price_cents);
        let duration_days = request.duration_days.unwrap_or(record.duration_days);
        Self::validate_plan(&name, price_cents, duration_days)?;

        let mut active_record = record.into_active_model();
        if let Some(name) = request.name {
            active_record.name = Set(name);
        }
        if let Some(price_cents) = request.price_cents {
            active_record.price_cents = Set(price_cents);
        }
        if let Some(duration_days) = request.duration_days {
            active_record.duration_days = Set(duration_days);
        }
        if let Some(description) = request.description {
            active_record.description = Set(Some(description));
        }

        active_record.update(self.db).await.map_err(|err| {
            if is_unique_violation(&err) {
                RepositoryError::Conflict("A plan with this name already exists".to_string())
            } else {
                RepositoryError::database_error(err)
            }
        })
    }

    /// Delete a plan. Fails with a conflict while memberships reference it.
    pub async fn delete_plan(&self, plan_id: Uuid) -> Result<(), RepositoryError> {
        let record = self
            .get_plan_by_id(plan_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Plan not found".to_string()))?;

        record.delete(self.db).await.map_err(|err| {
            // The plan FK on memberships is RESTRICT.
            RepositoryError::Conflict(format!("Plan is still in use: {err}"))
        })?;

        Ok(())
    }

    fn validate_plan(
        name: &str,
        price_cents: i64,
        duration_days: i32,
    ) -> Result<(), RepositoryError> {
        if name.trim().is_empty() {
            return Err(RepositoryError::validation_error(
                "Plan name cannot be empty",
            ));
        }
        if name.len() > 100 {
            return Err(RepositoryError::validation_error(
                "Plan name cannot exceed 100 characters",
            ));
        }
        if price_cents < 0 {
            return Err(RepositoryError::validation_error(
                "Plan price cannot be negative",
            ));
        }
        if duration_days < 1 {
            return Err(RepositoryError::validation_error(
                "Plan duration must be at least one day",
            ));
        }
        Ok(())
    }
}
