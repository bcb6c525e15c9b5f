//! Shared response DTOs used across handler modules.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::class_session::Weekday;
use crate::models::{class_session, member, membership, plan, routine};
use crate::roles::Role;

/// Public view of a member account; never exposes the password hash
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MemberDto {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub role: Role,
    pub active: bool,
    pub created_at: String,
}

impl From<member::Model> for MemberDto {
    fn from(model: member::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            phone: model.phone,
            birth_date: model.birth_date,
            role: model.role,
            active: model.active,
            created_at: model.created_at.to_rfc3339(),
        }
    }
}

/// Membership plan view
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlanDto {
    pub id: Uuid,
    pub name: String,
    pub price_cents: i64,
    pub duration_days: i32,
    pub description: Option<String>,
}

impl From<plan::Model> for PlanDto {
    fn from(model: plan::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            price_cents: model.price_cents,
            duration_days: model.duration_days,
            description: model.description,
        }
    }
}

/// Membership view with the expiry state derived at read time
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MembershipDto {
    pub id: Uuid,
    pub member_id: Uuid,
    pub plan: Option<PlanDto>,
    pub start_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub active: bool,
    /// Derived: true once the membership is inactive or past its expiry date
    pub expired: bool,
}

impl MembershipDto {
    pub fn from_model(
        model: membership::Model,
        plan: Option<plan::Model>,
        as_of: NaiveDate,
    ) -> Self {
        let expired = !crate::expiry::is_active(&model, as_of);
        Self {
            id: model.id,
            member_id: model.member_id,
            plan: plan.map(PlanDto::from),
            start_date: model.start_date,
            expiry_date: model.expiry_date,
            active: model.active,
            expired,
        }
    }
}

/// Class session view with live seat accounting
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClassSessionDto {
    pub id: Uuid,
    pub name: String,
    pub weekday: Weekday,
    pub start_time: NaiveTime,
    pub capacity: i32,
    /// Current number of enrollments
    pub enrolled: u64,
    /// Remaining free seats
    pub available: u64,
    pub trainer_id: Option<Uuid>,
    /// True when the requesting account holds one of the seats
    pub enrolled_by_me: bool,
}

impl ClassSessionDto {
    pub fn from_model(model: class_session::Model, enrolled: u64, enrolled_by_me: bool) -> Self {
        let available = (model.capacity as u64).saturating_sub(enrolled);
        Self {
            id: model.id,
            name: model.name,
            weekday: model.weekday,
            start_time: model.start_time,
            capacity: model.capacity,
            enrolled,
            available,
            trainer_id: model.trainer_id,
            enrolled_by_me,
        }
    }
}

/// Routine view
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoutineDto {
    pub id: Uuid,
    pub member_id: Uuid,
    pub trainer_id: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub active: bool,
    pub assigned_date: NaiveDate,
}

impl From<routine::Model> for RoutineDto {
    fn from(model: routine::Model) -> Self {
        Self {
            id: model.id,
            member_id: model.member_id,
            trainer_id: model.trainer_id,
            name: model.name,
            description: model.description,
            active: model.active,
            assigned_date: model.assigned_date,
        }
    }
}
