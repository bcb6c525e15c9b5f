//! Class session entity model
//!
//! A scheduled, capacity-bounded recurring class. Identity is
//! (name, weekday, start_time), enforced by a composite unique index.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Day of week a recurring class runs on
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "snake_case")]
pub enum Weekday {
    #[sea_orm(string_value = "mon")]
    Mon,
    #[sea_orm(string_value = "tue")]
    Tue,
    #[sea_orm(string_value = "wed")]
    Wed,
    #[sea_orm(string_value = "thu")]
    Thu,
    #[sea_orm(string_value = "fri")]
    Fri,
    #[sea_orm(string_value = "sat")]
    Sat,
    #[sea_orm(string_value = "sun")]
    Sun,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "class_sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,

    pub weekday: Weekday,

    pub start_time: Time,

    /// Maximum number of concurrent enrollments; >= 1
    pub capacity: i32,

    /// Assigned trainer, if any
    pub trainer_id: Option<Uuid>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::enrollment::Entity")]
    Enrollment,
    #[sea_orm(
        belongs_to = "super::member::Entity",
        from = "Column::TrainerId",
        to = "super::member::Column::Id"
    )]
    Trainer,
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
