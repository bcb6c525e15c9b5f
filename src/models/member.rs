//! Member entity model
//!
//! One row per account. The role is a first-class column so an identity can
//! never exist without a role; accounts are deactivated, never hard-deleted.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

use crate::roles::Role;

/// Member account with a first-class role
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "members")]
pub struct Model {
    /// Unique identifier for the member (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Login name (unique)
    pub username: String,

    /// Contact email
    pub email: String,

    /// Argon2 password hash
    pub password_hash: String,

    pub first_name: Option<String>,

    pub last_name: Option<String>,

    pub phone: Option<String>,

    pub birth_date: Option<Date>,

    /// Account role; mutable only through the admin surface
    pub role: Role,

    /// False once an admin deactivates the account
    pub active: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::enrollment::Entity")]
    Enrollment,
    #[sea_orm(has_one = "super::membership::Entity")]
    Membership,
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollment.def()
    }
}

impl Related<super::membership::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Membership.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
