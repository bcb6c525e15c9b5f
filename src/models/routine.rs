//! Routine entity model
//!
//! Trainer-authored workout plan assigned to one member. A member may hold
//! several; the "current" routine is the most recently assigned active one.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "routines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Member the routine is assigned to
    pub member_id: Uuid,

    /// Authoring trainer; kept when the trainer account goes away
    pub trainer_id: Option<Uuid>,

    pub name: String,

    pub description: String,

    pub active: bool,

    pub assigned_date: Date,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::member::Entity",
        from = "Column::MemberId",
        to = "super::member::Column::Id"
    )]
    Member,
}

impl Related<super::member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Member.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
