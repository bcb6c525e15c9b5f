//! # Account Roles
//!
//! The three mutually-exclusive account roles and the pure role-gate
//! predicate used to guard every state-mutating endpoint.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Account role. Every member carries exactly one role at a time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Administrator: full management surface, implicitly satisfies
    /// trainer-only checks.
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Trainer: student lists and routine assignment.
    #[sea_orm(string_value = "trainer")]
    Trainer,
    /// Member: self-service views and class enrollment.
    #[sea_orm(string_value = "member")]
    Member,
}

impl Role {
    /// Role-gate predicate: admission iff this role is in the required set,
    /// with the single hierarchy rule that Admin covers Trainer capabilities.
    /// Trainer and Member are otherwise disjoint. Pure; no I/O.
    pub fn allows(self, required: &[Role]) -> bool {
        required.iter().any(|role| match (self, role) {
            (held, wanted) if held == *wanted => true,
            (Role::Admin, Role::Trainer) => true,
            _ => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_satisfies_itself() {
        assert!(Role::Admin.allows(&[Role::Admin]));
        assert!(Role::Trainer.allows(&[Role::Trainer]));
        assert!(Role::Member.allows(&[Role::Member]));
    }

    #[test]
    fn admin_covers_trainer_checks() {
        assert!(Role::Admin.allows(&[Role::Trainer]));
        assert!(Role::Admin.allows(&[Role::Trainer, Role::Admin]));
    }

    #[test]
    fn admin_does_not_cover_member_only_checks() {
        assert!(!Role::Admin.allows(&[Role::Member]));
    }

    #[test]
    fn trainer_and_member_are_disjoint() {
        assert!(!Role::Trainer.allows(&[Role::Member]));
        assert!(!Role::Trainer.allows(&[Role::Admin]));
        assert!(!Role::Member.allows(&[Role::Admin]));
        assert!(!Role::Member.allows(&[Role::Trainer]));
    }

    #[test]
    fn empty_required_set_denies_everyone() {
        assert!(!Role::Admin.allows(&[]));
        assert!(!Role::Member.allows(&[]));
    }
}
