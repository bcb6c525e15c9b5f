//! # Enrollment Coordinator
//!
//! Owns the two class-enrollment invariants: a session's enrollment count
//! never exceeds its capacity, and a member holds at most one enrollment per
//! session. Both are preserved under concurrent requests by evaluating each
//! operation inside one database transaction that takes a per-session
//! serialization point (a row lock on the class_sessions row; SQLite
//! serializes writers natively). The unique index on (member_id, session_id)
//! is the storage-layer backstop for duplicate prevention.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use thiserror::Error;
use uuid::Uuid;

use crate::error::{self, ApiError, is_transient_conflict, is_unique_violation};
use crate::models::{class_session, enrollment, member};
use crate::roles::Role;

/// Rejection reasons for enrollment operations, in priority order.
#[derive(Debug, Error)]
pub enum EnrollmentError {
    #[error("member is already enrolled in this session")]
    AlreadyEnrolled,
    #[error("session is at capacity")]
    CapacityExceeded,
    #[error("class session not found")]
    SessionNotFound,
    #[error("member is not an active member-role account")]
    MemberIneligible,
    #[error("member is not enrolled in this session")]
    NotEnrolled,
    #[error("concurrent enrollment conflict")]
    Conflict,
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),
}

impl From<EnrollmentError> for ApiError {
    fn from(err: EnrollmentError) -> Self {
        match err {
            EnrollmentError::AlreadyEnrolled => {
                error::conflict("Already enrolled in this class", "already_enrolled")
            }
            EnrollmentError::CapacityExceeded => {
                error::conflict("Class is at capacity", "capacity_exceeded")
            }
            EnrollmentError::SessionNotFound => error::not_found("Class session not found"),
            EnrollmentError::MemberIneligible => {
                error::forbidden(Some("Account is not an active member"))
            }
            EnrollmentError::NotEnrolled => error::not_found("No enrollment found for this class"),
            EnrollmentError::Conflict => error::conflict(
                "Enrollment conflicted with a concurrent request, please retry",
                "concurrent_conflict",
            ),
            EnrollmentError::Db(db_err) => db_err.into(),
        }
    }
}

/// Coordinator for class-enrollment operations.
pub struct EnrollmentCoordinator<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> EnrollmentCoordinator<'a> {
    /// Create a new EnrollmentCoordinator with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Enroll a member into a class session.
    ///
    /// The whole decision (duplicate check, capacity count, insert) commits
    /// as one atomic step per session. A transactional write-write conflict
    /// is retried internally exactly once with a fresh read; business
    /// rejections are never retried here, re-attempting is the caller's
    /// responsibility.
    pub async fn enroll(
        &self,
        member_id: Uuid,
        session_id: Uuid,
    ) -> Result<enrollment::Model, EnrollmentError> {
        match self.try_enroll(member_id, session_id).await {
            Err(EnrollmentError::Db(err)) if is_transient_conflict(&err) => {
                tracing::warn!(
                    %member_id,
                    %session_id,
                    "Enrollment hit a transactional conflict, retrying once"
                );
                match self.try_enroll(member_id, session_id).await {
                    Err(EnrollmentError::Db(err)) if is_transient_conflict(&err) => {
                        Err(EnrollmentError::Conflict)
                    }
                    other => other,
                }
            }
            other => other,
        }
    }

    async fn try_enroll(
        &self,
        member_id: Uuid,
        session_id: Uuid,
    ) -> Result<enrollment::Model, EnrollmentError> {
        let txn = self.db.begin().await?;

        // Per-session serialization point: concurrent enroll/cancel calls on
        // this session queue behind the row lock until commit.
        let session = Self::lock_session(&txn, session_id)
            .await?
            .ok_or(EnrollmentError::SessionNotFound)?;

        // Rejection order: AlreadyEnrolled outranks CapacityExceeded, which
        // outranks the eligibility check. A member who took a seat and was
        // later promoted or deactivated still gets AlreadyEnrolled here.
        let duplicate = enrollment::Entity::find()
            .filter(enrollment::Column::MemberId.eq(member_id))
            .filter(enrollment::Column::SessionId.eq(session_id))
            .one(&txn)
            .await?;
        if duplicate.is_some() {
            return Err(EnrollmentError::AlreadyEnrolled);
        }

        let enrolled = enrollment::Entity::find()
            .filter(enrollment::Column::SessionId.eq(session_id))
            .count(&txn)
            .await?;
        if enrolled >= session.capacity as u64 {
            return Err(EnrollmentError::CapacityExceeded);
        }

        let member = member::Entity::find_by_id(member_id)
            .one(&txn)
            .await?
            .ok_or(EnrollmentError::MemberIneligible)?;
        if !member.active || member.role != Role::Member {
            return Err(EnrollmentError::MemberIneligible);
        }

        let record = enrollment::ActiveModel {
            id: Set(Uuid::new_v4()),
            member_id: Set(member_id),
            session_id: Set(session_id),
            created_at: Set(Utc::now().into()),
        };

        let record = match record.insert(&txn).await {
            Ok(model) => model,
            // Write-write race on the (member, session) unique index.
            Err(err) if is_unique_violation(&err) => return Err(EnrollmentError::AlreadyEnrolled),
            Err(err) => return Err(err.into()),
        };

        txn.commit().await?;

        tracing::info!(%member_id, %session_id, "Member enrolled in class session");
        Ok(record)
    }

    /// Cancel a member's enrollment, freeing one capacity slot.
    ///
    /// Cancelling a non-existent enrollment reports `NotEnrolled` and changes
    /// nothing; a second cancel on the same pair is therefore safe. Transient
    /// transactional conflicts get the same single internal retry as `enroll`.
    pub async fn cancel(&self, member_id: Uuid, session_id: Uuid) -> Result<(), EnrollmentError> {
        match self.try_cancel(member_id, session_id).await {
            Err(EnrollmentError::Db(err)) if is_transient_conflict(&err) => {
                tracing::warn!(
                    %member_id,
                    %session_id,
                    "Cancellation hit a transactional conflict, retrying once"
                );
                match self.try_cancel(member_id, session_id).await {
                    Err(EnrollmentError::Db(err)) if is_transient_conflict(&err) => {
                        Err(EnrollmentError::Conflict)
                    }
                    other => other,
                }
            }
            other => other,
        }
    }

    async fn try_cancel(&self, member_id: Uuid, session_id: Uuid) -> Result<(), EnrollmentError> {
        let txn = self.db.begin().await?;

        // Take the same serialization point as enroll so a cancel never
        // interleaves with a capacity decision on this session.
        Self::lock_session(&txn, session_id).await?;

        let deleted = enrollment::Entity::delete_many()
            .filter(enrollment::Column::MemberId.eq(member_id))
            .filter(enrollment::Column::SessionId.eq(session_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        if deleted.rows_affected == 0 {
            return Err(EnrollmentError::NotEnrolled);
        }

        tracing::info!(%member_id, %session_id, "Enrollment cancelled");
        Ok(())
    }

    async fn lock_session(
        txn: &DatabaseTransaction,
        session_id: Uuid,
    ) -> Result<Option<class_session::Model>, sea_orm::DbErr> {
        class_session::Entity::find_by_id(session_id)
            .lock_exclusive()
            .one(txn)
            .await
    }
}
