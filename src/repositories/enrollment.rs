//! # Enrollment Repository
//!
//! Read-side queries over enrollments. All writes go through
//! `crate::enrollment::EnrollmentCoordinator` so the capacity and uniqueness
//! invariants are enforced in one place.

use std::collections::HashSet;

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::class_session;
use crate::models::enrollment::{self, Entity as Enrollment, Model as EnrollmentModel};

/// Repository for enrollment read queries
pub struct EnrollmentRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> EnrollmentRepository<'a> {
    /// Create a new EnrollmentRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// List a member's enrollments together with the class sessions they
    /// point at, most recent enrollment first
    pub async fn list_for_member(
        &self,
        member_id: Uuid,
    ) -> Result<Vec<(EnrollmentModel, Option<class_session::Model>)>, RepositoryError> {
        Enrollment::find()
            .filter(enrollment::Column::MemberId.eq(member_id))
            .find_also_related(class_session::Entity)
            .order_by_desc(enrollment::Column::CreatedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// The set of session IDs a member is enrolled in; used to mark the
    /// class list with the caller's own enrollments
    pub async fn session_ids_for_member(
        &self,
        member_id: Uuid,
    ) -> Result<HashSet<Uuid>, RepositoryError> {
        let ids: Vec<Uuid> = Enrollment::find()
            .filter(enrollment::Column::MemberId.eq(member_id))
            .select_only()
            .column(enrollment::Column::SessionId)
            .into_tuple()
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(ids.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    use crate::enrollment::EnrollmentCoordinator;
    use crate::models::class_session::Weekday;
    use crate::repositories::class_session::{ClassSessionRepository, CreateClassSessionRequest};
    use crate::repositories::member::{CreateMemberRequest, MemberRepository};
    use crate::roles::Role;

    async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("connect test db");
        Migrator::up(&db, None).await.expect("run migrations");
        db
    }

    async fn insert_member(db: &DatabaseConnection, username: &str) -> Uuid {
        MemberRepository::new(db)
            .create_member(CreateMemberRequest {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password_hash: "hash".to_string(),
                first_name: None,
                last_name: None,
                phone: None,
                birth_date: None,
                role: Role::Member,
            })
            .await
            .unwrap()
            .id
    }

    async fn insert_session(db: &DatabaseConnection, name: &str) -> Uuid {
        ClassSessionRepository::new(db)
            .create_session(CreateClassSessionRequest {
                name: name.to_string(),
                weekday: Weekday::Tue,
                start_time: NaiveTime::from_hms_opt(7, 30, 0).unwrap(),
                capacity: 10,
                trainer_id: None,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn member_listing_joins_sessions() {
        let db = setup_test_db().await;
        let member_id = insert_member(&db, "alice").await;
        let yoga = insert_session(&db, "Yoga").await;
        let boxing = insert_session(&db, "Boxing").await;

        let coordinator = EnrollmentCoordinator::new(&db);
        coordinator.enroll(member_id, yoga).await.unwrap();
        coordinator.enroll(member_id, boxing).await.unwrap();

        let repo = EnrollmentRepository::new(&db);
        let listed = repo.list_for_member(member_id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|(_, session)| session.is_some()));

        let ids = repo.session_ids_for_member(member_id).await.unwrap();
        assert!(ids.contains(&yoga) && ids.contains(&boxing));
    }

    #[tokio::test]
    async fn listing_is_scoped_to_the_member() {
        let db = setup_test_db().await;
        let alice = insert_member(&db, "alice").await;
        let bob = insert_member(&db, "bob").await;
        let yoga = insert_session(&db, "Yoga").await;

        EnrollmentCoordinator::new(&db)
            .enroll(alice, yoga)
            .await
            .unwrap();

        let repo = EnrollmentRepository::new(&db);
        assert!(repo.list_for_member(bob).await.unwrap().is_empty());
        assert!(repo.session_ids_for_member(bob).await.unwrap().is_empty());
    }
}
