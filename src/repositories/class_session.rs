//! # Class Session Repository
//!
//! CRUD for scheduled classes. Enrollment writes live in
//! `crate::enrollment`; this repository only reads seat counts.

use std::collections::HashMap;

use chrono::{NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::error::{RepositoryError, is_unique_violation};
use crate::models::class_session::{self, Entity as ClassSession, Model as ClassSessionModel, Weekday};
use crate::models::{enrollment, member};
use crate::roles::Role;

/// Request data for creating a new class session
#[derive(Debug, Clone)]
pub struct CreateClassSessionRequest {
    pub name: String,
    pub weekday: Weekday,
    pub start_time: NaiveTime,
    pub capacity: i32,
    pub trainer_id: Option<Uuid>,
}

/// Partial update for an existing class session
#[derive(Debug, Clone, Default)]
pub struct UpdateClassSessionRequest {
    pub name: Option<String>,
    pub weekday: Option<Weekday>,
    pub start_time: Option<NaiveTime>,
    pub capacity: Option<i32>,
    /// `Some(None)` clears the trainer assignment
    pub trainer_id: Option<Option<Uuid>>,
}

/// Repository for class session database operations
pub struct ClassSessionRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ClassSessionRepository<'a> {
    /// Create a new ClassSessionRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a new class session
    pub async fn create_session(
        &self,
        request: CreateClassSessionRequest,
    ) -> Result<ClassSessionModel, RepositoryError> {
        Self::validate_name(&request.name)?;
        Self::validate_capacity(request.capacity)?;
        if let Some(trainer_id) = request.trainer_id {
            self.validate_trainer(trainer_id).await?;
        }

        let record = class_session::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            weekday: Set(request.weekday),
            start_time: Set(request.start_time),
            capacity: Set(request.capacity),
            trainer_id: Set(request.trainer_id),
            created_at: Set(Utc::now().into()),
        };

        record.insert(self.db).await.map_err(|err| {
            if is_unique_violation(&err) {
                RepositoryError::Conflict(
                    "A class with this name, weekday, and start time already exists".to_string(),
                )
            } else {
                RepositoryError::database_error(err)
            }
        })
    }

    /// Get a class session by ID
    pub async fn get_session_by_id(
        &self,
        session_id: Uuid,
    ) -> Result<Option<ClassSessionModel>, RepositoryError> {
        ClassSession::find_by_id(session_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// List all class sessions with their current enrollment counts
    pub async fn list_sessions_with_counts(
        &self,
    ) -> Result<Vec<(ClassSessionModel, u64)>, RepositoryError> {
        let sessions = ClassSession::find()
            .order_by_asc(class_session::Column::Name)
            .order_by_asc(class_session::Column::StartTime)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        let counts: Vec<(Uuid, i64)> = enrollment::Entity::find()
            .select_only()
            .column(enrollment::Column::SessionId)
            .column_as(enrollment::Column::Id.count(), "enrolled")
            .group_by(enrollment::Column::SessionId)
            .into_tuple()
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        let counts: HashMap<Uuid, u64> = counts
            .into_iter()
            .map(|(session_id, enrolled)| (session_id, enrolled as u64))
            .collect();

        Ok(sessions
            .into_iter()
            .map(|session| {
                let enrolled = counts.get(&session.id).copied().unwrap_or(0);
                (session, enrolled)
            })
            .collect())
    }

    /// Current enrollment count for a single session
    pub async fn enrolled_count(&self, session_id: Uuid) -> Result<u64, RepositoryError> {
        enrollment::Entity::find()
            .filter(enrollment::Column::SessionId.eq(session_id))
            .count(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Update an existing class session.
    ///
    /// Capacity may not drop below the current enrollment count; seats
    /// already granted are never revoked by a schedule edit.
    pub async fn update_session(
        &self,
        session_id: Uuid,
        request: UpdateClassSessionRequest,
    ) -> Result<ClassSessionModel, RepositoryError> {
        let record = self
            .get_session_by_id(session_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Class session not found".to_string()))?;

        if let Some(name) = &request.name {
            Self::validate_name(name)?;
        }
        if let Some(capacity) = request.capacity {
            Self::validate_capacity(capacity)?;
            let enrolled = self.enrolled_count(session_id).await?;
            if (capacity as u64) < enrolled {
                return Err(RepositoryError::Conflict(format!(
                    "Capacity {capacity} is below the current enrollment count {enrolled}"
                )));
            }
        }
        if let Some(Some(trainer_id)) = request.trainer_id {
            self.validate_trainer(trainer_id).await?;
        }

        let mut active_record = record.into_active_model();
        if let Some(name) = request.name {
            active_record.name = Set(name);
        }
        if let Some(weekday) = request.weekday {
            active_record.weekday = Set(weekday);
        }
        if let Some(start_time) = request.start_time {
            active_record.start_time = Set(start_time);
        }
        if let Some(capacity) = request.capacity {
            active_record.capacity = Set(capacity);
        }
        if let Some(trainer_id) = request.trainer_id {
            active_record.trainer_id = Set(trainer_id);
        }

        active_record.update(self.db).await.map_err(|err| {
            if is_unique_violation(&err) {
                RepositoryError::Conflict(
                    "A class with this name, weekday, and start time already exists".to_string(),
                )
            } else {
                RepositoryError::database_error(err)
            }
        })
    }

    /// Delete a class session; its enrollments go with it
    pub async fn delete_session(&self, session_id: Uuid) -> Result<(), RepositoryError> {
        let record = self
            .get_session_by_id(session_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Class session not found".to_string()))?;

        record
            .delete(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(())
    }

    async fn validate_trainer(&self, trainer_id: Uuid) -> Result<(), RepositoryError> {
        let trainer = member::Entity::find_by_id(trainer_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::NotFound("Trainer not found".to_string()))?;

        if trainer.role == Role::Member {
            return Err(RepositoryError::validation_error(
                "Assigned trainer must hold the trainer or admin role",
            ));
        }
        Ok(())
    }

    fn validate_name(name: &str) -> Result<(), RepositoryError> {
        if name.trim().is_empty() {
            return Err(RepositoryError::validation_error(
                "Class name cannot be empty",
            ));
        }
        if name.len() > 100 {
            return Err(RepositoryError::validation_error(
                "Class name cannot exceed 100 characters",
            ));
        }
        Ok(())
    }

    fn validate_capacity(capacity: i32) -> Result<(), RepositoryError> {
        if capacity < 1 {
            return Err(RepositoryError::validation_error(
                "Class capacity must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    use crate::enrollment::EnrollmentCoordinator;
    use crate::repositories::member::{CreateMemberRequest, MemberRepository};

    async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("connect test db");
        Migrator::up(&db, None).await.expect("run migrations");
        db
    }

    fn create_request(name: &str) -> CreateClassSessionRequest {
        CreateClassSessionRequest {
            name: name.to_string(),
            weekday: Weekday::Mon,
            start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            capacity: 20,
            trainer_id: None,
        }
    }

    async fn insert_member(db: &DatabaseConnection, username: &str, role: Role) -> Uuid {
        MemberRepository::new(db)
            .create_member(CreateMemberRequest {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password_hash: "hash".to_string(),
                first_name: None,
                last_name: None,
                phone: None,
                birth_date: None,
                role,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn create_and_list_sessions() {
        let db = setup_test_db().await;
        let repo = ClassSessionRepository::new(&db);

        repo.create_session(create_request("Yoga")).await.unwrap();
        repo.create_session(create_request("Boxing")).await.unwrap();

        let listed = repo.list_sessions_with_counts().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|(_, enrolled)| *enrolled == 0));
        assert_eq!(listed[0].0.name, "Boxing");
    }

    #[tokio::test]
    async fn identity_collision_is_a_conflict() {
        let db = setup_test_db().await;
        let repo = ClassSessionRepository::new(&db);

        repo.create_session(create_request("Yoga")).await.unwrap();
        let result = repo.create_session(create_request("Yoga")).await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));

        // Same name on another weekday is a different class.
        let mut moved = create_request("Yoga");
        moved.weekday = Weekday::Wed;
        assert!(repo.create_session(moved).await.is_ok());
    }

    #[tokio::test]
    async fn trainer_assignment_requires_trainer_role() {
        let db = setup_test_db().await;
        let repo = ClassSessionRepository::new(&db);

        let plain_member = insert_member(&db, "plain", Role::Member).await;
        let mut request = create_request("Spin");
        request.trainer_id = Some(plain_member);
        assert!(matches!(
            repo.create_session(request).await,
            Err(RepositoryError::Validation(_))
        ));

        let coach = insert_member(&db, "coach", Role::Trainer).await;
        let mut request = create_request("Spin");
        request.trainer_id = Some(coach);
        let created = repo.create_session(request).await.unwrap();
        assert_eq!(created.trainer_id, Some(coach));
    }

    #[tokio::test]
    async fn capacity_cannot_drop_below_enrollment() {
        let db = setup_test_db().await;
        let repo = ClassSessionRepository::new(&db);

        let mut request = create_request("Crossfit");
        request.capacity = 3;
        let session = repo.create_session(request).await.unwrap();

        let coordinator = EnrollmentCoordinator::new(&db);
        for username in ["mem1", "mem2"] {
            let member_id = insert_member(&db, username, Role::Member).await;
            coordinator.enroll(member_id, session.id).await.unwrap();
        }

        let shrink = repo
            .update_session(
                session.id,
                UpdateClassSessionRequest {
                    capacity: Some(1),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(shrink, Err(RepositoryError::Conflict(_))));

        let ok = repo
            .update_session(
                session.id,
                UpdateClassSessionRequest {
                    capacity: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(ok.capacity, 2);
    }

    #[tokio::test]
    async fn listed_counts_track_enrollments() {
        let db = setup_test_db().await;
        let repo = ClassSessionRepository::new(&db);
        let session = repo.create_session(create_request("Pilates")).await.unwrap();

        let coordinator = EnrollmentCoordinator::new(&db);
        let member_id = insert_member(&db, "gina", Role::Member).await;
        coordinator.enroll(member_id, session.id).await.unwrap();

        let listed = repo.list_sessions_with_counts().await.unwrap();
        assert_eq!(listed[0].1, 1);
        assert_eq!(repo.enrolled_count(session.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_session_removes_it() {
        let db = setup_test_db().await;
        let repo = ClassSessionRepository::new(&db);
        let session = repo.create_session(create_request("Zumba")).await.unwrap();

        repo.delete_session(session.id).await.unwrap();
        assert!(repo.get_session_by_id(session.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete_session(session.id).await,
            Err(RepositoryError::NotFound(_))
        ));
    }
}
