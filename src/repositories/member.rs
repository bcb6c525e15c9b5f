//! # Member Repository
//!
//! CRUD operations for member accounts. Deletion is deliberately absent:
//! accounts are deactivated through the admin update path so enrollment and
//! routine history stays attributable.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::error::{RepositoryError, is_unique_violation};
use crate::models::member::{self, Entity as Member, Model as MemberModel};
use crate::roles::Role;

/// Request data for creating a new member account
#[derive(Debug, Clone)]
pub struct CreateMemberRequest {
    pub username: String,
    pub email: String,
    /// Already-hashed credential; hashing happens at the auth layer
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub role: Role,
}

/// Self-service profile fields a member may edit
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

/// Admin-only account fields
#[derive(Debug, Clone, Default)]
pub struct UpdateMemberAdminRequest {
    pub role: Option<Role>,
    pub active: Option<bool>,
}

/// Repository for member account database operations
pub struct MemberRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> MemberRepository<'a> {
    /// Create a new MemberRepository with the given database connection
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a new member account
    pub async fn create_member(
        &self,
        request: CreateMemberRequest,
    ) -> Result<MemberModel, RepositoryError> {
        Self::validate_username(&request.username)?;
        Self::validate_email(&request.email)?;

        let account = member::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(request.username),
            email: Set(request.email),
            password_hash: Set(request.password_hash),
            first_name: Set(request.first_name),
            last_name: Set(request.last_name),
            phone: Set(request.phone),
            birth_date: Set(request.birth_date),
            role: Set(request.role),
            active: Set(true),
            created_at: Set(Utc::now().into()),
        };

        account.insert(self.db).await.map_err(|err| {
            if is_unique_violation(&err) {
                RepositoryError::Conflict("Username is already taken".to_string())
            } else {
                RepositoryError::database_error(err)
            }
        })
    }

    /// Get a member by ID
    pub async fn get_member_by_id(
        &self,
        member_id: Uuid,
    ) -> Result<Option<MemberModel>, RepositoryError> {
        Member::find_by_id(member_id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Get a member by username (login lookup)
    pub async fn get_member_by_username(
        &self,
        username: &str,
    ) -> Result<Option<MemberModel>, RepositoryError> {
        Member::find()
            .filter(member::Column::Username.eq(username))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// List all member accounts, newest first
    pub async fn list_members(&self) -> Result<Vec<MemberModel>, RepositoryError> {
        Member::find()
            .order_by_desc(member::Column::CreatedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// List active member-role accounts (the trainer's student roster)
    pub async fn list_students(&self) -> Result<Vec<MemberModel>, RepositoryError> {
        Member::find()
            .filter(member::Column::Role.eq(Role::Member))
            .filter(member::Column::Active.eq(true))
            .order_by_asc(member::Column::Username)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Update a member's own profile fields; the username is immutable
    pub async fn update_profile(
        &self,
        member_id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<MemberModel, RepositoryError> {
        let account = self
            .get_member_by_id(member_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Member not found".to_string()))?;

        let mut active_account = account.into_active_model();
        if let Some(email) = request.email {
            Self::validate_email(&email)?;
            active_account.email = Set(email);
        }
        if let Some(first_name) = request.first_name {
            active_account.first_name = Set(Some(first_name));
        }
        if let Some(last_name) = request.last_name {
            active_account.last_name = Set(Some(last_name));
        }
        if let Some(phone) = request.phone {
            active_account.phone = Set(Some(phone));
        }
        if let Some(birth_date) = request.birth_date {
            active_account.birth_date = Set(Some(birth_date));
        }

        active_account
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Admin update: role changes and activation toggling
    pub async fn update_member_admin(
        &self,
        member_id: Uuid,
        request: UpdateMemberAdminRequest,
    ) -> Result<MemberModel, RepositoryError> {
        let account = self
            .get_member_by_id(member_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Member not found".to_string()))?;

        let mut active_account = account.into_active_model();
        if let Some(role) = request.role {
            active_account.role = Set(role);
        }
        if let Some(active) = request.active {
            active_account.active = Set(active);
        }

        active_account
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    fn validate_username(username: &str) -> Result<(), RepositoryError> {
        let trimmed = username.trim();
        if trimmed.len() < 3 {
            return Err(RepositoryError::validation_error(
                "Username must be at least 3 characters",
            ));
        }
        if trimmed.len() > 64 {
            return Err(RepositoryError::validation_error(
                "Username cannot exceed 64 characters",
            ));
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        {
            return Err(RepositoryError::validation_error(
                "Username can only contain letters, numbers, hyphens, underscores, and dots",
            ));
        }
        Ok(())
    }

    fn validate_email(email: &str) -> Result<(), RepositoryError> {
        if email.len() > 255 || !email.contains('@') || email.starts_with('@') {
            return Err(RepositoryError::validation_error("Invalid email address"));
        }
        Ok(())
    }
}
