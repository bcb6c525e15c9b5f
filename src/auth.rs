//! # Authentication and Authorization
//!
//! Bearer session authentication for protected API endpoints. Login mints an
//! opaque token backed by a row in `auth_sessions`; the middleware resolves
//! the token to an active member account on every request and role checks sit
//! on top of that via [`require_role`].

use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use rand::{Rng, distributions::Alphanumeric};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{ApiError, forbidden, unauthorized};
use crate::models::{auth_session, member};
use crate::roles::Role;
use crate::server::AppState;

const SESSION_TOKEN_LENGTH: usize = 48;

/// The authenticated member for the current request, inserted by
/// [`auth_middleware`] and pulled out by handlers as an extractor.
#[derive(Debug, Clone)]
pub struct CurrentMember(pub member::Model);

/// The raw bearer token of the current request; the logout handler needs it
/// to delete the matching session row.
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.config)
    }
}

/// Hash a password with Argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| {
            tracing::error!("Password hashing failed: {}", err);
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "Failed to process credentials",
            )
        })
}

/// Verify a candidate password against a stored Argon2 hash.
///
/// Returns `false` for malformed hashes rather than erroring so a corrupt
/// row degrades to a failed login instead of a 500.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    PasswordHash::new(password_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

fn mint_session_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Create a session row for the member and return it with its fresh token.
pub async fn create_session<C: ConnectionTrait>(
    db: &C,
    member_id: Uuid,
    ttl_minutes: u64,
) -> Result<auth_session::Model, ApiError> {
    let now = Utc::now();
    let session = auth_session::ActiveModel {
        id: Set(Uuid::new_v4()),
        token: Set(mint_session_token()),
        member_id: Set(member_id),
        created_at: Set(now.into()),
        expires_at: Set((now + Duration::minutes(ttl_minutes as i64)).into()),
    };

    Ok(session.insert(db).await?)
}

/// Delete the session row behind a bearer token. Missing rows are fine:
/// logout is idempotent.
pub async fn revoke_session<C: ConnectionTrait>(db: &C, token: &str) -> Result<(), ApiError> {
    auth_session::Entity::delete_many()
        .filter(auth_session::Column::Token.eq(token))
        .exec(db)
        .await?;
    Ok(())
}

/// Authentication middleware that resolves the bearer token to an active
/// member and exposes it to handlers through request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())?.to_string();

    let session = auth_session::Entity::find()
        .filter(auth_session::Column::Token.eq(token.as_str()))
        .one(&state.db)
        .await?
        .ok_or_else(|| unauthorized(Some("Invalid or expired session token")))?;

    if session.expires_at < Utc::now() {
        // Expired rows are reaped lazily on their next use.
        auth_session::Entity::delete_by_id(session.id)
            .exec(&state.db)
            .await?;
        return Err(unauthorized(Some("Session has expired")));
    }

    let member = member::Entity::find_by_id(session.member_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| unauthorized(Some("Invalid or expired session token")))?;

    if !member.active {
        return Err(unauthorized(Some("Account is deactivated")));
    }

    tracing::debug!(member_id = %member.id, role = ?member.role, "Authenticated request");

    request.extensions_mut().insert(CurrentMember(member));
    request.extensions_mut().insert(SessionToken(token));

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(AUTHORIZATION)
        .ok_or_else(|| unauthorized(Some("Missing Authorization header")))
        .and_then(|value| {
            value
                .to_str()
                .map_err(|_| unauthorized(Some("Invalid Authorization header")))
        })
        .and_then(|header| {
            header
                .strip_prefix("Bearer ")
                .ok_or_else(|| unauthorized(Some("Authorization header must use Bearer scheme")))
        })
}

/// Reject the request unless the member's role satisfies one of `required`.
pub fn require_role(current: &CurrentMember, required: &[Role]) -> Result<(), ApiError> {
    if current.0.role.allows(required) {
        Ok(())
    } else {
        Err(forbidden(Some("Insufficient permissions for this resource")))
    }
}

impl<S> FromRequestParts<S> for CurrentMember
where
    S: Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentMember>()
            .cloned()
            .ok_or_else(|| unauthorized(None))
    }
}

impl<S> FromRequestParts<S> for SessionToken
where
    S: Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionToken>()
            .cloned()
            .ok_or_else(|| unauthorized(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{Database, DatabaseConnection};

    #[test]
    fn password_roundtrip_verifies() {
        let hash = hash_password("s3cret-pass").unwrap();
        assert!(verify_password("s3cret-pass", &hash));
        assert!(!verify_password("wrong-pass", &hash));
    }

    #[test]
    fn malformed_hash_fails_closed() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn minted_tokens_are_long_and_distinct() {
        let first = mint_session_token();
        let second = mint_session_token();
        assert_eq!(first.len(), SESSION_TOKEN_LENGTH);
        assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(first, second);
    }

    #[test]
    fn role_gate_matches_role_semantics() {
        let member = member::Model {
            id: Uuid::new_v4(),
            username: "gate".to_string(),
            email: "gate@example.com".to_string(),
            password_hash: "hash".to_string(),
            first_name: None,
            last_name: None,
            phone: None,
            birth_date: None,
            role: Role::Trainer,
            active: true,
            created_at: Utc::now().into(),
        };
        let current = CurrentMember(member);

        assert!(require_role(&current, &[Role::Trainer]).is_ok());
        assert!(require_role(&current, &[Role::Admin, Role::Trainer]).is_ok());
        assert!(require_role(&current, &[Role::Admin]).is_err());
        assert!(require_role(&current, &[Role::Member]).is_err());
    }

    async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("connect test db");
        Migrator::up(&db, None).await.expect("run migrations");
        db
    }

    async fn insert_member(db: &DatabaseConnection) -> member::Model {
        let id = Uuid::new_v4();
        member::ActiveModel {
            id: Set(id),
            username: Set(format!("user-{id}")),
            email: Set(format!("{id}@example.com")),
            password_hash: Set(hash_password("pw").unwrap()),
            first_name: Set(None),
            last_name: Set(None),
            phone: Set(None),
            birth_date: Set(None),
            role: Set(Role::Member),
            active: Set(true),
            created_at: Set(Utc::now().into()),
        }
        .insert(db)
        .await
        .expect("insert member")
    }

    #[tokio::test]
    async fn sessions_are_minted_and_revoked() {
        let db = setup_test_db().await;
        let member = insert_member(&db).await;

        let session = create_session(&db, member.id, 720).await.unwrap();
        assert_eq!(session.member_id, member.id);
        assert!(session.expires_at > Utc::now());

        revoke_session(&db, &session.token).await.unwrap();
        let remaining = auth_session::Entity::find_by_id(session.id)
            .one(&db)
            .await
            .unwrap();
        assert!(remaining.is_none());

        // Revoking again is a no-op.
        revoke_session(&db, &session.token).await.unwrap();
    }
}
