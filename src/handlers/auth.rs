//! # Auth Handlers
//!
//! Registration, login, and logout endpoints.

use axum::{extract::State, http::StatusCode, response::Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{self, CurrentMember, SessionToken};
use crate::config::ConfigError;
use crate::error::{ApiError, unauthorized, validation_error};
use crate::handlers::types::MemberDto;
use crate::repositories::{CreateMemberRequest, MemberRepository};
use crate::roles::Role;
use crate::server::AppState;

/// Request payload for account registration
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequestDto {
    #[schema(example = "ana.garcia")]
    pub username: String,
    #[schema(example = "ana@example.com")]
    pub email: String,
    /// Minimum 8 characters
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    /// Only honored when the deployment allows role selection at registration
    pub role: Option<Role>,
}

/// Request payload for login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequestDto {
    pub username: String,
    pub password: String,
}

/// Session payload returned by register and login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionResponseDto {
    /// Bearer token for subsequent requests
    pub token: String,
    /// Session expiry timestamp (ISO 8601)
    pub expires_at: String,
    pub member: MemberDto,
}

/// Register a new account and log it in
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequestDto,
    responses(
        (status = 201, description = "Account created", body = SessionResponseDto),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 409, description = "Username already taken", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequestDto>,
) -> Result<(StatusCode, Json<SessionResponseDto>), ApiError> {
    if request.password.len() < 8 {
        return Err(validation_error(
            "Password too short",
            serde_json::json!({ "password": "Must be at least 8 characters" }),
        ));
    }

    let role = state
        .config
        .registration_role_policy
        .resolve(request.role)
        .map_err(|err| match err {
            ConfigError::RoleSelectionDisabled => validation_error(
                "Role selection is not allowed",
                serde_json::json!({ "role": "Registration always creates member accounts" }),
            ),
            other => anyhow::Error::new(other).into(),
        })?;

    let password_hash = auth::hash_password(&request.password)?;

    let repo = MemberRepository::new(&state.db);
    let member = repo
        .create_member(CreateMemberRequest {
            username: request.username,
            email: request.email,
            password_hash,
            first_name: request.first_name,
            last_name: request.last_name,
            phone: request.phone,
            birth_date: request.birth_date,
            role,
        })
        .await?;

    tracing::info!(member_id = %member.id, role = ?member.role, "Account registered");

    let session =
        auth::create_session(&state.db, member.id, state.config.session_ttl_minutes).await?;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponseDto {
            token: session.token,
            expires_at: session.expires_at.to_rfc3339(),
            member: member.into(),
        }),
    ))
}

/// Log in with username and password
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Session created", body = SessionResponseDto),
        (status = 401, description = "Invalid credentials", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequestDto>,
) -> Result<Json<SessionResponseDto>, ApiError> {
    let repo = MemberRepository::new(&state.db);

    // One message for unknown usernames and wrong passwords.
    let invalid_credentials = || unauthorized(Some("Invalid username or password"));

    let member = repo
        .get_member_by_username(&request.username)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !auth::verify_password(&request.password, &member.password_hash) {
        return Err(invalid_credentials());
    }

    if !member.active {
        return Err(unauthorized(Some("Account is deactivated")));
    }

    let session =
        auth::create_session(&state.db, member.id, state.config.session_ttl_minutes).await?;

    tracing::info!(member_id = %member.id, "Member logged in");

    Ok(Json(SessionResponseDto {
        token: session.token,
        expires_at: session.expires_at.to_rfc3339(),
        member: member.into(),
    }))
}

/// Log out, invalidating the current session token
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Session deleted"),
        (status = 401, description = "Not authenticated", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    CurrentMember(member): CurrentMember,
    SessionToken(token): SessionToken,
) -> Result<StatusCode, ApiError> {
    auth::revoke_session(&state.db, &token).await?;
    tracing::info!(member_id = %member.id, "Member logged out");
    Ok(StatusCode::NO_CONTENT)
}
