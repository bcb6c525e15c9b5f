//! End-to-end API tests driving the full router: registration, login, role
//! gates, class enrollment, membership assignment, and the generic delete
//! endpoint.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use gymhub::auth;
use gymhub::config::{AppConfig, RegistrationRolePolicy};
use gymhub::models::member;
use gymhub::repositories::{CreateMemberRequest, MemberRepository, PlanRepository};
use gymhub::roles::Role;
use gymhub::server::{AppState, create_app, create_test_app_state};
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

async fn setup_app_with_config(config: AppConfig) -> (AppState, Router) {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("connect test db");
    Migrator::up(&db, None).await.expect("run migrations");
    gymhub::seeds::seed_plans(&db).await.expect("seed plans");

    let state = create_test_app_state(config, db);
    let app = create_app(state.clone());
    (state, app)
}

async fn setup_app() -> (AppState, Router) {
    setup_app_with_config(AppConfig {
        profile: "test".to_string(),
        ..Default::default()
    })
    .await
}

/// Creates an account directly through the repository and mints a session,
/// bypassing the registration policy so tests can set up any role.
async fn create_account(state: &AppState, username: &str, role: Role) -> (member::Model, String) {
    let account = MemberRepository::new(&state.db)
        .create_member(CreateMemberRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: auth::hash_password("correct-horse-battery").unwrap(),
            first_name: None,
            last_name: None,
            phone: None,
            birth_date: None,
            role,
        })
        .await
        .unwrap();
    let session = auth::create_session(&state.db, account.id, 720).await.unwrap();
    (account, session.token)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn health_and_root_are_public() {
    let (_state, app) = setup_app().await;

    let (status, body) = send(&app, "GET", "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "gymhub");

    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn register_login_logout_flow() {
    let (_state, app) = setup_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({
            "username": "ana.garcia",
            "email": "ana@example.com",
            "password": "super-secret-1",
            "first_name": "Ana"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["member"]["role"], "member");
    let token = body["token"].as_str().unwrap().to_string();

    // The fresh token authenticates.
    let (status, profile) = send(&app, "GET", "/api/v1/me/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["username"], "ana.garcia");
    assert!(profile.get("password_hash").is_none());

    // Login mints a second session.
    let (status, login) = send(
        &app,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({ "username": "ana.garcia", "password": "super-secret-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(login["token"], token);

    // Logout invalidates only the presented token.
    let (status, _) = send(&app, "POST", "/api/v1/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", "/api/v1/me/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_policy_controls_role_selection() {
    // Default policy: requested roles are rejected outright.
    let (_state, app) = setup_app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({
            "username": "wannabe-admin",
            "email": "w@example.com",
            "password": "super-secret-1",
            "role": "admin"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");

    // Opt-in policy honors the requested role.
    let (_state, app) = setup_app_with_config(AppConfig {
        profile: "test".to_string(),
        registration_role_policy: RegistrationRolePolicy::FormSelected,
        ..Default::default()
    })
    .await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({
            "username": "coach",
            "email": "coach@example.com",
            "password": "super-secret-1",
            "role": "trainer"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["member"]["role"], "trainer");
}

#[tokio::test]
async fn duplicate_username_registration_conflicts() {
    let (_state, app) = setup_app().await;
    let payload = json!({
        "username": "dupe",
        "email": "dupe@example.com",
        "password": "super-secret-1"
    });

    let (status, _) = send(&app, "POST", "/api/v1/auth/register", None, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "POST", "/api/v1/auth/register", None, Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn login_rejects_bad_credentials_and_deactivated_accounts() {
    let (state, app) = setup_app().await;
    let (account, _) = create_account(&state, "victor", Role::Member).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({ "username": "victor", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({ "username": "nobody", "password": "correct-horse-battery" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Deactivated accounts cannot log in even with the right password.
    MemberRepository::new(&state.db)
        .update_member_admin(
            account.id,
            gymhub::repositories::UpdateMemberAdminRequest {
                active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({ "username": "victor", "password": "correct-horse-battery" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_routes_require_a_valid_session() {
    let (_state, app) = setup_app().await;

    let (status, _) = send(&app, "GET", "/api/v1/dashboard", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/v1/dashboard", Some("bogus-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn role_gates_enforce_the_hierarchy() {
    let (state, app) = setup_app().await;
    let (_, member_token) = create_account(&state, "plain", Role::Member).await;
    let (_, trainer_token) = create_account(&state, "coach", Role::Trainer).await;
    let (_, admin_token) = create_account(&state, "boss", Role::Admin).await;

    // Members cannot reach trainer or admin surfaces.
    let (status, body) = send(&app, "GET", "/api/v1/students", Some(&member_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
    let (status, _) = send(&app, "GET", "/api/v1/admin/plans", Some(&member_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Trainers reach trainer surfaces but not admin ones.
    let (status, _) = send(&app, "GET", "/api/v1/students", Some(&trainer_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", "/api/v1/admin/plans", Some(&trainer_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admins cover trainer surfaces...
    let (status, _) = send(&app, "GET", "/api/v1/students", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", "/api/v1/admin/plans", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);

    // ...but member-only views stay member-only.
    let (status, _) = send(&app, "GET", "/api/v1/me/membership", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn dashboard_varies_by_role() {
    let (state, app) = setup_app().await;
    let (_, member_token) = create_account(&state, "plain", Role::Member).await;
    let (_, admin_token) = create_account(&state, "boss", Role::Admin).await;

    let (status, body) = send(&app, "GET", "/api/v1/dashboard", Some(&member_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "member");
    assert_eq!(body["enrolled_classes"], 0);

    let (status, body) = send(&app, "GET", "/api/v1/dashboard", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "admin");
    assert_eq!(body["members"], 2);
    assert_eq!(body["plans"], 3);
}

#[tokio::test]
async fn enrollment_flow_over_http() {
    let (state, app) = setup_app().await;
    let (_, admin_token) = create_account(&state, "boss", Role::Admin).await;
    let (_, first_token) = create_account(&state, "first", Role::Member).await;
    let (_, second_token) = create_account(&state, "second", Role::Member).await;

    let (status, class) = send(
        &app,
        "POST",
        "/api/v1/admin/classes",
        Some(&admin_token),
        Some(json!({
            "name": "Spin",
            "weekday": "wed",
            "start_time": "07:00:00",
            "capacity": 1
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let class_id = class["id"].as_str().unwrap().to_string();
    let enroll_uri = format!("/api/v1/classes/{class_id}/enroll");

    // First member takes the only seat.
    let (status, _) = send(&app, "POST", &enroll_uri, Some(&first_token), None).await;
    assert_eq!(status, StatusCode::CREATED);

    // Enrolling again is a distinct conflict from a full class.
    let (status, body) = send(&app, "POST", &enroll_uri, Some(&first_token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"]["reason"], "already_enrolled");

    let (status, body) = send(&app, "POST", &enroll_uri, Some(&second_token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"]["reason"], "capacity_exceeded");

    // Admins are not enrollable accounts.
    let (status, _) = send(&app, "POST", &enroll_uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The schedule reflects the taken seat for its holder.
    let (status, classes) = send(&app, "GET", "/api/v1/classes", Some(&first_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(classes[0]["enrolled"], 1);
    assert_eq!(classes[0]["available"], 0);
    assert_eq!(classes[0]["enrolled_by_me"], true);

    // Cancel frees the seat; cancelling twice reports not enrolled.
    let (status, _) = send(&app, "DELETE", &enroll_uri, Some(&first_token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", &enroll_uri, Some(&first_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "POST", &enroll_uri, Some(&second_token), None).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn duplicate_class_identity_conflicts_over_http() {
    let (state, app) = setup_app().await;
    let (_, admin_token) = create_account(&state, "boss", Role::Admin).await;

    let payload = json!({
        "name": "Yoga",
        "weekday": "mon",
        "start_time": "18:00:00"
    });
    let (status, _) = send(&app, "POST", "/api/v1/admin/classes", Some(&admin_token), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "POST", "/api/v1/admin/classes", Some(&admin_token), Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn membership_assignment_and_member_view() {
    let (state, app) = setup_app().await;
    let (member_account, member_token) = create_account(&state, "socia", Role::Member).await;
    let (_, admin_token) = create_account(&state, "boss", Role::Admin).await;

    // Before assignment the member sees nothing.
    let (status, _) = send(&app, "GET", "/api/v1/me/membership", Some(&member_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let plan = PlanRepository::new(&state.db)
        .get_plan_by_name("PREMIUM")
        .await
        .unwrap()
        .unwrap();

    let payload = json!({ "member_id": member_account.id, "plan_id": plan.id });
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/admin/memberships",
        Some(&admin_token),
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["plan"]["name"], "PREMIUM");
    assert_eq!(body["expired"], false);

    // One membership per member.
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/admin/memberships",
        Some(&admin_token),
        Some(payload),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"]["reason"], "duplicate_membership");

    let (status, body) = send(&app, "GET", "/api/v1/me/membership", Some(&member_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["member_id"], member_account.id.to_string());
    assert_eq!(body["expired"], false);
}

#[tokio::test]
async fn routine_assignment_over_http() {
    let (state, app) = setup_app().await;
    let (member_account, member_token) = create_account(&state, "socia", Role::Member).await;
    let (trainer_account, trainer_token) = create_account(&state, "coach", Role::Trainer).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/routines",
        Some(&trainer_token),
        Some(json!({
            "member_id": member_account.id,
            "name": "Strength block A",
            "description": "3x10 squats"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["trainer_id"], trainer_account.id.to_string());

    // Routines cannot target non-member accounts.
    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/routines",
        Some(&trainer_token),
        Some(json!({
            "member_id": trainer_account.id,
            "name": "Strength block B",
            "description": "3x10 squats"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The member sees the assigned routine.
    let (status, body) = send(&app, "GET", "/api/v1/me/routines", Some(&member_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "Strength block A");

    // Members cannot author routines.
    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/routines",
        Some(&member_token),
        Some(json!({
            "member_id": member_account.id,
            "name": "DIY",
            "description": "whatever"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn generic_delete_accepts_only_known_targets() {
    let (state, app) = setup_app().await;
    let (_, admin_token) = create_account(&state, "boss", Role::Admin).await;

    let (status, class) = send(
        &app,
        "POST",
        "/api/v1/admin/classes",
        Some(&admin_token),
        Some(json!({
            "name": "Pilates",
            "weekday": "fri",
            "start_time": "09:00:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let class_id = class["id"].as_str().unwrap().to_string();

    // Unknown tags are rejected before touching the database.
    let uri = format!("/api/v1/admin/records/member/{class_id}");
    let (status, body) = send(&app, "DELETE", &uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");

    let uri = format!("/api/v1/admin/records/class/{class_id}");
    let (status, _) = send(&app, "DELETE", &uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", &uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/v1/admin/records/plan/{}", Uuid::new_v4()),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_member_management_over_http() {
    let (state, app) = setup_app().await;
    let (member_account, member_token) = create_account(&state, "promotee", Role::Member).await;
    let (admin_account, admin_token) = create_account(&state, "boss", Role::Admin).await;

    let (status, body) = send(&app, "GET", "/api/v1/admin/members", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    // Promote, then deactivate.
    let uri = format!("/api/v1/admin/members/{}", member_account.id);
    let (status, body) = send(
        &app,
        "PATCH",
        &uri,
        Some(&admin_token),
        Some(json!({ "role": "trainer" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "trainer");

    let (status, body) = send(
        &app,
        "PATCH",
        &uri,
        Some(&admin_token),
        Some(json!({ "active": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active"], false);

    // Deactivation kills existing sessions at the middleware.
    let (status, _) = send(&app, "GET", "/api/v1/me/profile", Some(&member_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Admins cannot deactivate themselves.
    let uri = format!("/api/v1/admin/members/{}", admin_account.id);
    let (status, _) = send(
        &app,
        "PATCH",
        &uri,
        Some(&admin_token),
        Some(json!({ "active": false })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
