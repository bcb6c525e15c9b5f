//! # Server Configuration
//!
//! Router assembly and startup for the gymhub API. Public routes (service
//! info, health, register, login) sit outside the session middleware; every
//! other route requires a valid bearer session.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth;
use crate::config::AppConfig;
use crate::handlers;
use crate::telemetry;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/api/v1/auth/register", post(handlers::auth::register))
        .route("/api/v1/auth/login", post(handlers::auth::login));

    let protected = Router::new()
        .route("/api/v1/auth/logout", post(handlers::auth::logout))
        .route("/api/v1/dashboard", get(handlers::profile::dashboard))
        .route(
            "/api/v1/me/profile",
            get(handlers::profile::get_profile).patch(handlers::profile::update_profile),
        )
        .route(
            "/api/v1/me/membership",
            get(handlers::profile::get_my_membership),
        )
        .route(
            "/api/v1/me/routines",
            get(handlers::profile::get_my_routines),
        )
        .route("/api/v1/classes", get(handlers::classes::list_classes))
        .route(
            "/api/v1/classes/{id}/enroll",
            post(handlers::classes::enroll).delete(handlers::classes::cancel_enrollment),
        )
        .route("/api/v1/students", get(handlers::members::list_students))
        .route(
            "/api/v1/routines",
            get(handlers::routines::list_authored_routines)
                .post(handlers::routines::assign_routine),
        )
        .route(
            "/api/v1/routines/{id}",
            patch(handlers::routines::update_routine).delete(handlers::routines::delete_routine),
        )
        .route("/api/v1/admin/members", get(handlers::members::list_members))
        .route(
            "/api/v1/admin/members/{id}",
            patch(handlers::members::update_member),
        )
        .route(
            "/api/v1/admin/plans",
            get(handlers::plans::list_plans).post(handlers::plans::create_plan),
        )
        .route(
            "/api/v1/admin/plans/{id}",
            patch(handlers::plans::update_plan),
        )
        .route(
            "/api/v1/admin/memberships",
            get(handlers::memberships::list_memberships)
                .post(handlers::memberships::assign_membership),
        )
        .route(
            "/api/v1/admin/memberships/{id}",
            patch(handlers::memberships::update_membership),
        )
        .route(
            "/api/v1/admin/classes",
            get(handlers::classes::list_classes).post(handlers::classes::create_class),
        )
        .route(
            "/api/v1/admin/classes/{id}",
            patch(handlers::classes::update_class),
        )
        .route(
            "/api/v1/admin/records/{target}/{id}",
            delete(handlers::records::delete_record),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    public
        .merge(protected)
        .with_state(state)
        .layer(middleware::from_fn(telemetry::trace_context_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
}

/// Builds an [`AppState`] for handler and integration tests
pub fn create_test_app_state(config: AppConfig, db: DatabaseConnection) -> AppState {
    AppState {
        config: Arc::new(config),
        db,
    }
}

/// Starts the server with the given configuration
pub async fn run_server(
    config: AppConfig,
    db: DatabaseConnection,
) -> Result<(), Box<dyn std::error::Error>> {
    // Resolve the configured bind address
    let addr = config
        .bind_addr()
        .map_err(|e| format!("Invalid server address: {}", e))?;

    let profile = config.profile.clone();
    let state = AppState {
        config: Arc::new(config),
        db,
    };
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on: {}", addr);
    tracing::info!("Running in profile: {}", profile);

    axum::serve(listener, app).await?;

    Ok(())
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::health,
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::logout,
        crate::handlers::profile::dashboard,
        crate::handlers::profile::get_profile,
        crate::handlers::profile::update_profile,
        crate::handlers::profile::get_my_membership,
        crate::handlers::profile::get_my_routines,
        crate::handlers::classes::list_classes,
        crate::handlers::classes::enroll,
        crate::handlers::classes::cancel_enrollment,
        crate::handlers::classes::create_class,
        crate::handlers::classes::update_class,
        crate::handlers::members::list_students,
        crate::handlers::members::list_members,
        crate::handlers::members::update_member,
        crate::handlers::plans::list_plans,
        crate::handlers::plans::create_plan,
        crate::handlers::plans::update_plan,
        crate::handlers::memberships::list_memberships,
        crate::handlers::memberships::assign_membership,
        crate::handlers::memberships::update_membership,
        crate::handlers::routines::list_authored_routines,
        crate::handlers::routines::assign_routine,
        crate::handlers::routines::update_routine,
        crate::handlers::routines::delete_routine,
        crate::handlers::records::delete_record,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::error::ApiError,
            crate::roles::Role,
            crate::models::class_session::Weekday,
            crate::handlers::types::MemberDto,
            crate::handlers::types::PlanDto,
            crate::handlers::types::MembershipDto,
            crate::handlers::types::ClassSessionDto,
            crate::handlers::types::RoutineDto,
            crate::handlers::auth::RegisterRequestDto,
            crate::handlers::auth::LoginRequestDto,
            crate::handlers::auth::SessionResponseDto,
            crate::handlers::profile::DashboardDto,
            crate::handlers::profile::UpdateProfileDto,
            crate::handlers::classes::CreateClassSessionDto,
            crate::handlers::classes::UpdateClassSessionDto,
            crate::handlers::members::UpdateMemberAdminDto,
            crate::handlers::plans::CreatePlanDto,
            crate::handlers::plans::UpdatePlanDto,
            crate::handlers::memberships::AssignMembershipDto,
            crate::handlers::memberships::UpdateMembershipDto,
            crate::handlers::routines::AssignRoutineDto,
            crate::handlers::routines::UpdateRoutineDto,
            crate::handlers::records::DeleteTarget,
        )
    ),
    info(
        title = "Gymhub API",
        description = "API for gym membership, class scheduling, and routines",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
