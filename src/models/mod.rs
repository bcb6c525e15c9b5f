//! # Data Models
//!
//! SeaORM entity models for the gymhub API, one module per table.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod auth_session;
pub mod class_session;
pub mod enrollment;
pub mod member;
pub mod membership;
pub mod plan;
pub mod routine;

pub use auth_session::Entity as AuthSession;
pub use class_session::Entity as ClassSession;
pub use enrollment::Entity as Enrollment;
pub use member::Entity as Member;
pub use membership::Entity as Membership;
pub use plan::Entity as Plan;
pub use routine::Entity as Routine;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "gymhub".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
