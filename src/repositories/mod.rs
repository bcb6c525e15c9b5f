//! # Repositories
//!
//! Database access layer, one repository per aggregate.

pub mod class_session;
pub mod enrollment;
pub mod member;
pub mod membership;
pub mod plan;
pub mod routine;

pub use class_session::{ClassSessionRepository, CreateClassSessionRequest, UpdateClassSessionRequest};
pub use enrollment::EnrollmentRepository;
pub use member::{CreateMemberRequest, MemberRepository, UpdateMemberAdminRequest, UpdateProfileRequest};
pub use membership::{AssignMembershipRequest, MembershipRepository, UpdateMembershipRequest};
pub use plan::{CreatePlanRequest, PlanRepository, UpdatePlanRequest};
pub use routine::{AssignRoutineRequest, RoutineRepository, UpdateRoutineRequest};
