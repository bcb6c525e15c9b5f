//! Database migrations for the gymhub API.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2025_06_02_100000_create_members;
mod m2025_06_02_100100_create_auth_sessions;
mod m2025_06_02_100200_create_plans;
mod m2025_06_02_100300_create_memberships;
mod m2025_06_02_100400_create_class_sessions;
mod m2025_06_02_100500_create_enrollments;
mod m2025_06_02_100600_create_routines;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2025_06_02_100000_create_members::Migration),
            Box::new(m2025_06_02_100100_create_auth_sessions::Migration),
            Box::new(m2025_06_02_100200_create_plans::Migration),
            Box::new(m2025_06_02_100300_create_memberships::Migration),
            Box::new(m2025_06_02_100400_create_class_sessions::Migration),
            Box::new(m2025_06_02_100500_create_enrollments::Migration),
            Box::new(m2025_06_02_100600_create_routines::Migration),
        ]
    }
}
