//! Database seeding functionality
//!
//! Populates the database with initial data at startup. Currently only the
//! plan catalogue is seeded.

pub mod plan;

pub use plan::seed_plans;
