//! # Gymhub API Library
//!
//! Core functionality for the gymhub gym-management service: authentication,
//! membership plans, class scheduling with capacity-enforced enrollment, and
//! trainer-assigned routines.

pub mod auth;
pub mod config;
pub mod db;
pub mod enrollment;
pub mod error;
pub mod expiry;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod roles;
pub mod seeds;
pub mod server;
pub mod telemetry;
pub use migration;
