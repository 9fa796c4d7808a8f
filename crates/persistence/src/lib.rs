//! Persistence layer for the fleet booking backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Repository implementations
//! - Query duration metrics

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
