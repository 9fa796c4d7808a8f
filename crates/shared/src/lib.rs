//! Shared utilities for the fleet booking backend.
//!
//! This crate provides functionality used across all other crates:
//! - Session token signing and validation (RS256 JWT)
//! - Field validators shared by request DTOs

pub mod jwt;
pub mod validation;
