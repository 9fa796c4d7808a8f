//! Domain layer for the fleet booking backend.
//!
//! This crate contains:
//! - Domain models (Employee, Vehicle, Booking, TripLog, availability windows)
//! - Booking lifecycle and authorization rules
//! - Collaborator traits for identity verification and photo storage

pub mod models;
pub mod services;
