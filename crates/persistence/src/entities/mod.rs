//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod booking;
pub mod employee;
pub mod trip_log;
pub mod vehicle;

pub use booking::{BookingEntity, BookingWithDetailsEntity};
pub use employee::EmployeeEntity;
pub use trip_log::TripLogEntity;
pub use vehicle::VehicleEntity;
