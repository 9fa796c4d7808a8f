//! Repository implementations for database operations.

pub mod booking;
pub mod employee;
pub mod trip_log;
pub mod vehicle;

pub use booking::{BookingRepository, NewBooking, TransitionOutcome};
pub use employee::EmployeeRepository;
pub use trip_log::TripLogRepository;
pub use vehicle::VehicleRepository;
