//! Domain models for fleet booking.

pub mod availability;
pub mod booking;
pub mod employee;
pub mod trip_log;
pub mod vehicle;

pub use availability::{AvailabilitySnapshot, NotAvailable, TimeWindow, WindowError};
pub use booking::{Booking, BookingAction, BookingStatus, TransitionError};
pub use employee::{Employee, EmployeeRole};
pub use trip_log::{TripLog, TripPhase, TripReading};
pub use vehicle::{Vehicle, VehicleStatus};
