//! Custom Axum extractors.

pub mod employee_auth;

pub use employee_auth::EmployeeAuth;
