//! Common validation utilities.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

/// Maximum length of an employee code.
pub const MAX_EMPLOYEE_CODE_LENGTH: usize = 32;

lazy_static! {
    /// Employee codes are upper-case letters, digits and hyphens (e.g. `EDS1234`).
    static ref EMPLOYEE_CODE_REGEX: Regex = Regex::new(r"^[A-Z0-9-]{1,32}$").unwrap();
}

/// Normalizes a user-typed employee code: trims surrounding whitespace and
/// upper-cases it.
pub fn normalize_employee_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Validates a normalized employee code.
pub fn validate_employee_code(code: &str) -> Result<(), ValidationError> {
    if EMPLOYEE_CODE_REGEX.is_match(code) {
        Ok(())
    } else {
        let mut err = ValidationError::new("employee_code_format");
        err.message = Some(
            "Employee code must be 1-32 characters of letters, digits or hyphens".into(),
        );
        Err(err)
    }
}

/// Validates that a free-text field holds something other than whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Validates that a fuel level is a percentage (0 to 100 inclusive).
pub fn validate_fuel_level(level: i32) -> Result<(), ValidationError> {
    if (0..=100).contains(&level) {
        Ok(())
    } else {
        let mut err = ValidationError::new("fuel_level_range");
        err.message = Some("Fuel level must be between 0 and 100".into());
        Err(err)
    }
}

/// Validates that an odometer reading is non-negative.
pub fn validate_mileage(mileage: i32) -> Result<(), ValidationError> {
    if mileage >= 0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("mileage_range");
        err.message = Some("Mileage must be non-negative".into());
        Err(err)
    }
}
