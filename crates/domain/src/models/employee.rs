//! Employee domain model and identity-linking DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

// ============================================================================
// Role Enum
// ============================================================================

/// Role of an employee within the booking workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeRole {
    User,
    Admin,
    Approver,
}

impl EmployeeRole {
    /// Returns the string representation for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeRole::User => "user",
            EmployeeRole::Admin => "admin",
            EmployeeRole::Approver => "approver",
        }
    }

    /// Reviewers may approve or reject pending bookings.
    pub fn is_reviewer(&self) -> bool {
        matches!(self, EmployeeRole::Admin | EmployeeRole::Approver)
    }
}

impl fmt::Display for EmployeeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EmployeeRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(EmployeeRole::User),
            "admin" => Ok(EmployeeRole::Admin),
            "approver" => Ok(EmployeeRole::Approver),
            _ => Err(format!(
                "Invalid employee role: {}. Must be one of: user, admin, approver",
                s
            )),
        }
    }
}

// ============================================================================
// Core Model
// ============================================================================

/// A staff member eligible to book vehicles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    pub employee_code: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub department: String,
    pub role: EmployeeRole,
    #[serde(skip_serializing)]
    pub line_user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    /// Whether this employee already carries an external identity.
    pub fn is_linked(&self) -> bool {
        self.line_user_id.is_some()
    }

    /// Whether this employee is linked to exactly the given external identity.
    pub fn is_linked_to(&self, line_user_id: &str) -> bool {
        self.line_user_id.as_deref() == Some(line_user_id)
    }
}

/// Compact employee view embedded in booking listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeSummary {
    pub id: Uuid,
    pub employee_code: String,
    pub full_name: String,
    pub department: String,
}

impl From<&Employee> for EmployeeSummary {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id,
            employee_code: employee.employee_code.clone(),
            full_name: employee.full_name.clone(),
            department: employee.department.clone(),
        }
    }
}

// ============================================================================
// Request DTOs
// ============================================================================

/// Request payload for resolving a LINE identity to an employee.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResolveIdentityRequest {
    #[validate(length(min = 1, message = "id_token is required"))]
    pub id_token: String,
}

/// Request payload for the one-time link between a LINE identity and an
/// employee code.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LinkIdentityRequest {
    #[validate(length(min = 1, message = "id_token is required"))]
    pub id_token: String,

    #[validate(custom(function = "validate_raw_employee_code"))]
    pub employee_code: String,
}

impl LinkIdentityRequest {
    /// The employee code as stored: trimmed and upper-cased.
    pub fn normalized_code(&self) -> String {
        shared::validation::normalize_employee_code(&self.employee_code)
    }
}

fn validate_raw_employee_code(code: &str) -> Result<(), validator::ValidationError> {
    shared::validation::validate_employee_code(&shared::validation::normalize_employee_code(code))
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Session token handed out once an identity resolves to an employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

/// Outcome of identity resolution.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IdentityResolution {
    /// The identity is linked; the session may proceed to booking screens.
    Linked {
        employee: Employee,
        tokens: SessionTokens,
    },
    /// No employee carries this identity yet; an employee code is needed.
    LinkRequired { line_user_id: String },
}

// ============================================================================
// Tests
// ============================================================================
