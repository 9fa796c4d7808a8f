//! Employee entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Employee, EmployeeRole};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the employees table.
#[derive(Debug, Clone, FromRow)]
pub struct EmployeeEntity {
    pub id: Uuid,
    pub employee_code: String,
    pub full_name: String,
    pub email: Option<String>,
    pub department: String,
    pub role: String,
    pub line_user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EmployeeEntity {
    /// Convert to domain model.
    ///
    /// An unknown role degrades to `user`, never to a reviewer role.
    pub fn into_domain(self) -> Employee {
        let role = self.role.parse::<EmployeeRole>().unwrap_or_else(|e| {
            tracing::warn!(employee_id = %self.id, error = %e, "Unknown employee role");
            EmployeeRole::User
        });

        Employee {
            id: self.id,
            employee_code: self.employee_code,
            full_name: self.full_name,
            email: self.email,
            department: self.department,
            role,
            line_user_id: self.line_user_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<EmployeeEntity> for Employee {
    fn from(entity: EmployeeEntity) -> Self {
        entity.into_domain()
    }
}
