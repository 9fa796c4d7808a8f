//! Employee repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::EmployeeEntity;
use crate::metrics::QueryTimer;

const EMPLOYEE_COLUMNS: &str = "id, employee_code, full_name, email, department, role, \
                                line_user_id, created_at, updated_at";

/// Repository for employee database operations.
#[derive(Clone)]
pub struct EmployeeRepository {
    pool: PgPool,
}

impl EmployeeRepository {
    /// Creates a new EmployeeRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find employee by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<EmployeeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_employee_by_id");
        let result = sqlx::query_as::<_, EmployeeEntity>(&format!(
            "SELECT {} FROM employees WHERE id = $1",
            EMPLOYEE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result)
    }

    /// Find the employee carrying an external identity.
    pub async fn find_by_line_user_id(
        &self,
        line_user_id: &str,
    ) -> Result<Option<EmployeeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_employee_by_line_user_id");
        let result = sqlx::query_as::<_, EmployeeEntity>(&format!(
            "SELECT {} FROM employees WHERE line_user_id = $1",
            EMPLOYEE_COLUMNS
        ))
        .bind(line_user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result)
    }

    /// Find employee by (normalized) employee code.
    pub async fn find_by_code(&self, code: &str) -> Result<Option<EmployeeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_employee_by_code");
        let result = sqlx::query_as::<_, EmployeeEntity>(&format!(
            "SELECT {} FROM employees WHERE employee_code = $1",
            EMPLOYEE_COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result)
    }

    /// Attach an external identity to an employee.
    ///
    /// Only succeeds while the employee is unlinked or already linked to the
    /// same identity; returns `None` otherwise. An identity held by another
    /// employee fails with a unique violation.
    pub async fn link_line_identity(
        &self,
        employee_id: Uuid,
        line_user_id: &str,
    ) -> Result<Option<EmployeeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("link_employee_line_identity");
        let result = sqlx::query_as::<_, EmployeeEntity>(&format!(
            r#"
            UPDATE employees
            SET line_user_id = $2
            WHERE id = $1 AND (line_user_id IS NULL OR line_user_id = $2)
            RETURNING {}
            "#,
            EMPLOYEE_COLUMNS
        ))
        .bind(employee_id)
        .bind(line_user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result)
    }
}

#[cfg(test)]
mod tests {
    // EmployeeRepository tests require a database connection and are covered by integration tests
}
