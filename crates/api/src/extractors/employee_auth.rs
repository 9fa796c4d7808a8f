//! Employee session extractor.
//!
//! Turns the `Authorization: Bearer` session token into the employee the
//! request acts for. The employee row is re-read on every request so role
//! changes and removals take effect before the token expires.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use domain::models::EmployeeRole;
use domain::services::Actor;
use persistence::repositories::EmployeeRepository;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// The authenticated employee of a request.
#[derive(Debug, Clone)]
pub struct EmployeeAuth {
    pub employee_id: Uuid,
    /// Role as currently stored, not as of token issue.
    pub role: EmployeeRole,
    /// JWT ID (jti) for session tracking.
    pub jti: String,
}

impl EmployeeAuth {
    /// The lifecycle actor for this session.
    pub fn actor(&self) -> Actor {
        Actor::new(self.employee_id, self.role)
    }

    pub fn is_reviewer(&self) -> bool {
        self.role.is_reviewer()
    }

    /// Validates the bearer token and loads the employee it names.
    pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Self, ApiError> {
        let token = bearer_token(headers)?;

        let claims = state.jwt.validate_session(token)?;
        let employee_id = claims.employee_id()?;

        let employee = EmployeeRepository::new(state.pool.clone())
            .find_by_id(employee_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Employee no longer exists".to_string()))?
            .into_domain();

        Ok(Self {
            employee_id: employee.id,
            role: employee.role,
            jti: claims.jti,
        })
    }
}

/// Extracts the token from an `Authorization: Bearer` header.
fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header format".to_string()))
}

#[async_trait]
impl FromRequestParts<AppState> for EmployeeAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Already resolved by the session middleware
        if let Some(auth) = parts.extensions.get::<EmployeeAuth>() {
            return Ok(auth.clone());
        }

        Self::authenticate(state, &parts.headers).await
    }
}
