//! LINE identity resolution and linking routes.

use axum::{extract::State, Json};
use domain::models::employee::{
    Employee, IdentityResolution, LinkIdentityRequest, ResolveIdentityRequest, SessionTokens,
};
use persistence::repositories::EmployeeRepository;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::EmployeeAuth;

/// Issues a session token for a resolved employee.
fn issue_tokens(state: &AppState, employee_id: Uuid) -> Result<SessionTokens, ApiError> {
    let issued = state.jwt.issue_session(employee_id)?;
    Ok(SessionTokens {
        access_token: issued.token,
        token_type: "Bearer".to_string(),
        expires_at: issued.expires_at,
    })
}

fn linked(state: &AppState, employee: Employee) -> Result<Json<IdentityResolution>, ApiError> {
    let tokens = issue_tokens(state, employee.id)?;
    Ok(Json(IdentityResolution::Linked { employee, tokens }))
}

/// Resolve a LINE identity to an employee.
///
/// POST /api/v1/auth/line
pub async fn resolve_identity(
    State(state): State<AppState>,
    Json(request): Json<ResolveIdentityRequest>,
) -> Result<Json<IdentityResolution>, ApiError> {
    request.validate()?;

    let identity = state.identity.verify(&request.id_token).await?;

    let repo = EmployeeRepository::new(state.pool.clone());
    match repo.find_by_line_user_id(&identity.line_user_id).await? {
        Some(entity) => {
            let employee = entity.into_domain();
            info!(employee_id = %employee.id, "LINE identity resolved");
            linked(&state, employee)
        }
        None => {
            info!(line_user_id = %identity.line_user_id, "LINE identity not linked yet");
            Ok(Json(IdentityResolution::LinkRequired {
                line_user_id: identity.line_user_id,
            }))
        }
    }
}

/// Link a LINE identity to an employee code, once.
///
/// POST /api/v1/auth/line/link
pub async fn link_identity(
    State(state): State<AppState>,
    Json(request): Json<LinkIdentityRequest>,
) -> Result<Json<IdentityResolution>, ApiError> {
    request.validate()?;
    let code = request.normalized_code();

    let identity = state.identity.verify(&request.id_token).await?;
    let line_user_id = identity.line_user_id;

    let repo = EmployeeRepository::new(state.pool.clone());
    let employee = repo
        .find_by_code(&code)
        .await?
        .map(|e| e.into_domain())
        .ok_or_else(|| ApiError::NotFound("Employee code not found".to_string()))?;

    if employee.is_linked_to(&line_user_id) {
        info!(employee_id = %employee.id, "LINE identity already linked, re-issuing session");
        return linked(&state, employee);
    }

    if employee.is_linked() {
        warn!(employee_id = %employee.id, "Employee already linked to another LINE account");
        return Err(ApiError::Conflict(
            "This employee is already linked to another LINE account".to_string(),
        ));
    }

    if let Some(holder) = repo.find_by_line_user_id(&line_user_id).await? {
        warn!(
            employee_id = %employee.id,
            holder_id = %holder.id,
            "LINE account already linked to another employee"
        );
        return Err(identity_taken());
    }

    let updated = repo
        .link_line_identity(employee.id, &line_user_id)
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Conflict(_) => identity_taken(),
            other => other,
        })?
        .ok_or_else(|| {
            ApiError::Conflict(
                "This employee is already linked to another LINE account".to_string(),
            )
        })?
        .into_domain();

    info!(employee_id = %updated.id, "LINE identity linked");
    linked(&state, updated)
}

fn identity_taken() -> ApiError {
    ApiError::Conflict("This LINE account is already linked to another employee".to_string())
}

/// The employee behind the current session.
///
/// GET /api/v1/me
pub async fn current_employee(
    State(state): State<AppState>,
    auth: EmployeeAuth,
) -> Result<Json<Employee>, ApiError> {
    let employee = EmployeeRepository::new(state.pool.clone())
        .find_by_id(auth.employee_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Employee not found".to_string()))?
        .into_domain();

    Ok(Json(employee))
}
