//! Role checks for reviewer-only routes.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::extractors::EmployeeAuth;

/// Middleware that admits only reviewers (admins and approvers).
///
/// Requires `EmployeeAuth` in request extensions (use after `require_session`).
/// The role comes from the employee row read for this request.
pub async fn require_reviewer(req: Request<Body>, next: Next) -> Response {
    let Some(auth) = req.extensions().get::<EmployeeAuth>() else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "unauthorized",
                "message": "Authentication required"
            })),
        )
            .into_response();
    };

    if !auth.is_reviewer() {
        tracing::warn!(
            employee_id = %auth.employee_id,
            role = %auth.role,
            "Reviewer route refused"
        );
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "forbidden",
                "message": "Only admins and approvers may review bookings"
            })),
        )
            .into_response();
    }

    next.run(req).await
}
