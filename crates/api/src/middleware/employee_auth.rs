//! Session authentication middleware.
//!
//! Resolves the bearer session token once per request and stores the
//! resulting [`EmployeeAuth`] in request extensions for handlers and the
//! role middleware.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::extractors::EmployeeAuth;

/// Middleware that requires a valid employee session.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match EmployeeAuth::authenticate(&state, req.headers()).await {
        Ok(auth) => {
            tracing::Span::current().record("employee_id", tracing::field::display(auth.employee_id));
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "Session authentication failed");
            e.into_response()
        }
    }
}
