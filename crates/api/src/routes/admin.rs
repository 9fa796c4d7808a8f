//! Reviewer routes for the booking approval queue.
//!
//! Mounted behind `require_session` and `require_reviewer`.

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use domain::models::booking::{
    ApproveBookingRequest, BookingResponse, ListBookingsResponse, RejectBookingRequest,
};
use domain::models::BookingAction;
use persistence::repositories::BookingRepository;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::EmployeeAuth;
use crate::routes::bookings::{applied, booking_details};

/// Bookings awaiting review, oldest first.
///
/// GET /api/v1/admin/bookings/pending
pub async fn list_pending_bookings(
    State(state): State<AppState>,
) -> Result<Json<ListBookingsResponse>, ApiError> {
    let bookings = BookingRepository::new(state.pool.clone())
        .list_pending()
        .await?
        .into_iter()
        .map(|b| b.into_response())
        .collect();

    Ok(Json(ListBookingsResponse { bookings }))
}

/// Approve a pending booking.
///
/// POST /api/v1/admin/bookings/:booking_id/approve
pub async fn approve_booking(
    State(state): State<AppState>,
    auth: EmployeeAuth,
    Path(booking_id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<BookingResponse>, ApiError> {
    let request = approve_request(&body)?;
    request.validate()?;

    let comment = request
        .comment
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let outcome = BookingRepository::new(state.pool.clone())
        .approve(booking_id, &auth.actor(), comment)
        .await?;
    applied(outcome, booking_id, BookingAction::Approve)?;

    Ok(Json(booking_details(&state, booking_id).await?))
}

/// The comment is optional, so an empty body approves without one.
/// Anything else must be a well-formed request.
fn approve_request(body: &[u8]) -> Result<ApproveBookingRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ApproveBookingRequest::default());
    }
    Json::<ApproveBookingRequest>::from_bytes(body)
        .map(|Json(request)| request)
        .map_err(|e| ApiError::Validation(e.body_text()))
}

/// Reject a pending booking with a reason.
///
/// POST /api/v1/admin/bookings/:booking_id/reject
pub async fn reject_booking(
    State(state): State<AppState>,
    auth: EmployeeAuth,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<RejectBookingRequest>,
) -> Result<Json<BookingResponse>, ApiError> {
    request.validate()?;

    // A dismissed prompt leaves the booking untouched
    let reason = request
        .reason()
        .ok_or_else(|| ApiError::Validation("A rejection reason is required".to_string()))?;

    let outcome = BookingRepository::new(state.pool.clone())
        .reject(booking_id, &auth.actor(), reason)
        .await?;
    applied(outcome, booking_id, BookingAction::Reject)?;

    Ok(Json(booking_details(&state, booking_id).await?))
}
