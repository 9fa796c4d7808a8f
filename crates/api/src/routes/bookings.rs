//! Booking routes for employees.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::booking::{BookingResponse, CreateBookingRequest, ListBookingsResponse};
use domain::models::BookingAction;
use domain::services::can_view;
use persistence::repositories::{
    BookingRepository, NewBooking, TransitionOutcome, TripLogRepository, VehicleRepository,
};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::EmployeeAuth;
use crate::middleware::metrics::{record_booking_created, record_booking_transition};
use crate::routes::vehicles::availability_snapshot;

/// Unwraps a lifecycle write, turning refusals into API errors.
pub(crate) fn applied<T>(
    outcome: TransitionOutcome<T>,
    booking_id: Uuid,
    action: BookingAction,
) -> Result<T, ApiError> {
    match outcome {
        TransitionOutcome::Applied(value) => {
            record_booking_transition(action);
            info!(booking_id = %booking_id, action = %action, "Booking transition applied");
            Ok(value)
        }
        TransitionOutcome::NotFound => Err(ApiError::NotFound("Booking not found".to_string())),
        TransitionOutcome::Refused(e) => {
            warn!(booking_id = %booking_id, action = %action, reason = %e, "Booking transition refused");
            Err(e.into())
        }
        TransitionOutcome::VehicleConflict {
            booking_id: holder,
        } => {
            warn!(
                booking_id = %booking_id,
                conflicting_booking_id = %holder,
                "Vehicle already booked for an overlapping window"
            );
            Err(ApiError::Conflict(
                "Vehicle is already booked for an overlapping time window".to_string(),
            ))
        }
        TransitionOutcome::VehicleBusy { vehicle_id, status } => {
            warn!(
                booking_id = %booking_id,
                vehicle_id = %vehicle_id,
                vehicle_status = %status,
                action = %action,
                "Vehicle not available for transition"
            );
            Err(vehicle_busy(&status))
        }
    }
}

/// Conflict for a vehicle that is out on a trip or in maintenance.
pub(crate) fn vehicle_busy(status: &str) -> ApiError {
    let message = match status {
        "in_use" => "Vehicle is currently out on another trip",
        "maintenance" => "Vehicle is in maintenance",
        _ => "Vehicle is not available",
    };
    ApiError::Conflict(message.to_string())
}

/// Loads a booking with vehicle, employee and trip log joined.
pub(crate) async fn booking_details(
    state: &AppState,
    booking_id: Uuid,
) -> Result<BookingResponse, ApiError> {
    let mut response = BookingRepository::new(state.pool.clone())
        .find_with_details(booking_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Booking not found".to_string()))?
        .into_response();

    response.trip_log = TripLogRepository::new(state.pool.clone())
        .find_by_booking(booking_id)
        .await?
        .map(|t| t.into_domain());

    Ok(response)
}

/// Request a vehicle for a time window.
///
/// POST /api/v1/bookings
pub async fn create_booking(
    State(state): State<AppState>,
    auth: EmployeeAuth,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), ApiError> {
    let window = request.window()?;
    request.validate()?;

    let snapshot = availability_snapshot(&state, window).await?;
    let vehicle = match snapshot.select(request.vehicle_id) {
        Ok(vehicle) => vehicle.clone(),
        Err(not_available) => {
            let exists = VehicleRepository::new(state.pool.clone())
                .find_by_id(request.vehicle_id)
                .await?
                .is_some();
            if !exists {
                return Err(ApiError::NotFound("Vehicle not found".to_string()));
            }
            return Err(not_available.into());
        }
    };

    let booking = BookingRepository::new(state.pool.clone())
        .create(NewBooking {
            employee_id: auth.employee_id,
            vehicle_id: vehicle.id,
            start_time: window.start(),
            end_time: window.end(),
            purpose: request.purpose.trim().to_string(),
            destination: request.destination.trim().to_string(),
        })
        .await?
        .into_domain();

    record_booking_created();
    info!(
        booking_id = %booking.id,
        employee_id = %auth.employee_id,
        vehicle_id = %vehicle.id,
        "Booking requested"
    );

    Ok((
        StatusCode::CREATED,
        Json(BookingResponse {
            booking,
            vehicle: (&vehicle).into(),
            employee: None,
            trip_log: None,
        }),
    ))
}

/// The session employee's bookings, newest first.
///
/// GET /api/v1/bookings/mine
pub async fn list_my_bookings(
    State(state): State<AppState>,
    auth: EmployeeAuth,
) -> Result<Json<ListBookingsResponse>, ApiError> {
    let bookings = BookingRepository::new(state.pool.clone())
        .list_for_employee(auth.employee_id)
        .await?
        .into_iter()
        .map(|b| b.into_response())
        .collect();

    Ok(Json(ListBookingsResponse { bookings }))
}

/// One booking, visible to its owner and to reviewers.
///
/// GET /api/v1/bookings/:booking_id
pub async fn get_booking(
    State(state): State<AppState>,
    auth: EmployeeAuth,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, ApiError> {
    let response = booking_details(&state, booking_id).await?;

    if !can_view(&auth.actor(), &response.booking) {
        return Err(ApiError::Forbidden(
            "You may only view your own bookings".to_string(),
        ));
    }

    Ok(Json(response))
}

/// Withdraw a pending or approved booking.
///
/// POST /api/v1/bookings/:booking_id/cancel
pub async fn cancel_booking(
    State(state): State<AppState>,
    auth: EmployeeAuth,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, ApiError> {
    let outcome = BookingRepository::new(state.pool.clone())
        .cancel(booking_id, &auth.actor())
        .await?;
    applied(outcome, booking_id, BookingAction::Cancel)?;

    Ok(Json(booking_details(&state, booking_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::{BookingStatus, TransitionError};
    use domain::services::{AuthorizationError, LifecycleError};

    #[test]
    fn test_applied_passes_value_through() {
        let value = applied(
            TransitionOutcome::Applied(7),
            Uuid::new_v4(),
            BookingAction::Approve,
        )
        .unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_applied_maps_refusals() {
        let id = Uuid::new_v4();

        let not_found = applied::<()>(TransitionOutcome::NotFound, id, BookingAction::Cancel);
        assert!(matches!(not_found, Err(ApiError::NotFound(_))));

        let forbidden = applied::<()>(
            TransitionOutcome::Refused(LifecycleError::Forbidden(
                AuthorizationError::OwnerRequired(BookingAction::Cancel),
            )),
            id,
            BookingAction::Cancel,
        );
        assert!(matches!(forbidden, Err(ApiError::Forbidden(_))));

        let invalid = applied::<()>(
            TransitionOutcome::Refused(LifecycleError::InvalidTransition(TransitionError {
                from: BookingStatus::Completed,
                action: BookingAction::Cancel,
            })),
            id,
            BookingAction::Cancel,
        );
        assert!(matches!(invalid, Err(ApiError::Conflict(_))));

        let conflict = applied::<()>(
            TransitionOutcome::VehicleConflict {
                booking_id: Uuid::new_v4(),
            },
            id,
            BookingAction::Approve,
        );
        assert!(matches!(conflict, Err(ApiError::Conflict(_))));

        let busy = applied::<()>(
            TransitionOutcome::VehicleBusy {
                vehicle_id: Uuid::new_v4(),
                status: "in_use".to_string(),
            },
            id,
            BookingAction::StartTrip,
        );
        match busy {
            Err(ApiError::Conflict(msg)) => {
                assert_eq!(msg, "Vehicle is currently out on another trip")
            }
            other => panic!("Expected Conflict error, got {:?}", other),
        }
    }

    #[test]
    fn test_vehicle_busy_messages() {
        for (status, message) in [
            ("in_use", "Vehicle is currently out on another trip"),
            ("maintenance", "Vehicle is in maintenance"),
            ("scrapped", "Vehicle is not available"),
        ] {
            match vehicle_busy(status) {
                ApiError::Conflict(msg) => assert_eq!(msg, message),
                other => panic!("Expected Conflict error, got {:?}", other),
            }
        }
    }
}
