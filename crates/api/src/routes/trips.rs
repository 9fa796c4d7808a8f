//! Trip log routes: odometer, fuel and photo at pickup and return.

use axum::{
    extract::{Path, State},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::Utc;
use domain::models::trip_log::{PhotoUpload, RecordTripRequest, TripLogResponse};
use domain::models::TripPhase;
use domain::services::{can_view, photo_object_key, plan};
use persistence::repositories::{BookingRepository, TripLogRepository, VehicleRepository};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::EmployeeAuth;
use crate::middleware::metrics::record_trip_photo_uploaded;
use crate::routes::bookings::{applied, vehicle_busy};

/// Record the start of a trip (`approved` → `in_use`).
///
/// POST /api/v1/bookings/:booking_id/trip/start
pub async fn start_trip(
    State(state): State<AppState>,
    auth: EmployeeAuth,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<RecordTripRequest>,
) -> Result<Json<TripLogResponse>, ApiError> {
    record_trip(&state, &auth, booking_id, TripPhase::Start, request).await
}

/// Record the end of a trip (`in_use` → `completed`).
///
/// POST /api/v1/bookings/:booking_id/trip/end
pub async fn end_trip(
    State(state): State<AppState>,
    auth: EmployeeAuth,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<RecordTripRequest>,
) -> Result<Json<TripLogResponse>, ApiError> {
    record_trip(&state, &auth, booking_id, TripPhase::End, request).await
}

/// The trip log of a booking, visible to its owner and to reviewers.
///
/// GET /api/v1/bookings/:booking_id/trip
pub async fn get_trip_log(
    State(state): State<AppState>,
    auth: EmployeeAuth,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<TripLogResponse>, ApiError> {
    let booking = BookingRepository::new(state.pool.clone())
        .find_by_id(booking_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Booking not found".to_string()))?
        .into_domain();

    if !can_view(&auth.actor(), &booking) {
        return Err(ApiError::Forbidden(
            "You may only view your own bookings".to_string(),
        ));
    }

    let trip_log = TripLogRepository::new(state.pool.clone())
        .find_by_booking(booking_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No trip recorded for this booking".to_string()))?
        .into_domain();

    Ok(Json(trip_log.into()))
}

async fn record_trip(
    state: &AppState,
    auth: &EmployeeAuth,
    booking_id: Uuid,
    phase: TripPhase,
    request: RecordTripRequest,
) -> Result<Json<TripLogResponse>, ApiError> {
    request.validate()?;
    let actor = auth.actor();

    // Refuse before anything is uploaded; re-checked under lock on write
    let booking = BookingRepository::new(state.pool.clone())
        .find_by_id(booking_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Booking not found".to_string()))?
        .into_domain();
    plan(phase.action(), &actor, &booking)?;
    if phase == TripPhase::Start {
        let vehicle = VehicleRepository::new(state.pool.clone())
            .find_by_id(booking.vehicle_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Vehicle not found".to_string()))?;
        if vehicle.status != "available" {
            return Err(vehicle_busy(&vehicle.status));
        }
    }

    let photo_url = match &request.photo {
        Some(photo) => Some(upload_photo(state, booking_id, phase, photo).await?),
        None => None,
    };
    let reading = request.into_reading(photo_url);

    let outcome = TripLogRepository::new(state.pool.clone())
        .record(booking_id, &actor, phase, &reading)
        .await
        .map_err(|e| {
            if let Some(url) = &reading.photo_url {
                tracing::warn!(photo_url = %url, "Trip write failed after photo upload");
            }
            ApiError::from(e)
        })?;
    let trip_log = applied(outcome, booking_id, phase.action())?.into_domain();

    tracing::info!(
        booking_id = %booking_id,
        phase = %phase,
        mileage = reading.mileage,
        fuel_level = reading.fuel_level,
        "Trip reading recorded"
    );

    Ok(Json(trip_log.into()))
}

/// Decodes an inline photo and stores it, returning its public URL.
async fn upload_photo(
    state: &AppState,
    booking_id: Uuid,
    phase: TripPhase,
    photo: &PhotoUpload,
) -> Result<String, ApiError> {
    let bytes = decode_photo(&photo.content_base64)?;
    let extension = photo.extension();
    let content_type = mime_guess::from_ext(&extension)
        .first_or_octet_stream()
        .to_string();
    let key = photo_object_key(booking_id, phase, Utc::now(), &extension);

    let stored = state.storage.upload(&key, &content_type, bytes).await?;
    record_trip_photo_uploaded(phase);

    Ok(stored.public_url)
}

/// Decodes base64 photo content, accepting an optional data-URL prefix.
fn decode_photo(content: &str) -> Result<Vec<u8>, ApiError> {
    let content = content.trim();
    let payload = match content.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => content,
    };

    let bytes = STANDARD
        .decode(payload)
        .map_err(|_| ApiError::Validation("photo content is not valid base64".to_string()))?;

    if bytes.is_empty() {
        return Err(ApiError::Validation("photo content is empty".to_string()));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_photo_plain() {
        let encoded = STANDARD.encode([0xFF, 0xD8, 0xFF]);
        assert_eq!(decode_photo(&encoded).unwrap(), vec![0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn test_decode_photo_data_url() {
        let encoded = format!("data:image/png;base64,{}", STANDARD.encode(b"png"));
        assert_eq!(decode_photo(&encoded).unwrap(), b"png".to_vec());
    }

    #[test]
    fn test_decode_photo_rejects_garbage() {
        assert!(matches!(
            decode_photo("not base64!!"),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(decode_photo("   "), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_content_type_guess() {
        assert_eq!(
            mime_guess::from_ext("jpg").first_or_octet_stream().to_string(),
            "image/jpeg"
        );
        assert_eq!(
            mime_guess::from_ext("png").first_or_octet_stream().to_string(),
            "image/png"
        );
    }
}
