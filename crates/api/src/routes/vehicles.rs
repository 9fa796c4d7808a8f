//! Vehicle listing and availability routes.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use domain::models::availability::{AvailabilityQuery, AvailableVehiclesResponse};
use domain::models::vehicle::ListVehiclesResponse;
use domain::models::{AvailabilitySnapshot, TimeWindow};
use persistence::repositories::VehicleRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::EmployeeAuth;

/// Fetches the vehicles free for `window`.
///
/// Every call produces a new snapshot; selections are only made against the
/// snapshot of the window they were requested for.
pub(crate) async fn availability_snapshot(
    state: &AppState,
    window: TimeWindow,
) -> Result<AvailabilitySnapshot, ApiError> {
    let vehicles = VehicleRepository::new(state.pool.clone())
        .find_available(window.start(), window.end())
        .await?
        .into_iter()
        .map(|v| v.into_domain())
        .collect();

    Ok(AvailabilitySnapshot::new(window, vehicles))
}

/// List every vehicle in the fleet.
///
/// GET /api/v1/vehicles
pub async fn list_vehicles(
    State(state): State<AppState>,
    _auth: EmployeeAuth,
) -> Result<Json<ListVehiclesResponse>, ApiError> {
    let vehicles = VehicleRepository::new(state.pool.clone())
        .list_all()
        .await?
        .into_iter()
        .map(|v| v.into_domain())
        .collect();

    Ok(Json(ListVehiclesResponse { vehicles }))
}

/// Vehicles free for a time window.
///
/// GET /api/v1/vehicles/available?start=..&end=..
pub async fn available_vehicles(
    State(state): State<AppState>,
    _auth: EmployeeAuth,
    query: Result<Query<AvailabilityQuery>, QueryRejection>,
) -> Result<Json<AvailableVehiclesResponse>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::Validation(e.body_text()))?;
    // Rejected before any query is issued
    let window = query.window()?;

    let snapshot = availability_snapshot(&state, window).await?;
    tracing::debug!(
        start = %window.start(),
        end = %window.end(),
        available = snapshot.vehicles().len(),
        "Availability queried"
    );

    Ok(Json(snapshot.into()))
}
