//! Requested time windows and vehicle availability snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::vehicle::Vehicle;

/// Error raised for an unusable time window.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("End time must be after start time")]
    EndNotAfterStart,
}

/// A half-open interval `[start, end)` with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// Builds a window, rejecting `start >= end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, WindowError> {
        if start >= end {
            return Err(WindowError::EndNotAfterStart);
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Standard interval intersection for half-open windows.
    ///
    /// Windows that merely touch (`a.end == b.start`) do not overlap.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Query parameters for GET /api/v1/vehicles/available
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl AvailabilityQuery {
    pub fn window(&self) -> Result<TimeWindow, WindowError> {
        TimeWindow::new(self.start, self.end)
    }
}

/// Error raised when selecting a vehicle that the snapshot does not offer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Vehicle {0} is not available in the requested window")]
pub struct NotAvailable(pub Uuid);

/// The vehicles found free for one specific window.
///
/// A snapshot is tied to the window it was fetched for. Changing the window
/// means fetching a new snapshot, so a selection can never carry over from a
/// previous window.
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilitySnapshot {
    window: TimeWindow,
    vehicles: Vec<Vehicle>,
}

impl AvailabilitySnapshot {
    pub fn new(window: TimeWindow, vehicles: Vec<Vehicle>) -> Self {
        Self { window, vehicles }
    }

    pub fn window(&self) -> &TimeWindow {
        &self.window
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn into_vehicles(self) -> Vec<Vehicle> {
        self.vehicles
    }

    /// Picks a vehicle out of this snapshot.
    pub fn select(&self, vehicle_id: Uuid) -> Result<&Vehicle, NotAvailable> {
        self.vehicles
            .iter()
            .find(|v| v.id == vehicle_id)
            .ok_or(NotAvailable(vehicle_id))
    }
}

/// Response for GET /api/v1/vehicles/available
#[derive(Debug, Clone, Serialize)]
pub struct AvailableVehiclesResponse {
    pub window: TimeWindow,
    pub vehicles: Vec<Vehicle>,
}

impl From<AvailabilitySnapshot> for AvailableVehiclesResponse {
    fn from(snapshot: AvailabilitySnapshot) -> Self {
        Self {
            window: snapshot.window,
            vehicles: snapshot.vehicles,
        }
    }
}
