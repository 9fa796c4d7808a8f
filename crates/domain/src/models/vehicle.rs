//! Vehicle domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Whether a vehicle is currently committed to a trip.
///
/// This is a cache of the lifecycle of the vehicle's active booking: it only
/// moves to `InUse` with a booking entering `in_use`, and back to `Available`
/// with that booking reaching `completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    Available,
    InUse,
    Maintenance,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Available => "available",
            VehicleStatus::InUse => "in_use",
            VehicleStatus::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for VehicleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(VehicleStatus::Available),
            "in_use" => Ok(VehicleStatus::InUse),
            "maintenance" => Ok(VehicleStatus::Maintenance),
            _ => Err(format!(
                "Invalid vehicle status: {}. Must be one of: available, in_use, maintenance",
                s
            )),
        }
    }
}

/// A shared company vehicle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: Uuid,
    pub plate_number: String,
    pub brand: String,
    pub model: String,
    pub seat_capacity: i32,
    pub current_mileage: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub status: VehicleStatus,
    pub created_at: DateTime<Utc>,
}

/// Compact vehicle view embedded in booking listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleSummary {
    pub id: Uuid,
    pub plate_number: String,
    pub brand: String,
    pub model: String,
}

impl From<&Vehicle> for VehicleSummary {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            id: vehicle.id,
            plate_number: vehicle.plate_number.clone(),
            brand: vehicle.brand.clone(),
            model: vehicle.model.clone(),
        }
    }
}

/// Response for GET /api/v1/vehicles
#[derive(Debug, Clone, Serialize)]
pub struct ListVehiclesResponse {
    pub vehicles: Vec<Vehicle>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_status_from_str() {
        assert_eq!("available".parse::<VehicleStatus>().unwrap(), VehicleStatus::Available);
        assert_eq!("in_use".parse::<VehicleStatus>().unwrap(), VehicleStatus::InUse);
        assert_eq!(
            "maintenance".parse::<VehicleStatus>().unwrap(),
            VehicleStatus::Maintenance
        );
        assert!("broken".parse::<VehicleStatus>().is_err());
    }

    #[test]
    fn test_vehicle_status_serde() {
        assert_eq!(
            serde_json::to_string(&VehicleStatus::InUse).unwrap(),
            "\"in_use\""
        );
    }

    #[test]
    fn test_summary_from_vehicle() {
        let vehicle = Vehicle {
            id: Uuid::new_v4(),
            plate_number: "1กข 1234".to_string(),
            brand: "Toyota".to_string(),
            model: "Hilux".to_string(),
            seat_capacity: 4,
            current_mileage: 52_000,
            image_url: None,
            status: VehicleStatus::Available,
            created_at: Utc::now(),
        };
        let summary = VehicleSummary::from(&vehicle);
        assert_eq!(summary.id, vehicle.id);
        assert_eq!(summary.model, "Hilux");
    }
}
