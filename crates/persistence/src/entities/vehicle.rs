//! Vehicle entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Vehicle, VehicleStatus};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the vehicles table.
#[derive(Debug, Clone, FromRow)]
pub struct VehicleEntity {
    pub id: Uuid,
    pub plate_number: String,
    pub brand: String,
    pub model: String,
    pub seat_capacity: i32,
    pub current_mileage: i32,
    pub image_url: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl VehicleEntity {
    /// Convert to domain model.
    pub fn into_domain(self) -> Vehicle {
        let status = self
            .status
            .parse::<VehicleStatus>()
            .unwrap_or(VehicleStatus::Maintenance);

        Vehicle {
            id: self.id,
            plate_number: self.plate_number,
            brand: self.brand,
            model: self.model,
            seat_capacity: self.seat_capacity,
            current_mileage: self.current_mileage,
            image_url: self.image_url,
            status,
            created_at: self.created_at,
        }
    }
}

impl From<VehicleEntity> for Vehicle {
    fn from(entity: VehicleEntity) -> Self {
        entity.into_domain()
    }
}
