//! Trip log entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::TripLog;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the trip_logs table.
#[derive(Debug, Clone, FromRow)]
pub struct TripLogEntity {
    pub booking_id: Uuid,
    pub start_mileage: i32,
    pub start_fuel_level: i32,
    pub start_image_url: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_mileage: Option<i32>,
    pub end_fuel_level: Option<i32>,
    pub end_image_url: Option<String>,
    pub end_time: Option<DateTime<Utc>>,
}

impl TripLogEntity {
    /// Convert to domain model.
    pub fn into_domain(self) -> TripLog {
        TripLog {
            booking_id: self.booking_id,
            start_mileage: self.start_mileage,
            start_fuel_level: self.start_fuel_level,
            start_image_url: self.start_image_url,
            start_time: self.start_time,
            end_mileage: self.end_mileage,
            end_fuel_level: self.end_fuel_level,
            end_image_url: self.end_image_url,
            end_time: self.end_time,
        }
    }
}

impl From<TripLogEntity> for TripLog {
    fn from(entity: TripLogEntity) -> Self {
        entity.into_domain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_to_domain() {
        let entity = TripLogEntity {
            booking_id: Uuid::new_v4(),
            start_mileage: 10_000,
            start_fuel_level: 80,
            start_image_url: Some("https://cdn/start.jpg".to_string()),
            start_time: Utc::now(),
            end_mileage: Some(10_050),
            end_fuel_level: Some(45),
            end_image_url: Some("https://cdn/end.jpg".to_string()),
            end_time: Some(Utc::now()),
        };
        let log: TripLog = entity.clone().into();

        assert_eq!(log.booking_id, entity.booking_id);
        assert_eq!(log.end_mileage, Some(10_050));
        assert!(!log.is_open());
        assert_eq!(log.end_image_url.as_deref(), Some("https://cdn/end.jpg"));
    }
}
