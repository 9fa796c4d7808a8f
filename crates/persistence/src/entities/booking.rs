//! Booking entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::booking::BookingResponse;
use domain::models::employee::EmployeeSummary;
use domain::models::vehicle::VehicleSummary;
use domain::models::{Booking, BookingStatus};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the bookings table.
#[derive(Debug, Clone, FromRow)]
pub struct BookingEntity {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub vehicle_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub purpose: String,
    pub destination: String,
    pub status: String,
    pub approver_comment: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn parse_status(booking_id: Uuid, raw: &str) -> BookingStatus {
    // An unreadable status is treated as terminal so no action applies to it.
    raw.parse::<BookingStatus>().unwrap_or_else(|e| {
        tracing::warn!(booking_id = %booking_id, error = %e, "Unknown booking status");
        BookingStatus::Cancelled
    })
}

impl BookingEntity {
    /// Convert to domain model.
    pub fn into_domain(self) -> Booking {
        Booking {
            status: parse_status(self.id, &self.status),
            id: self.id,
            employee_id: self.employee_id,
            vehicle_id: self.vehicle_id,
            start_time: self.start_time,
            end_time: self.end_time,
            purpose: self.purpose,
            destination: self.destination,
            approver_comment: self.approver_comment,
            reviewed_by: self.reviewed_by,
            reviewed_at: self.reviewed_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<BookingEntity> for Booking {
    fn from(entity: BookingEntity) -> Self {
        entity.into_domain()
    }
}

/// Booking row joined with its vehicle and employee.
#[derive(Debug, Clone, FromRow)]
pub struct BookingWithDetailsEntity {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub vehicle_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub purpose: String,
    pub destination: String,
    pub status: String,
    pub approver_comment: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub vehicle_plate_number: String,
    pub vehicle_brand: String,
    pub vehicle_model: String,
    pub employee_code: String,
    pub employee_full_name: String,
    pub employee_department: String,
}

impl BookingWithDetailsEntity {
    /// Convert to an API response without the trip log.
    pub fn into_response(self) -> BookingResponse {
        let vehicle = VehicleSummary {
            id: self.vehicle_id,
            plate_number: self.vehicle_plate_number,
            brand: self.vehicle_brand,
            model: self.vehicle_model,
        };
        let employee = EmployeeSummary {
            id: self.employee_id,
            employee_code: self.employee_code,
            full_name: self.employee_full_name,
            department: self.employee_department,
        };
        let booking = Booking {
            status: parse_status(self.id, &self.status),
            id: self.id,
            employee_id: self.employee_id,
            vehicle_id: self.vehicle_id,
            start_time: self.start_time,
            end_time: self.end_time,
            purpose: self.purpose,
            destination: self.destination,
            approver_comment: self.approver_comment,
            reviewed_by: self.reviewed_by,
            reviewed_at: self.reviewed_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };

        BookingResponse {
            booking,
            vehicle,
            employee: Some(employee),
            trip_log: None,
        }
    }
}

impl From<BookingWithDetailsEntity> for BookingResponse {
    fn from(entity: BookingWithDetailsEntity) -> Self {
        entity.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn create_test_entity(status: &str) -> BookingEntity {
        let now = Utc::now();
        BookingEntity {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            vehicle_id: Uuid::new_v4(),
            start_time: now,
            end_time: now + Duration::hours(3),
            purpose: "Customer meeting".to_string(),
            destination: "Silom".to_string(),
            status: status.to_string(),
            approver_comment: None,
            reviewed_by: None,
            reviewed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_entity_to_domain() {
        let entity = create_test_entity("in_use");
        let booking: Booking = entity.clone().into();

        assert_eq!(booking.id, entity.id);
        assert_eq!(booking.status, BookingStatus::InUse);
        assert!(booking.window().is_ok());
    }

    #[test]
    fn test_unknown_status_is_terminal() {
        let booking = create_test_entity("lost").into_domain();
        assert!(booking.status.is_terminal());
    }

    #[test]
    fn test_details_to_response() {
        let b = create_test_entity("pending");
        let entity = BookingWithDetailsEntity {
            id: b.id,
            employee_id: b.employee_id,
            vehicle_id: b.vehicle_id,
            start_time: b.start_time,
            end_time: b.end_time,
            purpose: b.purpose,
            destination: b.destination,
            status: b.status,
            approver_comment: None,
            reviewed_by: None,
            reviewed_at: None,
            created_at: b.created_at,
            updated_at: b.updated_at,
            vehicle_plate_number: "2กค 5678".to_string(),
            vehicle_brand: "Honda".to_string(),
            vehicle_model: "Civic".to_string(),
            employee_code: "EDS1234".to_string(),
            employee_full_name: "Malee Sukjai".to_string(),
            employee_department: "Finance".to_string(),
        };

        let response: BookingResponse = entity.into();
        assert_eq!(response.vehicle.id, b.vehicle_id);
        assert_eq!(response.vehicle.model, "Civic");
        assert_eq!(response.employee.unwrap().employee_code, "EDS1234");
        assert!(response.trip_log.is_none());
    }
}
