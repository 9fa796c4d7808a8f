//! Vehicle repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::VehicleEntity;
use crate::metrics::QueryTimer;

/// Repository for vehicle database operations.
#[derive(Clone)]
pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    /// Creates a new VehicleRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List every vehicle, ordered by plate number.
    pub async fn list_all(&self) -> Result<Vec<VehicleEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_vehicles");
        let result = sqlx::query_as::<_, VehicleEntity>(
            r#"
            SELECT id, plate_number, brand, model, seat_capacity, current_mileage,
                   image_url, status, created_at
            FROM vehicles
            ORDER BY plate_number
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.finish(result)
    }

    /// Find vehicle by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<VehicleEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_vehicle_by_id");
        let result = sqlx::query_as::<_, VehicleEntity>(
            r#"
            SELECT id, plate_number, brand, model, seat_capacity, current_mileage,
                   image_url, status, created_at
            FROM vehicles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result)
    }

    /// Vehicles free for `[start, end)`, via the `get_available_vehicles`
    /// stored function.
    ///
    /// Callers must have validated `start < end` already.
    pub async fn find_available(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<VehicleEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_available_vehicles");
        let result = sqlx::query_as::<_, VehicleEntity>(
            r#"
            SELECT id, plate_number, brand, model, seat_capacity, current_mileage,
                   image_url, status, created_at
            FROM get_available_vehicles($1, $2)
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await;
        timer.finish(result)
    }
}
