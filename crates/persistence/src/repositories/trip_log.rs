//! Trip log repository for database operations.

use domain::models::{TripPhase, TripReading};
use domain::services::{plan, Actor};
use sqlx::PgPool;
use uuid::Uuid;

use super::booking::{
    finish_transition, lock_booking, lock_vehicle_status, set_status, TransitionOutcome,
};
use crate::entities::TripLogEntity;
use crate::metrics::QueryTimer;

const TRIP_LOG_COLUMNS: &str = "booking_id, start_mileage, start_fuel_level, start_image_url, \
     start_time, end_mileage, end_fuel_level, end_image_url, end_time";

/// Repository for trip log database operations.
#[derive(Clone)]
pub struct TripLogRepository {
    pool: PgPool,
}

impl TripLogRepository {
    /// Creates a new TripLogRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the trip log of a booking.
    pub async fn find_by_booking(
        &self,
        booking_id: Uuid,
    ) -> Result<Option<TripLogEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_trip_log_by_booking");
        let result = sqlx::query_as::<_, TripLogEntity>(&format!(
            "SELECT {} FROM trip_logs WHERE booking_id = $1",
            TRIP_LOG_COLUMNS
        ))
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result)
    }

    /// Record one phase of a trip.
    ///
    /// In a single transaction: lock the booking, re-check the transition,
    /// lock the vehicle (on `Start` it must be `available`), write the trip
    /// log, move the booking and move the vehicle. On `End` the vehicle
    /// odometer takes the end reading. Nothing is written unless every step
    /// succeeds.
    pub async fn record(
        &self,
        booking_id: Uuid,
        actor: &Actor,
        phase: TripPhase,
        reading: &TripReading,
    ) -> Result<TransitionOutcome<TripLogEntity>, sqlx::Error> {
        let timer = QueryTimer::new(match phase {
            TripPhase::Start => "record_trip_start",
            TripPhase::End => "record_trip_end",
        });
        let result = self.record_in_tx(booking_id, actor, phase, reading).await;
        finish_transition(timer, result)
    }

    async fn record_in_tx(
        &self,
        booking_id: Uuid,
        actor: &Actor,
        phase: TripPhase,
        reading: &TripReading,
    ) -> Result<TransitionOutcome<TripLogEntity>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let Some(entity) = lock_booking(&mut *tx, booking_id).await? else {
            return Ok(TransitionOutcome::NotFound);
        };
        let booking = entity.into_domain();
        let next = match plan(phase.action(), actor, &booking) {
            Ok(next) => next,
            Err(e) => return Ok(TransitionOutcome::Refused(e)),
        };

        // Only an idle vehicle can go out; the booking that took it brings it back
        if phase == TripPhase::Start {
            let vehicle_status = lock_vehicle_status(&mut *tx, booking.vehicle_id)
                .await?
                .ok_or(sqlx::Error::RowNotFound)?;
            if vehicle_status != "available" {
                return Ok(TransitionOutcome::VehicleBusy {
                    vehicle_id: booking.vehicle_id,
                    status: vehicle_status,
                });
            }
        }

        let trip_log = match phase {
            TripPhase::Start => {
                sqlx::query_as::<_, TripLogEntity>(&format!(
                    r#"
                    INSERT INTO trip_logs (booking_id, start_mileage, start_fuel_level, start_image_url, start_time)
                    VALUES ($1, $2, $3, $4, NOW())
                    RETURNING {}
                    "#,
                    TRIP_LOG_COLUMNS
                ))
                .bind(booking.id)
                .bind(reading.mileage)
                .bind(reading.fuel_level)
                .bind(reading.photo_url.as_deref())
                .fetch_one(&mut *tx)
                .await?
            }
            TripPhase::End => {
                sqlx::query_as::<_, TripLogEntity>(&format!(
                    r#"
                    UPDATE trip_logs
                    SET end_mileage = $2, end_fuel_level = $3, end_image_url = $4, end_time = NOW()
                    WHERE booking_id = $1 AND end_time IS NULL
                    RETURNING {}
                    "#,
                    TRIP_LOG_COLUMNS
                ))
                .bind(booking.id)
                .bind(reading.mileage)
                .bind(reading.fuel_level)
                .bind(reading.photo_url.as_deref())
                .fetch_one(&mut *tx)
                .await?
            }
        };

        set_status(&mut *tx, booking.id, next.as_str()).await?;

        match phase {
            TripPhase::Start => {
                sqlx::query("UPDATE vehicles SET status = 'in_use' WHERE id = $1")
                    .bind(booking.vehicle_id)
                    .execute(&mut *tx)
                    .await?;
            }
            TripPhase::End => {
                sqlx::query(
                    "UPDATE vehicles SET status = 'available', current_mileage = $2 WHERE id = $1",
                )
                .bind(booking.vehicle_id)
                .bind(reading.mileage)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(TransitionOutcome::Applied(trip_log))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_match_entity_fields() {
        for column in [
            "booking_id",
            "start_mileage",
            "start_fuel_level",
            "start_image_url",
            "start_time",
            "end_mileage",
            "end_fuel_level",
            "end_image_url",
            "end_time",
        ] {
            assert!(TRIP_LOG_COLUMNS.contains(column), "missing {}", column);
        }
    }
}
