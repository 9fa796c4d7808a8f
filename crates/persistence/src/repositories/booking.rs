//! Booking repository for database operations.
//!
//! Every lifecycle write locks the booking row first and re-checks the
//! transition against the locked state.

use chrono::{DateTime, Utc};
use domain::models::{BookingAction, TimeWindow};
use domain::services::{plan, Actor, LifecycleError};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{BookingEntity, BookingWithDetailsEntity};
use crate::metrics::{record_transition, QueryTimer};

pub(crate) const BOOKING_COLUMNS: &str = "id, employee_id, vehicle_id, start_time, end_time, \
     purpose, destination, status, approver_comment, reviewed_by, reviewed_at, \
     created_at, updated_at";

const BOOKING_WITH_DETAILS_SELECT: &str = r#"
    SELECT b.id, b.employee_id, b.vehicle_id, b.start_time, b.end_time,
           b.purpose, b.destination, b.status, b.approver_comment,
           b.reviewed_by, b.reviewed_at, b.created_at, b.updated_at,
           v.plate_number AS vehicle_plate_number,
           v.brand AS vehicle_brand,
           v.model AS vehicle_model,
           e.employee_code AS employee_code,
           e.full_name AS employee_full_name,
           e.department AS employee_department
    FROM bookings b
    JOIN vehicles v ON v.id = b.vehicle_id
    JOIN employees e ON e.id = b.employee_id
"#;

/// Input data for inserting a booking.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub employee_id: Uuid,
    pub vehicle_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub purpose: String,
    pub destination: String,
}

/// Result of a lifecycle write.
#[derive(Debug)]
pub enum TransitionOutcome<T> {
    /// The transition was written.
    Applied(T),
    /// No booking with that ID.
    NotFound,
    /// The actor may not act, or the booking's status does not allow it.
    Refused(LifecycleError),
    /// Another approved or in-use booking holds the vehicle in that window.
    VehicleConflict { booking_id: Uuid },
    /// The vehicle itself cannot be taken right now (on a trip or in maintenance).
    VehicleBusy { vehicle_id: Uuid, status: String },
}

impl<T> TransitionOutcome<T> {
    /// Metric label for how the write was resolved.
    pub fn label(&self) -> &'static str {
        match self {
            TransitionOutcome::Applied(_) => "applied",
            TransitionOutcome::NotFound => "not_found",
            TransitionOutcome::Refused(_) => "refused",
            TransitionOutcome::VehicleConflict { .. } => "vehicle_conflict",
            TransitionOutcome::VehicleBusy { .. } => "vehicle_busy",
        }
    }
}

/// Times a lifecycle write and counts its outcome.
pub(crate) fn finish_transition<T>(
    timer: QueryTimer,
    result: Result<TransitionOutcome<T>, sqlx::Error>,
) -> Result<TransitionOutcome<T>, sqlx::Error> {
    let operation = timer.operation();
    let result = timer.finish(result);
    if let Ok(outcome) = &result {
        record_transition(operation, outcome.label());
    }
    result
}

/// Locks a vehicle row inside a transaction and returns its status.
pub(crate) async fn lock_vehicle_status(
    conn: &mut PgConnection,
    vehicle_id: Uuid,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT status FROM vehicles WHERE id = $1 FOR UPDATE")
        .bind(vehicle_id)
        .fetch_optional(conn)
        .await
}

/// Locks and loads a booking inside a transaction.
pub(crate) async fn lock_booking(
    conn: &mut PgConnection,
    booking_id: Uuid,
) -> Result<Option<BookingEntity>, sqlx::Error> {
    sqlx::query_as::<_, BookingEntity>(&format!(
        "SELECT {} FROM bookings WHERE id = $1 FOR UPDATE",
        BOOKING_COLUMNS
    ))
    .bind(booking_id)
    .fetch_optional(conn)
    .await
}

/// Moves a booking to `status`, returning the updated row.
pub(crate) async fn set_status(
    conn: &mut PgConnection,
    booking_id: Uuid,
    status: &str,
) -> Result<BookingEntity, sqlx::Error> {
    sqlx::query_as::<_, BookingEntity>(&format!(
        "UPDATE bookings SET status = $2 WHERE id = $1 RETURNING {}",
        BOOKING_COLUMNS
    ))
    .bind(booking_id)
    .bind(status)
    .fetch_one(conn)
    .await
}

/// Repository for booking database operations.
#[derive(Clone)]
pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    /// Creates a new BookingRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new pending booking.
    pub async fn create(&self, input: NewBooking) -> Result<BookingEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_booking");
        let result = sqlx::query_as::<_, BookingEntity>(&format!(
            r#"
            INSERT INTO bookings (employee_id, vehicle_id, start_time, end_time, purpose, destination, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'pending')
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(input.employee_id)
        .bind(input.vehicle_id)
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(&input.purpose)
        .bind(&input.destination)
        .fetch_one(&self.pool)
        .await;
        timer.finish(result)
    }

    /// Find booking by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<BookingEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_booking_by_id");
        let result = sqlx::query_as::<_, BookingEntity>(&format!(
            "SELECT {} FROM bookings WHERE id = $1",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result)
    }

    /// Find booking by ID with vehicle and employee joined.
    pub async fn find_with_details(
        &self,
        id: Uuid,
    ) -> Result<Option<BookingWithDetailsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_booking_with_details");
        let result = sqlx::query_as::<_, BookingWithDetailsEntity>(&format!(
            "{} WHERE b.id = $1",
            BOOKING_WITH_DETAILS_SELECT
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result)
    }

    /// An employee's bookings, newest first.
    pub async fn list_for_employee(
        &self,
        employee_id: Uuid,
    ) -> Result<Vec<BookingWithDetailsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_bookings_for_employee");
        let result = sqlx::query_as::<_, BookingWithDetailsEntity>(&format!(
            "{} WHERE b.employee_id = $1 ORDER BY b.created_at DESC, b.id",
            BOOKING_WITH_DETAILS_SELECT
        ))
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await;
        timer.finish(result)
    }

    /// Bookings awaiting review, oldest first.
    pub async fn list_pending(&self) -> Result<Vec<BookingWithDetailsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_pending_bookings");
        let result = sqlx::query_as::<_, BookingWithDetailsEntity>(&format!(
            "{} WHERE b.status = 'pending' ORDER BY b.created_at ASC, b.id",
            BOOKING_WITH_DETAILS_SELECT
        ))
        .fetch_all(&self.pool)
        .await;
        timer.finish(result)
    }

    /// Approve a pending booking.
    ///
    /// The vehicle row is locked for the duration of the check so two
    /// overlapping approvals on the same vehicle serialize.
    pub async fn approve(
        &self,
        booking_id: Uuid,
        actor: &Actor,
        comment: Option<&str>,
    ) -> Result<TransitionOutcome<BookingEntity>, sqlx::Error> {
        let timer = QueryTimer::new("approve_booking");
        let result = self.approve_in_tx(booking_id, actor, comment).await;
        finish_transition(timer, result)
    }

    async fn approve_in_tx(
        &self,
        booking_id: Uuid,
        actor: &Actor,
        comment: Option<&str>,
    ) -> Result<TransitionOutcome<BookingEntity>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let Some(entity) = lock_booking(&mut *tx, booking_id).await? else {
            return Ok(TransitionOutcome::NotFound);
        };
        let booking = entity.into_domain();
        let next = match plan(BookingAction::Approve, actor, &booking) {
            Ok(next) => next,
            Err(e) => return Ok(TransitionOutcome::Refused(e)),
        };

        let vehicle_status = lock_vehicle_status(&mut *tx, booking.vehicle_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        if vehicle_status == "maintenance" {
            return Ok(TransitionOutcome::VehicleBusy {
                vehicle_id: booking.vehicle_id,
                status: vehicle_status,
            });
        }

        let window = booking
            .window()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        let holders = sqlx::query_as::<_, (Uuid, DateTime<Utc>, DateTime<Utc>)>(
            r#"
            SELECT id, start_time, end_time
            FROM bookings
            WHERE vehicle_id = $1
              AND id <> $2
              AND status IN ('approved', 'in_use')
            "#,
        )
        .bind(booking.vehicle_id)
        .bind(booking.id)
        .fetch_all(&mut *tx)
        .await?;

        let conflict = holders.into_iter().find(|(_, start, end)| {
            TimeWindow::new(*start, *end)
                .map(|held| held.overlaps(&window))
                .unwrap_or(false)
        });
        if let Some((conflicting_id, _, _)) = conflict {
            return Ok(TransitionOutcome::VehicleConflict {
                booking_id: conflicting_id,
            });
        }

        let updated = sqlx::query_as::<_, BookingEntity>(&format!(
            r#"
            UPDATE bookings
            SET status = $2, approver_comment = $3, reviewed_by = $4, reviewed_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(booking.id)
        .bind(next.as_str())
        .bind(comment)
        .bind(actor.employee_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(TransitionOutcome::Applied(updated))
    }

    /// Reject a pending booking, recording the reason as the reviewer comment.
    pub async fn reject(
        &self,
        booking_id: Uuid,
        actor: &Actor,
        reason: &str,
    ) -> Result<TransitionOutcome<BookingEntity>, sqlx::Error> {
        let timer = QueryTimer::new("reject_booking");
        let result = self.reject_in_tx(booking_id, actor, reason).await;
        finish_transition(timer, result)
    }

    async fn reject_in_tx(
        &self,
        booking_id: Uuid,
        actor: &Actor,
        reason: &str,
    ) -> Result<TransitionOutcome<BookingEntity>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let Some(entity) = lock_booking(&mut *tx, booking_id).await? else {
            return Ok(TransitionOutcome::NotFound);
        };
        let next = match plan(BookingAction::Reject, actor, &entity.into_domain()) {
            Ok(next) => next,
            Err(e) => return Ok(TransitionOutcome::Refused(e)),
        };

        let updated = sqlx::query_as::<_, BookingEntity>(&format!(
            r#"
            UPDATE bookings
            SET status = $2, approver_comment = $3, reviewed_by = $4, reviewed_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(booking_id)
        .bind(next.as_str())
        .bind(reason)
        .bind(actor.employee_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(TransitionOutcome::Applied(updated))
    }

    /// Cancel a pending or approved booking on behalf of its owner.
    pub async fn cancel(
        &self,
        booking_id: Uuid,
        actor: &Actor,
    ) -> Result<TransitionOutcome<BookingEntity>, sqlx::Error> {
        let timer = QueryTimer::new("cancel_booking");
        let result = self.cancel_in_tx(booking_id, actor).await;
        finish_transition(timer, result)
    }

    async fn cancel_in_tx(
        &self,
        booking_id: Uuid,
        actor: &Actor,
    ) -> Result<TransitionOutcome<BookingEntity>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let Some(entity) = lock_booking(&mut *tx, booking_id).await? else {
            return Ok(TransitionOutcome::NotFound);
        };
        let next = match plan(BookingAction::Cancel, actor, &entity.into_domain()) {
            Ok(next) => next,
            Err(e) => return Ok(TransitionOutcome::Refused(e)),
        };

        let updated = set_status(&mut *tx, booking_id, next.as_str()).await?;

        tx.commit().await?;
        Ok(TransitionOutcome::Applied(updated))
    }
}
