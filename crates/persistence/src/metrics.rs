//! Repository metrics.
//!
//! Every repository call is timed under its operation name and labelled with
//! how it ended. Lifecycle transitions additionally count their outcome so a
//! burst of conflicts or refusals shows up without reading logs.

use metrics::{counter, gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Coarse class of a database failure, used as a metric label.
pub fn error_kind(err: &sqlx::Error) -> &'static str {
    match err {
        sqlx::Error::RowNotFound => "row_not_found",
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => "pool",
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) => "connection",
        sqlx::Error::Database(db) if db.is_unique_violation() => "unique_violation",
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => "foreign_key_violation",
        sqlx::Error::Database(_) => "database",
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => "decode",
        _ => "other",
    }
}

/// Counts a booking or trip transition by how it was resolved.
pub fn record_transition(operation: &'static str, outcome: &'static str) {
    counter!(
        "booking_transitions_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

/// Record database connection pool gauges.
///
/// Called on every scrape of the metrics endpoint.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size();
    let idle = pool.num_idle() as u32;

    gauge!("database_connections_active").set(size.saturating_sub(idle) as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_max").set(pool.options().get_max_connections() as f64);
}

/// Times one repository operation.
///
/// ```ignore
/// let timer = QueryTimer::new("find_booking_by_id");
/// let result = sqlx::query_as::<_, BookingEntity>(...).fetch_optional(&pool).await;
/// timer.finish(result)
/// ```
pub struct QueryTimer {
    operation: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Records the elapsed time and, on failure, the error class, then hands
    /// the result back.
    pub fn finish<T>(self, result: Result<T, sqlx::Error>) -> Result<T, sqlx::Error> {
        let status = match &result {
            Ok(_) => "ok",
            Err(err) => {
                counter!(
                    "database_query_errors_total",
                    "operation" => self.operation,
                    "kind" => error_kind(err)
                )
                .increment(1);
                "error"
            }
        };

        histogram!(
            "database_query_duration_seconds",
            "operation" => self.operation,
            "status" => status
        )
        .record(self.start.elapsed().as_secs_f64());

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_classes() {
        assert_eq!(error_kind(&sqlx::Error::RowNotFound), "row_not_found");
        assert_eq!(error_kind(&sqlx::Error::PoolTimedOut), "pool");
        assert_eq!(error_kind(&sqlx::Error::PoolClosed), "pool");
        assert_eq!(
            error_kind(&sqlx::Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "reset"
            ))),
            "connection"
        );
        assert_eq!(
            error_kind(&sqlx::Error::Protocol("unexpected message".into())),
            "other"
        );
    }

    #[test]
    fn test_finish_passes_result_through() {
        let ok = QueryTimer::new("list_pending_bookings").finish(Ok::<_, sqlx::Error>(3));
        assert_eq!(ok.unwrap(), 3);

        let err = QueryTimer::new("find_vehicle_by_id")
            .finish(Err::<(), _>(sqlx::Error::RowNotFound));
        assert!(matches!(err, Err(sqlx::Error::RowNotFound)));
    }

    #[test]
    fn test_timer_keeps_operation() {
        let timer = QueryTimer::new("approve_booking");
        assert_eq!(timer.operation(), "approve_booking");
    }
}
