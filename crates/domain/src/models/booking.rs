//! Booking domain model and lifecycle state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use super::availability::{TimeWindow, WindowError};
use super::employee::EmployeeSummary;
use super::trip_log::TripLog;
use super::vehicle::VehicleSummary;

// ============================================================================
// Booking Status Enum
// ============================================================================

/// State of a booking in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
    InUse,
    Completed,
}

impl BookingStatus {
    /// Returns the string representation for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Approved => "approved",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::InUse => "in_use",
            BookingStatus::Completed => "completed",
        }
    }

    /// Statuses that hold the vehicle for the booking's window.
    pub fn holds_vehicle(&self) -> bool {
        matches!(self, BookingStatus::Approved | BookingStatus::InUse)
    }

    /// Terminal statuses accept no further action.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Rejected | BookingStatus::Cancelled | BookingStatus::Completed
        )
    }

    /// Applies an action, returning the resulting status.
    pub fn apply(&self, action: BookingAction) -> Result<BookingStatus, TransitionError> {
        let next = match (self, action) {
            (BookingStatus::Pending, BookingAction::Approve) => BookingStatus::Approved,
            (BookingStatus::Pending, BookingAction::Reject) => BookingStatus::Rejected,
            (BookingStatus::Approved, BookingAction::StartTrip) => BookingStatus::InUse,
            (BookingStatus::InUse, BookingAction::EndTrip) => BookingStatus::Completed,
            (BookingStatus::Pending, BookingAction::Cancel)
            | (BookingStatus::Approved, BookingAction::Cancel) => BookingStatus::Cancelled,
            _ => {
                return Err(TransitionError {
                    from: *self,
                    action,
                })
            }
        };
        Ok(next)
    }

    /// Check if an action is legal from this status.
    pub fn allows(&self, action: BookingAction) -> bool {
        self.apply(action).is_ok()
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "approved" => Ok(BookingStatus::Approved),
            "rejected" => Ok(BookingStatus::Rejected),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "in_use" => Ok(BookingStatus::InUse),
            "completed" => Ok(BookingStatus::Completed),
            _ => Err(format!(
                "Invalid booking status: {}. Must be one of: pending, approved, rejected, cancelled, in_use, completed",
                s
            )),
        }
    }
}

// ============================================================================
// Booking Actions
// ============================================================================

/// An operation that moves a booking through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingAction {
    Approve,
    Reject,
    StartTrip,
    EndTrip,
    Cancel,
}

impl BookingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingAction::Approve => "approve",
            BookingAction::Reject => "reject",
            BookingAction::StartTrip => "start_trip",
            BookingAction::EndTrip => "end_trip",
            BookingAction::Cancel => "cancel",
        }
    }

    /// Review actions belong to reviewers; the rest to the booking owner.
    pub fn is_review(&self) -> bool {
        matches!(self, BookingAction::Approve | BookingAction::Reject)
    }
}

impl fmt::Display for BookingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An action that is not legal from the booking's current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Cannot {action} a booking that is {from}")]
pub struct TransitionError {
    pub from: BookingStatus,
    pub action: BookingAction,
}

// ============================================================================
// Core Model
// ============================================================================

/// A request to use a specific vehicle for a specific time window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub vehicle_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub purpose: String,
    pub destination: String,
    pub status: BookingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approver_comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn window(&self) -> Result<TimeWindow, WindowError> {
        TimeWindow::new(self.start_time, self.end_time)
    }

    pub fn is_owned_by(&self, employee_id: Uuid) -> bool {
        self.employee_id == employee_id
    }
}

// ============================================================================
// Request DTOs
// ============================================================================

/// Request payload for creating a booking.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub vehicle_id: Uuid,

    pub start_time: DateTime<Utc>,

    pub end_time: DateTime<Utc>,

    #[validate(
        length(min = 1, max = 500, message = "purpose must be 1-500 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub purpose: String,

    #[validate(
        length(min = 1, max = 500, message = "destination must be 1-500 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub destination: String,
}

impl CreateBookingRequest {
    pub fn window(&self) -> Result<TimeWindow, WindowError> {
        TimeWindow::new(self.start_time, self.end_time)
    }
}

/// Request payload for approving a booking.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ApproveBookingRequest {
    #[validate(length(max = 1000, message = "comment must be at most 1000 characters"))]
    pub comment: Option<String>,
}

/// Request payload for rejecting a booking.
///
/// `reason: null` (or an absent or blank reason) means the reviewer declined
/// to give one, and the booking must stay untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RejectBookingRequest {
    #[validate(length(max = 1000, message = "reason must be at most 1000 characters"))]
    pub reason: Option<String>,
}

impl RejectBookingRequest {
    /// The trimmed reason, if one was actually supplied.
    pub fn reason(&self) -> Option<&str> {
        self.reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Booking with its related records joined in.
#[derive(Debug, Clone, Serialize)]
pub struct BookingResponse {
    #[serde(flatten)]
    pub booking: Booking,
    pub vehicle: VehicleSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee: Option<EmployeeSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trip_log: Option<TripLog>,
}

/// Response for booking listings.
#[derive(Debug, Clone, Serialize)]
pub struct ListBookingsResponse {
    pub bookings: Vec<BookingResponse>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATUSES: [BookingStatus; 6] = [
        BookingStatus::Pending,
        BookingStatus::Approved,
        BookingStatus::Rejected,
        BookingStatus::Cancelled,
        BookingStatus::InUse,
        BookingStatus::Completed,
    ];

    const ALL_ACTIONS: [BookingAction; 5] = [
        BookingAction::Approve,
        BookingAction::Reject,
        BookingAction::StartTrip,
        BookingAction::EndTrip,
        BookingAction::Cancel,
    ];

    #[test]
    fn test_status_as_str_round_trip() {
        for status in ALL_STATUSES {
            assert_eq!(status.as_str().parse::<BookingStatus>().unwrap(), status);
        }
        assert!("PENDING".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(
            serde_json::to_string(&BookingStatus::InUse).unwrap(),
            "\"in_use\""
        );
        let parsed: BookingStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(parsed, BookingStatus::Completed);
    }

    #[test]
    fn test_documented_transitions() {
        assert_eq!(
            BookingStatus::Pending.apply(BookingAction::Approve),
            Ok(BookingStatus::Approved)
        );
        assert_eq!(
            BookingStatus::Pending.apply(BookingAction::Reject),
            Ok(BookingStatus::Rejected)
        );
        assert_eq!(
            BookingStatus::Approved.apply(BookingAction::StartTrip),
            Ok(BookingStatus::InUse)
        );
        assert_eq!(
            BookingStatus::InUse.apply(BookingAction::EndTrip),
            Ok(BookingStatus::Completed)
        );
        assert_eq!(
            BookingStatus::Pending.apply(BookingAction::Cancel),
            Ok(BookingStatus::Cancelled)
        );
        assert_eq!(
            BookingStatus::Approved.apply(BookingAction::Cancel),
            Ok(BookingStatus::Cancelled)
        );
    }

    #[test]
    fn test_terminal_statuses_accept_nothing() {
        for status in ALL_STATUSES.iter().filter(|s| s.is_terminal()) {
            for action in ALL_ACTIONS {
                assert!(!status.allows(action), "{} should not allow {}", status, action);
            }
        }
    }

    #[test]
    fn test_rejecting_twice_is_refused() {
        let rejected = BookingStatus::Pending.apply(BookingAction::Reject).unwrap();
        let err = rejected.apply(BookingAction::Reject).unwrap_err();
        assert_eq!(err.from, BookingStatus::Rejected);
        assert_eq!(err.to_string(), "Cannot reject a booking that is rejected");
    }

    #[test]
    fn test_in_use_cannot_be_cancelled_or_reviewed() {
        assert!(!BookingStatus::InUse.allows(BookingAction::Cancel));
        assert!(!BookingStatus::InUse.allows(BookingAction::Approve));
        assert!(!BookingStatus::Approved.allows(BookingAction::EndTrip));
        assert!(!BookingStatus::Pending.allows(BookingAction::StartTrip));
    }

    #[test]
    fn test_holds_vehicle() {
        assert!(BookingStatus::Approved.holds_vehicle());
        assert!(BookingStatus::InUse.holds_vehicle());
        assert!(!BookingStatus::Pending.holds_vehicle());
        assert!(!BookingStatus::Completed.holds_vehicle());
    }

    #[test]
    fn test_reject_reason_must_be_supplied() {
        assert_eq!(RejectBookingRequest { reason: None }.reason(), None);
        assert_eq!(
            RejectBookingRequest {
                reason: Some("   ".to_string())
            }
            .reason(),
            None
        );
        assert_eq!(
            RejectBookingRequest {
                reason: Some(" Vehicle reserved for CEO ".to_string())
            }
            .reason(),
            Some("Vehicle reserved for CEO")
        );
    }

    #[test]
    fn test_create_request_blank_purpose_rejected() {
        let now = Utc::now();
        let request = CreateBookingRequest {
            vehicle_id: Uuid::new_v4(),
            start_time: now,
            end_time: now + chrono::Duration::hours(1),
            purpose: "   ".to_string(),
            destination: "Head office".to_string(),
        };
        assert!(request.validate().is_err());
        assert!(request.window().is_ok());
    }

    #[test]
    fn test_create_request_inverted_window() {
        let now = Utc::now();
        let request = CreateBookingRequest {
            vehicle_id: Uuid::new_v4(),
            start_time: now,
            end_time: now - chrono::Duration::minutes(5),
            purpose: "Client visit".to_string(),
            destination: "Bang Na".to_string(),
        };
        assert!(request.validate().is_ok());
        assert_eq!(request.window(), Err(WindowError::EndNotAfterStart));
    }
}
