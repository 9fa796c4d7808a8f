//! Trip log domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

use super::booking::BookingAction;

// ============================================================================
// Trip Phase Enum
// ============================================================================

/// Which end of a trip a reading belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripPhase {
    Start,
    End,
}

impl TripPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripPhase::Start => "start",
            TripPhase::End => "end",
        }
    }

    /// The lifecycle action recording this phase performs.
    pub fn action(&self) -> BookingAction {
        match self {
            TripPhase::Start => BookingAction::StartTrip,
            TripPhase::End => BookingAction::EndTrip,
        }
    }
}

impl fmt::Display for TripPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Core Model
// ============================================================================

/// A validated odometer/fuel reading, with the photo already stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripReading {
    pub mileage: i32,
    pub fuel_level: i32,
    pub photo_url: Option<String>,
}

/// The odometer, fuel and photo record attached to a booking's trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripLog {
    pub booking_id: Uuid,
    pub start_mileage: i32,
    pub start_fuel_level: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_image_url: Option<String>,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_mileage: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_fuel_level: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl TripLog {
    /// A trip is open until its end reading is recorded.
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// Distance driven, once the trip is closed.
    pub fn distance(&self) -> Option<i32> {
        self.end_mileage.map(|end| end - self.start_mileage)
    }
}

// ============================================================================
// Request DTOs
// ============================================================================

/// A photo attached to a trip reading, sent inline as base64.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PhotoUpload {
    #[validate(length(min = 1, max = 255, message = "file_name must be 1-255 characters"))]
    pub file_name: String,

    #[validate(length(min = 1, message = "content_base64 is required"))]
    pub content_base64: String,
}

impl PhotoUpload {
    /// File extension taken from the supplied name, defaulting to `jpg`.
    pub fn extension(&self) -> String {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.trim().to_ascii_lowercase())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or_else(|| "jpg".to_string())
    }
}

/// Request payload for recording the start or end of a trip.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecordTripRequest {
    #[validate(custom(function = "shared::validation::validate_mileage"))]
    pub mileage: i32,

    #[validate(custom(function = "shared::validation::validate_fuel_level"))]
    pub fuel_level: i32,

    #[validate(nested)]
    pub photo: Option<PhotoUpload>,
}

impl RecordTripRequest {
    /// Turns the request into a reading once the photo (if any) is stored.
    pub fn into_reading(self, photo_url: Option<String>) -> TripReading {
        TripReading {
            mileage: self.mileage,
            fuel_level: self.fuel_level,
            photo_url,
        }
    }
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Response for the trip endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct TripLogResponse {
    #[serde(flatten)]
    pub trip_log: TripLog,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<i32>,
}

impl From<TripLog> for TripLogResponse {
    fn from(trip_log: TripLog) -> Self {
        Self {
            distance: trip_log.distance(),
            trip_log,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
