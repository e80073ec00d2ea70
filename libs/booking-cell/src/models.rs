// libs/booking-cell/src/models.rs
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ==============================================================================
// CORE BOOKING MODELS
// ==============================================================================

/// Typed form of the `appointment_time` document stored on every appointment.
/// The document shape (`available_date`, `start_time`, `end_time`, `is_booked`)
/// is fixed; anything that does not decode into this struct is rejected at the
/// store boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentTime {
    pub available_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_booked: bool,
}

impl AppointmentTime {
    /// Build the fixed one-hour booking window starting at `start`.
    pub fn for_window(start: DateTime<Utc>) -> Self {
        let end = start + Duration::hours(1);
        Self {
            available_date: start.date_naive(),
            start_time: start.time(),
            end_time: end.time(),
            is_booked: true,
        }
    }

    /// The UTC instant the appointment begins.
    pub fn starts_at(&self) -> DateTime<Utc> {
        self.available_date.and_time(self.start_time).and_utc()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
        }
    }
}

impl std::str::FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            other => Err(format!("unknown appointment status: {}", other)),
        }
    }
}

/// Booked appointment as the rest of the system sees it, with the time
/// payload already decoded and validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub slot_id: i64,
    pub appointment_time: AppointmentTime,
    pub status: AppointmentStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Appointment {
    pub fn scheduled_start_time(&self) -> DateTime<Utc> {
        self.appointment_time.starts_at()
    }
}

impl TryFrom<AppointmentRecord> for Appointment {
    type Error = BookingError;

    fn try_from(record: AppointmentRecord) -> Result<Self, Self::Error> {
        let appointment_time: AppointmentTime = serde_json::from_value(record.appointment_time)
            .map_err(|e| {
                BookingError::DatabaseError(format!("malformed appointment_time payload: {}", e))
            })?;
        let status = record.status.parse().map_err(BookingError::DatabaseError)?;

        Ok(Self {
            id: record.id,
            doctor_id: record.doctor_id,
            patient_id: record.patient_id,
            slot_id: record.slot_id,
            appointment_time,
            status,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

// ==============================================================================
// DATABASE ROW MODELS
// ==============================================================================

#[derive(Debug, Clone, Queryable)]
pub struct AppointmentRecord {
    pub id: i64,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub slot_id: i64,
    pub appointment_time: serde_json::Value,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::appointments)]
pub struct NewAppointment {
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub slot_id: i64,
    pub appointment_time: serde_json::Value,
    pub status: String,
}

/// Bookable time window for one doctor on one date. Seeded by the doctor
/// scheduling process; this subsystem only toggles `is_booked`.
#[derive(Debug, Clone, Queryable, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    pub id: i64,
    pub doctor_id: Uuid,
    pub available_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_booked: bool,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::doctor_availability)]
pub struct NewAvailabilitySlot {
    pub doctor_id: Uuid,
    pub available_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_booked: bool,
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    /// Appointment start in the fixed wire format, e.g. `2025-06-01T09:00:00Z`.
    pub start_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub new_start_time: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListAppointments {
    pub appointments: Vec<Appointment>,
    pub total_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListAvailabilities {
    pub availabilities: Vec<AvailabilitySlot>,
    pub total_count: i64,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum BookingError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Appointment slot not available")]
    SlotUnavailable,

    #[error("Appointment cannot be modified within 24 hours of the scheduled time")]
    TooLateToModify,

    #[error("Invalid appointment time: {0}")]
    InvalidTime(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<diesel::result::Error> for BookingError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => BookingError::NotFound,
            other => BookingError::DatabaseError(other.to_string()),
        }
    }
}
