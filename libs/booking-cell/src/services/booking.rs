// libs/booking-cell/src/services/booking.rs
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use diesel_async::AsyncConnection;
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::postgres::DbPool;
use shared_utils::clock::{Clock, SystemClock};

use crate::models::{
    Appointment, AppointmentStatus, AppointmentTime, BookAppointmentRequest, BookingError,
    NewAppointment, RescheduleAppointmentRequest,
};
use crate::store;

/// Hours before the scheduled start during which an appointment can no
/// longer be rescheduled or cancelled.
const MODIFICATION_WINDOW_HOURS: i64 = 24;

/// Transactional core of the scheduling subsystem. Each operation runs its
/// read-check-write sequence inside a single transaction, taking a row lock
/// on the contended availability slot so concurrent bookings serialize.
pub struct BookingService {
    pool: DbPool,
    clock: Arc<dyn Clock>,
    operation_timeout: Duration,
}

impl BookingService {
    pub fn new(pool: DbPool, config: &AppConfig) -> Self {
        Self::with_clock(pool, config, Arc::new(SystemClock))
    }

    pub fn with_clock(pool: DbPool, config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            pool,
            clock,
            operation_timeout: Duration::from_secs(config.operation_timeout_secs),
        }
    }

    /// Book the one-hour window starting at `request.start_time` with the
    /// requested doctor. Fails with `SlotUnavailable` unless a free
    /// availability slot covers the window.
    pub async fn create_appointment(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, BookingError> {
        info!(
            "Booking appointment for patient {} with doctor {}",
            request.patient_id, request.doctor_id
        );

        let start = parse_start_time(&request.start_time)?;
        let time_slot = AppointmentTime::for_window(start);
        let doctor_id = request.doctor_id;
        let patient_id = request.patient_id;

        let record = tokio::time::timeout(self.operation_timeout, async {
            let mut conn = self
                .pool
                .get()
                .await
                .map_err(|e| BookingError::DatabaseError(e.to_string()))?;

            conn.transaction::<_, BookingError, _>(|conn| {
                Box::pin(async move {
                    let slot = store::availability::find_covering_slot_locked(
                        conn,
                        doctor_id,
                        time_slot.available_date,
                        time_slot.start_time,
                    )
                    .await?
                    .ok_or(BookingError::SlotUnavailable)?;

                    if slot.is_booked {
                        warn!(
                            "Slot {} already booked for doctor {} at {}",
                            slot.id, doctor_id, time_slot.start_time
                        );
                        return Err(BookingError::SlotUnavailable);
                    }

                    let new_appointment = NewAppointment {
                        doctor_id,
                        patient_id,
                        slot_id: slot.id,
                        appointment_time: serde_json::to_value(&time_slot)
                            .map_err(|e| BookingError::DatabaseError(e.to_string()))?,
                        status: AppointmentStatus::Scheduled.to_string(),
                    };

                    let record = store::appointment::insert(conn, &new_appointment).await?;
                    store::availability::set_booked(conn, slot.id, true).await?;

                    Ok(record)
                })
            })
            .await
        })
        .await
        .map_err(|_| BookingError::DatabaseError("booking operation timed out".to_string()))??;

        info!(
            "Appointment {} booked for doctor {}",
            record.id, record.doctor_id
        );
        record.try_into()
    }

    /// Move an appointment to a new one-hour window. The old slot is freed
    /// and the new one reserved inside the same transaction; if the new
    /// window has no free slot the whole operation rolls back.
    pub async fn update_appointment(
        &self,
        appointment_id: i64,
        request: RescheduleAppointmentRequest,
    ) -> Result<Appointment, BookingError> {
        debug!("Rescheduling appointment {}", appointment_id);

        let new_start = parse_start_time(&request.new_start_time)?;
        let now = self.clock.now();
        ensure_outside_modification_window(now, new_start)?;

        let new_window = AppointmentTime::for_window(new_start);

        let record = tokio::time::timeout(self.operation_timeout, async {
            let mut conn = self
                .pool
                .get()
                .await
                .map_err(|e| BookingError::DatabaseError(e.to_string()))?;

            conn.transaction::<_, BookingError, _>(|conn| {
                Box::pin(async move {
                    let current = store::appointment::find_by_id_locked(conn, appointment_id)
                        .await?
                        .ok_or(BookingError::NotFound)?;

                    // Free the currently reserved slot before claiming the
                    // new one; both writes commit or neither does.
                    store::availability::set_booked(conn, current.slot_id, false).await?;

                    let new_slot = store::availability::find_covering_slot_locked(
                        conn,
                        current.doctor_id,
                        new_window.available_date,
                        new_window.start_time,
                    )
                    .await?
                    .ok_or(BookingError::SlotUnavailable)?;

                    if new_slot.is_booked {
                        warn!(
                            "Reschedule target slot {} already booked for doctor {}",
                            new_slot.id, current.doctor_id
                        );
                        return Err(BookingError::SlotUnavailable);
                    }

                    store::availability::set_booked(conn, new_slot.id, true).await?;

                    let payload = serde_json::to_value(&new_window)
                        .map_err(|e| BookingError::DatabaseError(e.to_string()))?;
                    store::appointment::update_schedule(
                        conn,
                        appointment_id,
                        new_slot.id,
                        payload,
                        now,
                    )
                    .await?;

                    store::appointment::find_by_id(conn, appointment_id)
                        .await?
                        .ok_or(BookingError::NotFound)
                })
            })
            .await
        })
        .await
        .map_err(|_| BookingError::DatabaseError("booking operation timed out".to_string()))??;

        info!("Appointment {} rescheduled", appointment_id);
        record.try_into()
    }

    /// Cancel an appointment, deleting its row and releasing its slot.
    pub async fn cancel_appointment(&self, appointment_id: i64) -> Result<(), BookingError> {
        debug!("Cancelling appointment {}", appointment_id);

        let now = self.clock.now();

        tokio::time::timeout(self.operation_timeout, async {
            let mut conn = self
                .pool
                .get()
                .await
                .map_err(|e| BookingError::DatabaseError(e.to_string()))?;

            conn.transaction::<_, BookingError, _>(|conn| {
                Box::pin(async move {
                    let current = store::appointment::find_by_id_locked(conn, appointment_id)
                        .await?
                        .ok_or(BookingError::NotFound)?;

                    let time_slot: AppointmentTime =
                        serde_json::from_value(current.appointment_time.clone()).map_err(|e| {
                            BookingError::DatabaseError(format!(
                                "malformed appointment_time payload: {}",
                                e
                            ))
                        })?;

                    ensure_outside_modification_window(now, time_slot.starts_at())?;

                    store::appointment::delete(conn, appointment_id).await?;
                    store::availability::set_booked(conn, current.slot_id, false).await?;

                    Ok(())
                })
            })
            .await
        })
        .await
        .map_err(|_| BookingError::DatabaseError("booking operation timed out".to_string()))??;

        info!("Appointment {} cancelled", appointment_id);
        Ok(())
    }
}

/// Parse the fixed wire format used for appointment start times.
fn parse_start_time(raw: &str) -> Result<DateTime<Utc>, BookingError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|e| BookingError::InvalidTime(format!("invalid start time '{}': {}", raw, e)))
}

/// An appointment may only be rescheduled or cancelled while its scheduled
/// start is more than 24 hours away.
fn ensure_outside_modification_window(
    now: DateTime<Utc>,
    scheduled_start: DateTime<Utc>,
) -> Result<(), BookingError> {
    if scheduled_start - now <= chrono::Duration::hours(MODIFICATION_WINDOW_HOURS) {
        return Err(BookingError::TooLateToModify);
    }
    Ok(())
}
