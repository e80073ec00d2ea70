// libs/booking-cell/src/store/appointment.rs
//
// Persistence adapter for the appointments table. No business logic lives
// here; callers decide whether a connection is inside a transaction.
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::models::{AppointmentRecord, NewAppointment};
use crate::schema::appointments;

pub async fn insert(
    conn: &mut AsyncPgConnection,
    new_appointment: &NewAppointment,
) -> QueryResult<AppointmentRecord> {
    diesel::insert_into(appointments::table)
        .values(new_appointment)
        .get_result(conn)
        .await
}

pub async fn find_by_id(
    conn: &mut AsyncPgConnection,
    appointment_id: i64,
) -> QueryResult<Option<AppointmentRecord>> {
    appointments::table
        .filter(appointments::id.eq(appointment_id))
        .first(conn)
        .await
        .optional()
}

/// Point lookup holding a row lock for the rest of the transaction.
pub async fn find_by_id_locked(
    conn: &mut AsyncPgConnection,
    appointment_id: i64,
) -> QueryResult<Option<AppointmentRecord>> {
    appointments::table
        .filter(appointments::id.eq(appointment_id))
        .for_update()
        .first(conn)
        .await
        .optional()
}

/// Rewrite the stored time payload and slot linkage after a reschedule.
pub async fn update_schedule(
    conn: &mut AsyncPgConnection,
    appointment_id: i64,
    slot_id: i64,
    appointment_time: serde_json::Value,
    updated_at: DateTime<Utc>,
) -> QueryResult<usize> {
    diesel::update(appointments::table.filter(appointments::id.eq(appointment_id)))
        .set((
            appointments::slot_id.eq(slot_id),
            appointments::appointment_time.eq(appointment_time),
            appointments::updated_at.eq(updated_at),
        ))
        .execute(conn)
        .await
}

pub async fn delete(conn: &mut AsyncPgConnection, appointment_id: i64) -> QueryResult<usize> {
    diesel::delete(appointments::table.filter(appointments::id.eq(appointment_id)))
        .execute(conn)
        .await
}

pub async fn list(
    conn: &mut AsyncPgConnection,
    offset: i64,
    limit: i64,
) -> QueryResult<Vec<AppointmentRecord>> {
    appointments::table
        .order(appointments::id.asc())
        .offset(offset)
        .limit(limit)
        .load(conn)
        .await
}

pub async fn count_all(conn: &mut AsyncPgConnection) -> QueryResult<i64> {
    appointments::table.count().get_result(conn).await
}
