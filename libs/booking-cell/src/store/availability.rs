// libs/booking-cell/src/store/availability.rs
use chrono::{NaiveDate, NaiveTime};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::models::{AvailabilitySlot, NewAvailabilitySlot};
use crate::schema::doctor_availability;

pub async fn insert(
    conn: &mut AsyncPgConnection,
    new_slot: &NewAvailabilitySlot,
) -> QueryResult<AvailabilitySlot> {
    diesel::insert_into(doctor_availability::table)
        .values(new_slot)
        .get_result(conn)
        .await
}

pub async fn find_by_id(
    conn: &mut AsyncPgConnection,
    slot_id: i64,
) -> QueryResult<Option<AvailabilitySlot>> {
    doctor_availability::table
        .filter(doctor_availability::id.eq(slot_id))
        .first(conn)
        .await
        .optional()
}

/// Find the slot whose `[start_time, end_time)` window covers `start` for the
/// doctor on `date`, locking the row for the rest of the transaction. The
/// lock is what serializes concurrent bookings of the same slot.
pub async fn find_covering_slot_locked(
    conn: &mut AsyncPgConnection,
    doctor_id: Uuid,
    date: NaiveDate,
    start: NaiveTime,
) -> QueryResult<Option<AvailabilitySlot>> {
    doctor_availability::table
        .filter(doctor_availability::doctor_id.eq(doctor_id))
        .filter(doctor_availability::available_date.eq(date))
        .filter(doctor_availability::start_time.le(start))
        .filter(doctor_availability::end_time.gt(start))
        .for_update()
        .first(conn)
        .await
        .optional()
}

pub async fn set_booked(
    conn: &mut AsyncPgConnection,
    slot_id: i64,
    booked: bool,
) -> QueryResult<usize> {
    diesel::update(doctor_availability::table.filter(doctor_availability::id.eq(slot_id)))
        .set(doctor_availability::is_booked.eq(booked))
        .execute(conn)
        .await
}

pub async fn list(
    conn: &mut AsyncPgConnection,
    offset: i64,
    limit: i64,
) -> QueryResult<Vec<AvailabilitySlot>> {
    doctor_availability::table
        .order(doctor_availability::id.asc())
        .offset(offset)
        .limit(limit)
        .load(conn)
        .await
}

pub async fn count_all(conn: &mut AsyncPgConnection) -> QueryResult<i64> {
    doctor_availability::table.count().get_result(conn).await
}
