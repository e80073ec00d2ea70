// libs/booking-cell/src/services/query.rs
use tracing::debug;

use shared_database::postgres::DbPool;

use crate::models::{
    Appointment, AvailabilitySlot, BookingError, ListAppointments, ListAvailabilities,
};
use crate::store;

/// Read side of the scheduling subsystem: point lookups and paginated
/// listings. Runs outside any transaction, so pages and totals are
/// point-in-time reads that may lag concurrent bookings.
pub struct QueryService {
    pool: DbPool,
}

impl QueryService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn get_appointment(&self, appointment_id: i64) -> Result<Appointment, BookingError> {
        debug!("Fetching appointment {}", appointment_id);

        let mut conn = self.connection().await?;
        let record = store::appointment::find_by_id(&mut conn, appointment_id)
            .await?
            .ok_or(BookingError::NotFound)?;

        record.try_into()
    }

    pub async fn list_appointments(
        &self,
        page: i64,
        limit: i64,
    ) -> Result<ListAppointments, BookingError> {
        debug!("Listing appointments page {} limit {}", page, limit);

        let (offset, limit) = page_offset(page, limit)?;
        let mut conn = self.connection().await?;

        let total_count = store::appointment::count_all(&mut conn).await?;
        let records = store::appointment::list(&mut conn, offset, limit).await?;
        let appointments = records
            .into_iter()
            .map(Appointment::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ListAppointments {
            appointments,
            total_count,
        })
    }

    pub async fn get_availability(
        &self,
        availability_id: i64,
    ) -> Result<AvailabilitySlot, BookingError> {
        debug!("Fetching availability slot {}", availability_id);

        let mut conn = self.connection().await?;
        store::availability::find_by_id(&mut conn, availability_id)
            .await?
            .ok_or(BookingError::NotFound)
    }

    pub async fn list_availabilities(
        &self,
        page: i64,
        limit: i64,
    ) -> Result<ListAvailabilities, BookingError> {
        debug!("Listing availabilities page {} limit {}", page, limit);

        let (offset, limit) = page_offset(page, limit)?;
        let mut conn = self.connection().await?;

        let total_count = store::availability::count_all(&mut conn).await?;
        let availabilities = store::availability::list(&mut conn, offset, limit).await?;

        Ok(ListAvailabilities {
            availabilities,
            total_count,
        })
    }

    async fn connection(
        &self,
    ) -> Result<
        diesel_async::pooled_connection::bb8::PooledConnection<'_, diesel_async::AsyncPgConnection>,
        BookingError,
    > {
        self.pool
            .get()
            .await
            .map_err(|e| BookingError::DatabaseError(e.to_string()))
    }
}

/// Convert a 1-based page number into an offset, rejecting non-positive
/// pages and limits.
fn page_offset(page: i64, limit: i64) -> Result<(i64, i64), BookingError> {
    if page < 1 {
        return Err(BookingError::ValidationError(
            "page must be at least 1".to_string(),
        ));
    }
    if limit < 1 {
        return Err(BookingError::ValidationError(
            "limit must be at least 1".to_string(),
        ));
    }

    Ok(((page - 1) * limit, limit))
}
