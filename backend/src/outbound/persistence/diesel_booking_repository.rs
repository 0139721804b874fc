//! PostgreSQL-backed `BookingRepository` implementation using Diesel.
//!
//! `create_paid` inserts its whole batch inside one transaction so checkout
//! is atomic across the cart: a failure anywhere rolls every row back.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::AsyncConnection;
use uuid::Uuid;

use crate::domain::booking::{Booking, BookingId, BookingStatus};
use crate::domain::matches::MatchId;
use crate::domain::ports::{
    BookingRepository, BookingRepositoryError, CancelOutcome, NewBooking,
};
use crate::domain::user::UserId;

use super::diesel_error::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{BookingRow, NewBookingRow};
use super::pool::{DbPool, PoolError};
use super::schema::bookings;

/// Diesel-backed implementation of the `BookingRepository` port.
#[derive(Clone)]
pub struct DieselBookingRepository {
    pool: DbPool,
}

impl DieselBookingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> BookingRepositoryError {
    map_basic_pool_error(error, BookingRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> BookingRepositoryError {
    map_basic_diesel_error(
        error,
        BookingRepositoryError::query,
        BookingRepositoryError::connection,
    )
}

/// Convert a database row to a domain booking.
fn row_to_booking(row: BookingRow) -> Result<Booking, BookingRepositoryError> {
    let status = BookingStatus::from_db_str(&row.status).ok_or_else(|| {
        BookingRepositoryError::query(format!("unknown booking status: {}", row.status))
    })?;
    Ok(Booking::new(
        BookingId::from_uuid(row.id),
        UserId::from_uuid(row.user_id),
        MatchId::from_uuid(row.match_id),
        row.booked_at,
        status,
    ))
}

/// Transaction-internal cancel result, mapped to [`CancelOutcome`] outside.
enum CancelTx {
    Missing,
    Already,
    Done(Uuid),
}

#[async_trait]
impl BookingRepository for DieselBookingRepository {
    async fn create_paid(
        &self,
        new_bookings: &[NewBooking],
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<NewBookingRow<'_>> = new_bookings
            .iter()
            .map(|new| NewBookingRow {
                id: Uuid::new_v4(),
                user_id: new.user_id.as_uuid(),
                match_id: new.match_id.as_uuid(),
                booked_at: new.booked_at,
                status: BookingStatus::Paid.as_db_str(),
            })
            .collect();

        let inserted: Vec<BookingRow> = conn
            .transaction(|conn| {
                async move {
                    diesel::insert_into(bookings::table)
                        .values(&rows)
                        .get_results(conn)
                        .await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        inserted.into_iter().map(row_to_booking).collect()
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<BookingRow> = bookings::table
            .filter(bookings::user_id.eq(user_id.as_uuid()))
            .select(BookingRow::as_select())
            .order_by(bookings::booked_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_booking).collect()
    }

    async fn find_for_user(
        &self,
        booking_id: &BookingId,
        user_id: &UserId,
    ) -> Result<Option<Booking>, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<BookingRow> = bookings::table
            .find(booking_id.as_uuid())
            .filter(bookings::user_id.eq(user_id.as_uuid()))
            .select(BookingRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_booking).transpose()
    }

    async fn paid_count(&self, match_id: &MatchId) -> Result<u64, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = bookings::table
            .filter(bookings::match_id.eq(match_id.as_uuid()))
            .filter(bookings::status.eq(BookingStatus::Paid.as_db_str()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn cancel(
        &self,
        booking_id: &BookingId,
        user_id: &UserId,
    ) -> Result<CancelOutcome, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let booking_uuid = booking_id.as_uuid();
        let user_uuid = user_id.as_uuid();

        let result = conn
            .transaction(|conn| {
                async move {
                    let row: Option<BookingRow> = bookings::table
                        .find(booking_uuid)
                        .filter(bookings::user_id.eq(user_uuid))
                        .select(BookingRow::as_select())
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;

                    let Some(row) = row else {
                        return Ok(CancelTx::Missing);
                    };
                    if row.status == BookingStatus::Cancelled.as_db_str() {
                        return Ok(CancelTx::Already);
                    }

                    diesel::update(bookings::table.find(booking_uuid))
                        .set(bookings::status.eq(BookingStatus::Cancelled.as_db_str()))
                        .execute(conn)
                        .await?;
                    Ok(CancelTx::Done(row.match_id))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(match result {
            CancelTx::Missing => CancelOutcome::NotFound,
            CancelTx::Already => CancelOutcome::AlreadyCancelled,
            CancelTx::Done(match_id) => CancelOutcome::Cancelled {
                match_id: MatchId::from_uuid(match_id),
            },
        })
    }
}
