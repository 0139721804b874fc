//! PostgreSQL-backed `StockAuthority` implementation using Diesel.
//!
//! Both `snapshot` and `try_reserve` lock the match row with
//! `SELECT ... FOR UPDATE` so concurrent callers serialize on the match:
//! the capacity read and the PAID count observe one consistent state, which
//! is what makes the cache-bypass reserve path race-free.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, AsyncPgConnection};
use uuid::Uuid;

use crate::domain::booking::BookingStatus;
use crate::domain::matches::MatchId;
use crate::domain::ports::{StockAuthority, StockAuthorityError, StockSnapshot};

use super::diesel_error::{map_basic_diesel_error, map_basic_pool_error};
use super::pool::{DbPool, PoolError};
use super::schema::{bookings, matches};

/// Diesel-backed implementation of the `StockAuthority` port.
#[derive(Clone)]
pub struct DieselStockAuthority {
    pool: DbPool,
}

impl DieselStockAuthority {
    /// Create a new authority with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> StockAuthorityError {
    map_basic_pool_error(error, StockAuthorityError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> StockAuthorityError {
    map_basic_diesel_error(
        error,
        StockAuthorityError::query,
        StockAuthorityError::connection,
    )
}

/// Row-locked capacity and PAID count, shared by both port operations.
async fn locked_snapshot(
    conn: &mut AsyncPgConnection,
    match_uuid: Uuid,
) -> Result<Option<(i32, i64)>, diesel::result::Error> {
    let capacity: Option<i32> = matches::table
        .find(match_uuid)
        .select(matches::capacity)
        .for_update()
        .first(conn)
        .await
        .optional()?;
    let Some(capacity) = capacity else {
        return Ok(None);
    };
    let paid: i64 = bookings::table
        .filter(bookings::match_id.eq(match_uuid))
        .filter(bookings::status.eq(BookingStatus::Paid.as_db_str()))
        .count()
        .get_result(conn)
        .await?;
    Ok(Some((capacity, paid)))
}

fn to_snapshot(capacity: i32, paid: i64) -> StockSnapshot {
    StockSnapshot {
        capacity: u32::try_from(capacity).unwrap_or(0),
        paid: u64::try_from(paid).unwrap_or(0),
    }
}

#[async_trait]
impl StockAuthority for DieselStockAuthority {
    async fn snapshot(&self, match_id: &MatchId) -> Result<StockSnapshot, StockAuthorityError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let match_uuid = match_id.as_uuid();
        let figures = conn
            .transaction(|conn| async move { locked_snapshot(conn, match_uuid).await }.scope_boxed())
            .await
            .map_err(map_diesel_error)?;
        let (capacity, paid) = figures
            .ok_or_else(|| StockAuthorityError::unknown_match(match_id.to_string()))?;
        Ok(to_snapshot(capacity, paid))
    }

    async fn try_reserve(
        &self,
        match_id: &MatchId,
        live_holds: u32,
    ) -> Result<bool, StockAuthorityError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let match_uuid = match_id.as_uuid();
        let figures = conn
            .transaction(|conn| async move { locked_snapshot(conn, match_uuid).await }.scope_boxed())
            .await
            .map_err(map_diesel_error)?;
        let (capacity, paid) = figures
            .ok_or_else(|| StockAuthorityError::unknown_match(match_id.to_string()))?;
        Ok(to_snapshot(capacity, paid).remaining(live_holds) > 0)
    }

    async fn match_ids(&self) -> Result<Vec<MatchId>, StockAuthorityError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let ids: Vec<Uuid> = matches::table
            .select(matches::id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(ids.into_iter().map(MatchId::from_uuid).collect())
    }
}
