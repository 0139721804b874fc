//! PostgreSQL-backed `CartRepository` implementation using Diesel.
//!
//! Cart uniqueness rides on the `(user_id, match_id)` unique constraint;
//! `add` uses `ON CONFLICT DO NOTHING` so repeat adds are a no-op rather than
//! an error.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::cart::CartItem;
use crate::domain::matches::MatchId;
use crate::domain::ports::{CartRepository, CartRepositoryError};
use crate::domain::user::UserId;

use super::diesel_error::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{CartItemRow, NewCartItemRow};
use super::pool::{DbPool, PoolError};
use super::schema::cart_items;

/// Diesel-backed implementation of the `CartRepository` port.
#[derive(Clone)]
pub struct DieselCartRepository {
    pool: DbPool,
}

impl DieselCartRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CartRepositoryError {
    map_basic_pool_error(error, CartRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> CartRepositoryError {
    map_basic_diesel_error(
        error,
        CartRepositoryError::query,
        CartRepositoryError::connection,
    )
}

fn row_to_item(row: CartItemRow) -> CartItem {
    CartItem::new(
        row.id,
        UserId::from_uuid(row.user_id),
        MatchId::from_uuid(row.match_id),
        row.added_at,
    )
}

#[async_trait]
impl CartRepository for DieselCartRepository {
    async fn add(
        &self,
        user_id: &UserId,
        match_id: &MatchId,
    ) -> Result<bool, CartRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewCartItemRow {
            id: Uuid::new_v4(),
            user_id: user_id.as_uuid(),
            match_id: match_id.as_uuid(),
            added_at: Utc::now(),
        };
        let inserted = diesel::insert_into(cart_items::table)
            .values(&row)
            .on_conflict((cart_items::user_id, cart_items::match_id))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(inserted > 0)
    }

    async fn remove(
        &self,
        user_id: &UserId,
        match_id: &MatchId,
    ) -> Result<bool, CartRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(
            cart_items::table
                .filter(cart_items::user_id.eq(user_id.as_uuid()))
                .filter(cart_items::match_id.eq(match_id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn items_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<CartItem>, CartRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CartItemRow> = cart_items::table
            .filter(cart_items::user_id.eq(user_id.as_uuid()))
            .select(CartItemRow::as_select())
            .order_by(cart_items::added_at.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_item).collect())
    }

    async fn clear(&self, user_id: &UserId) -> Result<u32, CartRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(
            cart_items::table.filter(cart_items::user_id.eq(user_id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(removed as u32)
    }
}
