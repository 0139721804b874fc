//! PostgreSQL-backed `MatchRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::AsyncConnection;
use tracing::info;

use crate::domain::matches::{Match, MatchId, Price};
use crate::domain::ports::{MatchRepository, MatchRepositoryError};

use super::diesel_error::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{MatchRow, NewMatchRow};
use super::pool::{DbPool, PoolError};
use super::schema::matches;

/// Diesel-backed implementation of the `MatchRepository` port.
#[derive(Clone)]
pub struct DieselMatchRepository {
    pool: DbPool,
}

impl DieselMatchRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> MatchRepositoryError {
    map_basic_pool_error(error, MatchRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> MatchRepositoryError {
    map_basic_diesel_error(
        error,
        MatchRepositoryError::query,
        MatchRepositoryError::connection,
    )
}

/// Convert a database row to a domain match.
fn row_to_match(row: MatchRow) -> Result<Match, MatchRepositoryError> {
    let capacity = u32::try_from(row.capacity)
        .map_err(|_| MatchRepositoryError::query("negative capacity in database"))?;
    Match::new(
        MatchId::from_uuid(row.id),
        row.home_team,
        row.away_team,
        row.kickoff,
        row.stadium,
        capacity,
        Price::from_pence(row.price_pence),
    )
    .map_err(|err| MatchRepositoryError::query(format!("corrupted match row: {err}")))
}

#[async_trait]
impl MatchRepository for DieselMatchRepository {
    async fn list(&self) -> Result<Vec<Match>, MatchRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<MatchRow> = matches::table
            .select(MatchRow::as_select())
            .order_by(matches::kickoff.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_match).collect()
    }

    async fn find(&self, match_id: &MatchId) -> Result<Option<Match>, MatchRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<MatchRow> = matches::table
            .find(match_id.as_uuid())
            .select(MatchRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_match).transpose()
    }

    async fn seed_if_empty(&self, seed: &[Match]) -> Result<u32, MatchRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<NewMatchRow<'_>> = seed
            .iter()
            .map(|game| NewMatchRow {
                id: game.id().as_uuid(),
                home_team: game.home_team(),
                away_team: game.away_team(),
                kickoff: game.kickoff(),
                stadium: game.stadium(),
                capacity: i32::try_from(game.capacity()).unwrap_or(i32::MAX),
                price_pence: game.price().pence(),
            })
            .collect();

        let inserted = conn
            .transaction(|conn| {
                async move {
                    let existing: i64 = matches::table.count().get_result(conn).await?;
                    if existing > 0 {
                        return Ok(0_usize);
                    }
                    diesel::insert_into(matches::table)
                        .values(&rows)
                        .execute(conn)
                        .await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        if inserted > 0 {
            info!(matches = inserted, "seeded match catalogue");
        }
        Ok(inserted as u32)
    }
}
