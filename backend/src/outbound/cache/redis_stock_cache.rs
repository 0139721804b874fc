//! Redis-backed `StockCache` adapter.
//!
//! Counters live under namespaced keys (`stock:<match-uuid>`). The
//! conditional decrement and the guarded increment run as server-side Lua
//! scripts, so each is one atomic Redis operation: the floor-at-zero test and
//! the decrement can never interleave with another client.

use async_trait::async_trait;
use bb8_redis::redis::{AsyncCommands, Script};
use bb8_redis::{RedisConnectionManager, bb8};

use crate::domain::matches::MatchId;
use crate::domain::ports::{DecrementOutcome, StockCache, StockCacheError};

/// Conditional decrement: `-1` when the key is missing, `-2` when the counter
/// is at (or somehow below) zero, otherwise the decremented value.
const TRY_DECREMENT: &str = r"
local value = redis.call('GET', KEYS[1])
if not value then
  return -1
end
if tonumber(value) <= 0 then
  return -2
end
return redis.call('DECR', KEYS[1])
";

/// Guarded increment: a missing key stays missing so the next reconcile
/// rebuilds it with the returned unit included.
const GUARDED_INCREMENT: &str = r"
if redis.call('EXISTS', KEYS[1]) == 0 then
  return -1
end
return redis.call('INCR', KEYS[1])
";

fn unavailable(err: impl std::fmt::Display) -> StockCacheError {
    StockCacheError::unavailable(err.to_string())
}

/// Redis implementation of the `StockCache` port over a bb8 pool.
#[derive(Clone)]
pub struct RedisStockCache {
    pool: bb8::Pool<RedisConnectionManager>,
}

impl RedisStockCache {
    /// Connect a pooled client to the given Redis URL.
    pub async fn connect(redis_url: &str, max_size: u32) -> Result<Self, StockCacheError> {
        let manager = RedisConnectionManager::new(redis_url).map_err(unavailable)?;
        let pool = bb8::Pool::builder()
            .max_size(max_size)
            .build(manager)
            .await
            .map_err(unavailable)?;
        Ok(Self { pool })
    }

    fn key(match_id: &MatchId) -> String {
        format!("stock:{match_id}")
    }
}

#[async_trait]
impl StockCache for RedisStockCache {
    async fn try_decrement(
        &self,
        match_id: &MatchId,
    ) -> Result<DecrementOutcome, StockCacheError> {
        let mut conn = self.pool.get().await.map_err(unavailable)?;
        let result: i64 = Script::new(TRY_DECREMENT)
            .key(Self::key(match_id))
            .invoke_async(&mut *conn)
            .await
            .map_err(unavailable)?;
        Ok(match result {
            -1 => DecrementOutcome::Miss,
            -2 => DecrementOutcome::OutOfStock,
            remaining => DecrementOutcome::Decremented {
                remaining: u32::try_from(remaining.max(0)).unwrap_or(0),
            },
        })
    }

    async fn increment(&self, match_id: &MatchId) -> Result<(), StockCacheError> {
        let mut conn = self.pool.get().await.map_err(unavailable)?;
        let _result: i64 = Script::new(GUARDED_INCREMENT)
            .key(Self::key(match_id))
            .invoke_async(&mut *conn)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn read(&self, match_id: &MatchId) -> Result<Option<u32>, StockCacheError> {
        let mut conn = self.pool.get().await.map_err(unavailable)?;
        let value: Option<i64> = conn
            .get(Self::key(match_id))
            .await
            .map_err(unavailable)?;
        Ok(value.map(|v| u32::try_from(v.max(0)).unwrap_or(0)))
    }

    async fn write(&self, match_id: &MatchId, remaining: u32) -> Result<(), StockCacheError> {
        let mut conn = self.pool.get().await.map_err(unavailable)?;
        let () = conn
            .set(Self::key(match_id), i64::from(remaining))
            .await
            .map_err(unavailable)?;
        Ok(())
    }
}
