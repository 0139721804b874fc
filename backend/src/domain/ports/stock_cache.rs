//! Port abstraction for the per-match stock counter cache.
//!
//! The cache holds one integer per match: remaining sellable stock. The
//! decrement is the reservation engine's hot path and MUST be a single atomic
//! conditional operation on the cache side — a decrement that never takes the
//! counter below zero — not a read-then-write pair. Adapters back this with a
//! server-side script (Redis) or an interior lock (in-memory).

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::matches::MatchId;

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by stock cache adapters.
    pub enum StockCacheError {
        /// The cache backend cannot be reached or errored mid-operation.
        /// Transient: callers degrade to the durable store.
        Unavailable { message: String } => "stock cache unavailable: {message}",
    }
}

/// Result of an atomic conditional decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecrementOutcome {
    /// The counter was above zero and has been decremented.
    Decremented {
        /// Remaining stock after the decrement.
        remaining: u32,
    },
    /// The counter is already at zero; nothing was mutated.
    OutOfStock,
    /// No counter exists for this match (cache flush or cold start). The
    /// caller should reconcile from the durable store and retry.
    Miss,
}

/// Port for the per-match remaining-stock counter cache.
///
/// `try_decrement`/`increment` on one match's counter must be linearizable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StockCache: Send + Sync {
    /// Atomically decrement the counter for `match_id` if it is above zero.
    async fn try_decrement(&self, match_id: &MatchId)
    -> Result<DecrementOutcome, StockCacheError>;

    /// Return one unit of stock to the counter for `match_id`.
    ///
    /// A missing counter is left missing; the next reconcile rebuilds it
    /// with the returned unit included.
    async fn increment(&self, match_id: &MatchId) -> Result<(), StockCacheError>;

    /// Read the current counter, if one exists.
    async fn read(&self, match_id: &MatchId) -> Result<Option<u32>, StockCacheError>;

    /// Overwrite the counter with an authoritative value (reconciliation).
    async fn write(&self, match_id: &MatchId, remaining: u32) -> Result<(), StockCacheError>;
}

/// In-memory cache implementation.
///
/// The single mutex makes every counter operation linearizable, which is
/// exactly the contract the Redis adapter provides with server-side scripts.
/// Used by unit and integration tests, and usable as a single-process
/// deployment mode.
#[derive(Debug, Default)]
pub struct InMemoryStockCache {
    counters: Mutex<HashMap<Uuid, u32>>,
}

impl InMemoryStockCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, u32>> {
        match self.counters.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Drop every counter, simulating a cache flush or restart.
    pub fn flush(&self) {
        self.lock().clear();
    }
}

#[async_trait]
impl StockCache for InMemoryStockCache {
    async fn try_decrement(
        &self,
        match_id: &MatchId,
    ) -> Result<DecrementOutcome, StockCacheError> {
        let mut counters = self.lock();
        match counters.get_mut(&match_id.as_uuid()) {
            None => Ok(DecrementOutcome::Miss),
            Some(0) => Ok(DecrementOutcome::OutOfStock),
            Some(value) => {
                *value -= 1;
                Ok(DecrementOutcome::Decremented { remaining: *value })
            }
        }
    }

    async fn increment(&self, match_id: &MatchId) -> Result<(), StockCacheError> {
        let mut counters = self.lock();
        if let Some(value) = counters.get_mut(&match_id.as_uuid()) {
            *value = value.saturating_add(1);
        }
        Ok(())
    }

    async fn read(&self, match_id: &MatchId) -> Result<Option<u32>, StockCacheError> {
        Ok(self.lock().get(&match_id.as_uuid()).copied())
    }

    async fn write(&self, match_id: &MatchId, remaining: u32) -> Result<(), StockCacheError> {
        self.lock().insert(match_id.as_uuid(), remaining);
        Ok(())
    }
}
