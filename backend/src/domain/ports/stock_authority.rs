//! Port abstraction for authoritative stock arithmetic in the durable store.
//!
//! The cache is fast but volatile; this port answers from the source of
//! truth. `snapshot` backs reconciliation, and `try_reserve` is the degraded
//! reserve path used when the cache is unreachable — adapters must take a
//! row-level lock on the match row so concurrent callers serialize.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::matches::MatchId;

use super::booking_repository::FixtureBookingRepository;
use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by stock authority adapters.
    pub enum StockAuthorityError {
        /// Store connection could not be established. Transient.
        Connection { message: String } => "stock authority connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "stock authority query failed: {message}",
        /// The match does not exist in the durable store.
        UnknownMatch { match_id: String } => "unknown match: {match_id}",
    }
}

/// Authoritative stock figures for one match, read under a row lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockSnapshot {
    /// Immutable total capacity.
    pub capacity: u32,
    /// Count of PAID bookings.
    pub paid: u64,
}

impl StockSnapshot {
    /// Remaining stock once `live_holds` in-flight reservations are counted.
    pub fn remaining(&self, live_holds: u32) -> u32 {
        let committed = self.paid.saturating_add(u64::from(live_holds));
        u32::try_from(u64::from(self.capacity).saturating_sub(committed)).unwrap_or(0)
    }
}

/// Port for authoritative stock reads and the cache-bypass reserve step.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StockAuthority: Send + Sync {
    /// Capacity and PAID count for a match, read under a row-level lock.
    async fn snapshot(&self, match_id: &MatchId) -> Result<StockSnapshot, StockAuthorityError>;

    /// Atomically decide one reserve attempt against the durable store.
    ///
    /// `live_holds` is the caller's count of unexpired reservations for the
    /// match. Returns `true` when `capacity > paid + live_holds`, evaluated
    /// inside one transaction holding the match row lock.
    async fn try_reserve(
        &self,
        match_id: &MatchId,
        live_holds: u32,
    ) -> Result<bool, StockAuthorityError>;

    /// Identifiers of every known match, for periodic reconciliation.
    async fn match_ids(&self) -> Result<Vec<MatchId>, StockAuthorityError>;
}

/// In-memory authority for tests and fixtures.
///
/// Shares its PAID counts with a [`FixtureBookingRepository`] so bookings
/// created through the repository are visible to reconciliation, exactly as
/// they would be through the database.
#[derive(Debug, Default)]
pub struct FixtureStockAuthority {
    capacities: Mutex<HashMap<Uuid, u32>>,
    bookings: Option<Arc<FixtureBookingRepository>>,
}

impl FixtureStockAuthority {
    /// Authority with the given capacities and no booking linkage.
    pub fn with_capacities(capacities: impl IntoIterator<Item = (MatchId, u32)>) -> Self {
        Self {
            capacities: Mutex::new(
                capacities
                    .into_iter()
                    .map(|(id, capacity)| (id.as_uuid(), capacity))
                    .collect(),
            ),
            bookings: None,
        }
    }

    /// Attach a booking repository whose PAID counts this authority reports.
    #[must_use]
    pub fn with_bookings(mut self, bookings: Arc<FixtureBookingRepository>) -> Self {
        self.bookings = Some(bookings);
        self
    }

    /// Register a match after construction.
    pub fn insert_match(&self, match_id: MatchId, capacity: u32) {
        self.lock().insert(match_id.as_uuid(), capacity);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, u32>> {
        match self.capacities.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn paid(&self, match_id: &MatchId) -> u64 {
        self.bookings
            .as_ref()
            .map_or(0, |repo| repo.paid_count_sync(match_id))
    }
}

#[async_trait]
impl StockAuthority for FixtureStockAuthority {
    async fn snapshot(&self, match_id: &MatchId) -> Result<StockSnapshot, StockAuthorityError> {
        let capacity = self
            .lock()
            .get(&match_id.as_uuid())
            .copied()
            .ok_or_else(|| StockAuthorityError::unknown_match(match_id.to_string()))?;
        Ok(StockSnapshot {
            capacity,
            paid: self.paid(match_id),
        })
    }

    async fn try_reserve(
        &self,
        match_id: &MatchId,
        live_holds: u32,
    ) -> Result<bool, StockAuthorityError> {
        let snapshot = self.snapshot(match_id).await?;
        Ok(snapshot.remaining(live_holds) > 0)
    }

    async fn match_ids(&self) -> Result<Vec<MatchId>, StockAuthorityError> {
        Ok(self
            .lock()
            .keys()
            .map(|id| MatchId::from_uuid(*id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(10, 0, 0, 10)]
    #[case(10, 4, 3, 3)]
    #[case(10, 10, 0, 0)]
    #[case(10, 9, 5, 0)]
    fn snapshot_remaining_never_underflows(
        #[case] capacity: u32,
        #[case] paid: u64,
        #[case] live: u32,
        #[case] expected: u32,
    ) {
        let snapshot = StockSnapshot { capacity, paid };
        assert_eq!(snapshot.remaining(live), expected);
    }

    #[tokio::test]
    async fn unknown_matches_are_reported() {
        let authority = FixtureStockAuthority::default();
        let err = authority
            .snapshot(&MatchId::random())
            .await
            .expect_err("unknown match must fail");
        assert!(matches!(err, StockAuthorityError::UnknownMatch { .. }));
    }

    #[tokio::test]
    async fn try_reserve_counts_live_holds() {
        let id = MatchId::random();
        let authority = FixtureStockAuthority::with_capacities([(id, 2)]);
        assert!(authority.try_reserve(&id, 1).await.expect("reserve"));
        assert!(!authority.try_reserve(&id, 2).await.expect("reserve"));
    }
}
