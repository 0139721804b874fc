//! The stock reservation engine.
//!
//! Guarantees that confirmed bookings for a match never exceed its capacity,
//! even under concurrent checkout attempts, while serving "remaining stock"
//! reads from the counter cache instead of the durable store.
//!
//! ## Coherence rules
//!
//! - The cache decrement is a single atomic conditional operation; the engine
//!   never reads a counter and writes it back.
//! - A hold registers in the in-memory table *before* its counter decrement,
//!   so reconciliation can observe a reservation without its decrement
//!   (transient undercount, self-healing) but never a decrement without its
//!   reservation (which would oversell).
//! - When the cache is unreachable, reserving falls through to the durable
//!   store under a row-level lock, trading latency for correctness.
//! - Expired holds are reclaimed by the maintenance sweep plus expiry checks
//!   at confirmation time; reconciliation rebuilds counters from
//!   `capacity − PAID bookings − live holds`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use mockable::Clock;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::booking::Booking;
use crate::domain::matches::MatchId;
use crate::domain::ports::{
    BookingRepository, BookingRepositoryError, DecrementOutcome, NewBooking, StockAuthority,
    StockAuthorityError, StockCache,
};
use crate::domain::reservation::{Reservation, ReservationId};
use crate::domain::user::UserId;

/// Default lifetime of an unconfirmed reservation.
pub const DEFAULT_RESERVATION_TTL: StdDuration = StdDuration::from_secs(120);

const GIVE_BACK_ATTEMPTS: u32 = 3;
const GIVE_BACK_BASE_DELAY: StdDuration = StdDuration::from_millis(50);

/// Failures surfaced by the reservation engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StockError {
    /// The counter is at zero. A business outcome, not a fault; nothing was
    /// mutated and callers must not retry.
    #[error("no stock remaining for match {match_id}")]
    OutOfStock {
        /// The sold-out match.
        match_id: MatchId,
    },
    /// The reservation lapsed (or was already resolved) before confirmation;
    /// the caller must re-reserve.
    #[error("reservation expired before confirmation")]
    ReservationExpired,
    /// The counter cache is unreachable. Transient.
    #[error("stock cache unavailable: {message}")]
    CacheUnavailable {
        /// Adapter-provided context.
        message: String,
    },
    /// The durable store is unreachable or failing. Transient.
    #[error("durable store unavailable: {message}")]
    StoreUnavailable {
        /// Adapter-provided context.
        message: String,
    },
    /// The match does not exist.
    #[error("unknown match: {match_id}")]
    UnknownMatch {
        /// The unrecognised id.
        match_id: MatchId,
    },
    /// An engine invariant was violated; indicates a programming error.
    #[error("reservation engine invariant violated: {message}")]
    Internal {
        /// What went wrong.
        message: String,
    },
}

impl From<StockError> for crate::domain::error::Error {
    fn from(err: StockError) -> Self {
        use crate::domain::error::Error;
        match err {
            StockError::OutOfStock { match_id } => Error::out_of_stock("no stock remaining")
                .with_details(serde_json::json!({ "matchId": match_id })),
            StockError::ReservationExpired => {
                Error::reservation_expired("reservation expired before confirmation")
            }
            StockError::CacheUnavailable { message } => {
                Error::service_unavailable(format!("stock cache unavailable: {message}"))
            }
            StockError::StoreUnavailable { message } => {
                Error::service_unavailable(format!("durable store unavailable: {message}"))
            }
            StockError::UnknownMatch { match_id } => {
                Error::not_found(format!("match {match_id} not found"))
            }
            StockError::Internal { message } => Error::internal(message),
        }
    }
}

fn map_authority_error(err: StockAuthorityError, match_id: &MatchId) -> StockError {
    match err {
        StockAuthorityError::Connection { message } | StockAuthorityError::Query { message } => {
            StockError::StoreUnavailable { message }
        }
        StockAuthorityError::UnknownMatch { .. } => StockError::UnknownMatch {
            match_id: *match_id,
        },
    }
}

fn map_booking_error(err: BookingRepositoryError) -> StockError {
    match err {
        BookingRepositoryError::Connection { message }
        | BookingRepositoryError::Query { message } => StockError::StoreUnavailable { message },
    }
}

/// Outcome of one reserve attempt against the cache.
enum CacheAttempt {
    Reserved(ReservationId),
    SoldOut,
    Cold,
    Down(String),
}

/// Atomically reserves, confirms, releases, and reconciles per-match stock.
///
/// The engine owns every live [`Reservation`]; holds exist only in process
/// memory and are never persisted beyond their expiry window.
pub struct ReservationEngine {
    cache: Arc<dyn StockCache>,
    authority: Arc<dyn StockAuthority>,
    bookings: Arc<dyn BookingRepository>,
    clock: Arc<dyn Clock + Send + Sync>,
    ttl: chrono::Duration,
    holds: Mutex<HashMap<Uuid, Reservation>>,
    // Serializes the cache-bypass reserve path so the in-process hold count
    // read and the row-locked store decision form one linearizable step.
    store_reserve_gate: tokio::sync::Mutex<()>,
}

impl ReservationEngine {
    /// Build an engine over the given adapters.
    pub fn new(
        cache: Arc<dyn StockCache>,
        authority: Arc<dyn StockAuthority>,
        bookings: Arc<dyn BookingRepository>,
        clock: Arc<dyn Clock + Send + Sync>,
        ttl: StdDuration,
    ) -> Self {
        let ttl =
            chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::seconds(120));
        Self {
            cache,
            authority,
            bookings,
            clock,
            ttl,
            holds: Mutex::new(HashMap::new()),
            store_reserve_gate: tokio::sync::Mutex::new(()),
        }
    }

    fn lock_holds(&self) -> MutexGuard<'_, HashMap<Uuid, Reservation>> {
        match self.holds.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Count unexpired holds for a match.
    fn live_holds(&self, match_id: &MatchId, now: DateTime<Utc>) -> u32 {
        self.lock_holds()
            .values()
            .filter(|hold| hold.match_id() == match_id && !hold.is_expired(now))
            .count() as u32
    }

    fn register_hold(&self, user_id: &UserId, match_id: &MatchId) -> ReservationId {
        let now = self.clock.utc();
        let id = ReservationId::random();
        let hold = Reservation::new(id, *user_id, *match_id, now + self.ttl);
        self.lock_holds().insert(id.as_uuid(), hold);
        id
    }

    fn drop_hold(&self, id: &ReservationId) -> Option<Reservation> {
        self.lock_holds().remove(&id.as_uuid())
    }

    /// Atomically test-and-decrement the live counter for `match_id`.
    ///
    /// On success returns a reservation with a short expiry. When the counter
    /// is already at zero, returns [`StockError::OutOfStock`] without
    /// mutating state. A cold counter is rebuilt from the durable store and
    /// the attempt retried once; an unreachable cache falls through to the
    /// row-locked store path.
    pub async fn reserve(
        &self,
        match_id: &MatchId,
        user_id: &UserId,
    ) -> Result<ReservationId, StockError> {
        match self.reserve_via_cache(match_id, user_id).await {
            CacheAttempt::Reserved(id) => Ok(id),
            CacheAttempt::SoldOut => Err(StockError::OutOfStock { match_id: *match_id }),
            CacheAttempt::Down(message) => {
                warn!(%match_id, %message, "cache unreachable, reserving against store");
                self.reserve_against_store(match_id, user_id).await
            }
            CacheAttempt::Cold => {
                self.reconcile(match_id).await?;
                match self.reserve_via_cache(match_id, user_id).await {
                    CacheAttempt::Reserved(id) => Ok(id),
                    CacheAttempt::SoldOut => {
                        Err(StockError::OutOfStock { match_id: *match_id })
                    }
                    CacheAttempt::Cold | CacheAttempt::Down(_) => {
                        self.reserve_against_store(match_id, user_id).await
                    }
                }
            }
        }
    }

    async fn reserve_via_cache(&self, match_id: &MatchId, user_id: &UserId) -> CacheAttempt {
        // Hold first, then decrement: see the module coherence rules.
        let id = self.register_hold(user_id, match_id);
        match self.cache.try_decrement(match_id).await {
            Ok(DecrementOutcome::Decremented { remaining }) => {
                debug!(%match_id, remaining, "reserved one unit");
                CacheAttempt::Reserved(id)
            }
            Ok(DecrementOutcome::OutOfStock) => {
                self.drop_hold(&id);
                CacheAttempt::SoldOut
            }
            Ok(DecrementOutcome::Miss) => {
                self.drop_hold(&id);
                CacheAttempt::Cold
            }
            Err(err) => {
                self.drop_hold(&id);
                CacheAttempt::Down(err.to_string())
            }
        }
    }

    /// Degraded reserve path: decide against the durable store under its row
    /// lock, serialized in-process so the hold count cannot be read twice.
    async fn reserve_against_store(
        &self,
        match_id: &MatchId,
        user_id: &UserId,
    ) -> Result<ReservationId, StockError> {
        let _gate = self.store_reserve_gate.lock().await;
        let now = self.clock.utc();
        let live = self.live_holds(match_id, now);
        let admitted = self
            .authority
            .try_reserve(match_id, live)
            .await
            .map_err(|err| map_authority_error(err, match_id))?;
        if !admitted {
            return Err(StockError::OutOfStock { match_id: *match_id });
        }
        Ok(self.register_hold(user_id, match_id))
    }

    /// Convert a live reservation into a durable PAID booking.
    ///
    /// Runs inside a single durable-store transaction. Expired (or already
    /// resolved) reservations fail with [`StockError::ReservationExpired`]
    /// and create nothing; their unit returns to the counter.
    pub async fn confirm(&self, reservation_id: &ReservationId) -> Result<Booking, StockError> {
        let mut bookings = self.confirm_all(std::slice::from_ref(reservation_id)).await?;
        bookings.pop().ok_or_else(|| StockError::Internal {
            message: "booking batch returned no rows".to_owned(),
        })
    }

    /// Confirm a batch of reservations inside one durable transaction.
    ///
    /// All-or-nothing: if any reservation has expired, or the booking batch
    /// fails to persist, no booking is created and every live hold stays in
    /// place for the caller to release.
    pub async fn confirm_all(
        &self,
        reservation_ids: &[ReservationId],
    ) -> Result<Vec<Booking>, StockError> {
        enum HoldState {
            Unknown,
            Lapsed,
            Live(NewBooking),
        }

        let now = self.clock.utc();
        let mut lapsed: Vec<Reservation> = Vec::new();
        let mut unknown = false;
        let mut rows: Vec<NewBooking> = Vec::with_capacity(reservation_ids.len());
        {
            let mut holds = self.lock_holds();
            for id in reservation_ids {
                let state = match holds.get(&id.as_uuid()) {
                    None => HoldState::Unknown,
                    Some(hold) if hold.is_expired(now) => HoldState::Lapsed,
                    Some(hold) => HoldState::Live(NewBooking {
                        user_id: *hold.user_id(),
                        match_id: *hold.match_id(),
                        booked_at: now,
                    }),
                };
                match state {
                    HoldState::Unknown => unknown = true,
                    HoldState::Lapsed => {
                        // Reclaim eagerly rather than waiting for the sweep.
                        if let Some(hold) = holds.remove(&id.as_uuid()) {
                            lapsed.push(hold);
                        }
                    }
                    HoldState::Live(row) => rows.push(row),
                }
            }
        }

        if unknown || !lapsed.is_empty() {
            for hold in &lapsed {
                if let Err(err) = self.give_back_unit(hold.match_id()).await {
                    warn!(
                        match_id = %hold.match_id(),
                        error = %err,
                        "failed to return stock for lapsed hold; maintenance will reconcile"
                    );
                }
            }
            return Err(StockError::ReservationExpired);
        }

        let bookings = self
            .bookings
            .create_paid(&rows)
            .await
            .map_err(map_booking_error)?;

        // The PAID rows now account for the decremented units; the holds can go.
        let mut holds = self.lock_holds();
        for id in reservation_ids {
            holds.remove(&id.as_uuid());
        }
        Ok(bookings)
    }

    /// Explicitly cancel a reservation, returning its unit to the counter.
    ///
    /// Idempotent: releasing an already-released or already-confirmed
    /// reservation is a no-op.
    pub async fn release(&self, reservation_id: &ReservationId) -> Result<(), StockError> {
        let Some(hold) = self.drop_hold(reservation_id) else {
            return Ok(());
        };
        if let Err(err) = self.give_back_unit(hold.match_id()).await {
            // Put the hold back so the expiry sweep retries the give-back.
            warn!(
                reservation_id = %reservation_id,
                error = %err,
                "stock give-back failed; hold re-queued until natural expiry"
            );
            self.lock_holds().insert(reservation_id.as_uuid(), hold);
        }
        Ok(())
    }

    /// Return one unit to the counter, retrying with backoff and finally
    /// rebuilding the counter from the durable store.
    async fn give_back_unit(&self, match_id: &MatchId) -> Result<(), StockError> {
        let mut delay = GIVE_BACK_BASE_DELAY;
        for attempt in 1..=GIVE_BACK_ATTEMPTS {
            match self.cache.increment(match_id).await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    warn!(%match_id, attempt, error = %err, "stock give-back attempt failed");
                    if attempt < GIVE_BACK_ATTEMPTS {
                        tokio::time::sleep(delay).await;
                        delay = delay.saturating_mul(2);
                    }
                }
            }
        }
        self.reconcile(match_id).await.map(|_| ())
    }

    /// Recompute the counter from the durable store and overwrite the cache.
    ///
    /// `remaining = capacity − PAID bookings − unexpired holds`. Used on
    /// cache miss, on disagreement, and periodically from the maintenance
    /// task. Returns the recomputed value even when the cache write fails.
    pub async fn reconcile(&self, match_id: &MatchId) -> Result<u32, StockError> {
        let snapshot = self
            .authority
            .snapshot(match_id)
            .await
            .map_err(|err| map_authority_error(err, match_id))?;
        let now = self.clock.utc();
        let remaining = snapshot.remaining(self.live_holds(match_id, now));
        if let Err(err) = self.cache.write(match_id, remaining).await {
            warn!(%match_id, error = %err, "cache write skipped during reconcile");
        }
        Ok(remaining)
    }

    /// Remaining stock for a match: cache first, reconcile on miss, durable
    /// store when the cache is unreachable.
    pub async fn remaining(&self, match_id: &MatchId) -> Result<u32, StockError> {
        match self.cache.read(match_id).await {
            Ok(Some(value)) => Ok(value),
            Ok(None) => self.reconcile(match_id).await,
            Err(err) => {
                warn!(%match_id, error = %err, "cache read failed, answering from store");
                let snapshot = self
                    .authority
                    .snapshot(match_id)
                    .await
                    .map_err(|err| map_authority_error(err, match_id))?;
                let now = self.clock.utc();
                Ok(snapshot.remaining(self.live_holds(match_id, now)))
            }
        }
    }

    /// Drop expired holds and reconcile every affected match.
    ///
    /// Returns the number of holds reclaimed.
    pub async fn sweep_expired(&self) -> usize {
        let now = self.clock.utc();
        let expired: Vec<Reservation> = {
            let mut holds = self.lock_holds();
            let ids: Vec<Uuid> = holds
                .iter()
                .filter(|(_, hold)| hold.is_expired(now))
                .map(|(id, _)| *id)
                .collect();
            ids.iter().filter_map(|id| holds.remove(id)).collect()
        };
        if expired.is_empty() {
            return 0;
        }

        let mut affected: Vec<MatchId> = expired.iter().map(|hold| *hold.match_id()).collect();
        affected.sort_by_key(MatchId::as_uuid);
        affected.dedup();
        for match_id in &affected {
            if let Err(err) = self.reconcile(match_id).await {
                warn!(%match_id, error = %err, "reconcile after sweep failed");
            }
        }
        debug!(reclaimed = expired.len(), "expiry sweep reclaimed holds");
        expired.len()
    }

    /// Spawn the background maintenance loop: expiry sweep plus a periodic
    /// full reconcile, jittered so replicas do not stampede the store.
    pub fn spawn_maintenance(self: Arc<Self>, every: StdDuration) -> JoinHandle<()> {
        let engine = self;
        tokio::spawn(async move {
            let mut rng = SmallRng::from_entropy();
            let max_jitter_ms = u64::try_from(every.as_millis() / 10).unwrap_or(1_000).min(10_000);
            loop {
                let jitter = StdDuration::from_millis(rng.gen_range(0..=max_jitter_ms));
                tokio::time::sleep(every + jitter).await;
                let reclaimed = engine.sweep_expired().await;
                if reclaimed > 0 {
                    debug!(reclaimed, "maintenance sweep reclaimed expired holds");
                }
                match engine.authority.match_ids().await {
                    Ok(ids) => {
                        for match_id in ids {
                            if let Err(err) = engine.reconcile(&match_id).await {
                                warn!(%match_id, error = %err, "periodic reconcile failed");
                            }
                        }
                    }
                    Err(err) => warn!(error = %err, "periodic reconcile could not list matches"),
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the reservation engine's sequential paths.
    //! Concurrency properties live in the crate's integration tests.
    use std::sync::Mutex as StdMutex;

    use chrono::{DateTime, Local, Utc};
    use mockable::Clock;
    use rstest::rstest;

    use super::*;
    use crate::domain::booking::BookingStatus;
    use crate::domain::ports::{
        FixtureBookingRepository, FixtureStockAuthority, InMemoryStockCache, MockStockCache,
        StockCacheError,
    };

    /// Test clock that only moves when told to.
    struct ManualClock {
        now: StdMutex<DateTime<Utc>>,
    }

    impl ManualClock {
        fn starting_now() -> Self {
            Self {
                now: StdMutex::new(Utc::now()),
            }
        }

        fn advance(&self, delta: chrono::Duration) {
            let mut now = self.now.lock().expect("clock lock");
            *now += delta;
        }
    }

    impl Clock for ManualClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            *self.now.lock().expect("clock lock")
        }
    }

    struct Harness {
        engine: Arc<ReservationEngine>,
        cache: Arc<InMemoryStockCache>,
        bookings: Arc<FixtureBookingRepository>,
        clock: Arc<ManualClock>,
        match_id: MatchId,
        user_id: UserId,
    }

    fn harness(capacity: u32) -> Harness {
        let match_id = MatchId::random();
        let cache = Arc::new(InMemoryStockCache::new());
        let bookings = Arc::new(FixtureBookingRepository::new());
        let authority = Arc::new(
            FixtureStockAuthority::with_capacities([(match_id, capacity)])
                .with_bookings(Arc::clone(&bookings)),
        );
        let clock = Arc::new(ManualClock::starting_now());
        let engine = Arc::new(ReservationEngine::new(
            Arc::clone(&cache) as Arc<dyn StockCache>,
            authority,
            Arc::clone(&bookings) as Arc<dyn BookingRepository>,
            Arc::clone(&clock) as Arc<dyn Clock + Send + Sync>,
            DEFAULT_RESERVATION_TTL,
        ));
        Harness {
            engine,
            cache,
            bookings,
            clock,
            match_id,
            user_id: UserId::random(),
        }
    }

    #[tokio::test]
    async fn cold_counter_is_rebuilt_before_reserving() {
        let h = harness(3);
        // No counter exists yet: the engine must reconcile, then decrement.
        let id = h
            .engine
            .reserve(&h.match_id, &h.user_id)
            .await
            .expect("reserve succeeds on a cold cache");
        assert_eq!(h.cache.read(&h.match_id).await.expect("read"), Some(2));
        h.engine.release(&id).await.expect("release");
        assert_eq!(h.cache.read(&h.match_id).await.expect("read"), Some(3));
    }

    #[tokio::test]
    async fn reserve_returns_out_of_stock_at_zero_without_mutation() {
        let h = harness(1);
        let _held = h
            .engine
            .reserve(&h.match_id, &h.user_id)
            .await
            .expect("first reserve");
        let err = h
            .engine
            .reserve(&h.match_id, &h.user_id)
            .await
            .expect_err("second reserve must fail");
        assert_eq!(err, StockError::OutOfStock { match_id: h.match_id });
        assert_eq!(h.cache.read(&h.match_id).await.expect("read"), Some(0));
    }

    #[tokio::test]
    async fn reserving_an_unknown_match_fails() {
        let h = harness(1);
        let stranger = MatchId::random();
        let err = h
            .engine
            .reserve(&stranger, &h.user_id)
            .await
            .expect_err("unknown match must fail");
        assert_eq!(err, StockError::UnknownMatch { match_id: stranger });
    }

    #[tokio::test]
    async fn confirm_persists_a_paid_booking_and_reconcile_is_stable() {
        let h = harness(5);
        let id = h
            .engine
            .reserve(&h.match_id, &h.user_id)
            .await
            .expect("reserve");
        let before = h.engine.remaining(&h.match_id).await.expect("remaining");

        let booking = h.engine.confirm(&id).await.expect("confirm");
        assert_eq!(booking.status(), BookingStatus::Paid);
        assert_eq!(booking.match_id(), &h.match_id);

        // The reservation was replaced by an equivalent booking deduction.
        let after = h.engine.reconcile(&h.match_id).await.expect("reconcile");
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn confirm_past_expiry_creates_nothing_and_restores_stock() {
        let h = harness(2);
        let id = h
            .engine
            .reserve(&h.match_id, &h.user_id)
            .await
            .expect("reserve");
        assert_eq!(h.cache.read(&h.match_id).await.expect("read"), Some(1));

        h.clock.advance(chrono::Duration::seconds(121));
        let err = h.engine.confirm(&id).await.expect_err("expired confirm");
        assert_eq!(err, StockError::ReservationExpired);
        assert_eq!(h.bookings.paid_count(&h.match_id).await.expect("count"), 0);
        assert_eq!(h.cache.read(&h.match_id).await.expect("read"), Some(2));
    }

    #[tokio::test]
    async fn confirming_twice_reports_expiry_without_double_booking() {
        let h = harness(2);
        let id = h
            .engine
            .reserve(&h.match_id, &h.user_id)
            .await
            .expect("reserve");
        h.engine.confirm(&id).await.expect("first confirm");
        let err = h.engine.confirm(&id).await.expect_err("second confirm");
        assert_eq!(err, StockError::ReservationExpired);
        assert_eq!(h.bookings.paid_count(&h.match_id).await.expect("count"), 1);
    }

    #[tokio::test]
    async fn release_is_idempotent() {
        let h = harness(4);
        let id = h
            .engine
            .reserve(&h.match_id, &h.user_id)
            .await
            .expect("reserve");
        h.engine.release(&id).await.expect("first release");
        h.engine.release(&id).await.expect("second release");
        assert_eq!(h.cache.read(&h.match_id).await.expect("read"), Some(4));
    }

    #[tokio::test]
    async fn expired_hold_plus_reconcile_restores_the_counter() {
        let h = harness(3);
        let _abandoned = h
            .engine
            .reserve(&h.match_id, &h.user_id)
            .await
            .expect("reserve");
        assert_eq!(h.engine.remaining(&h.match_id).await.expect("remaining"), 2);

        h.clock.advance(chrono::Duration::seconds(180));
        let remaining = h.engine.reconcile(&h.match_id).await.expect("reconcile");
        assert_eq!(remaining, 3, "abandoned hold must not cost capacity");
    }

    #[tokio::test]
    async fn sweep_reclaims_expired_holds() {
        let h = harness(3);
        let _a = h.engine.reserve(&h.match_id, &h.user_id).await.expect("reserve");
        let _b = h.engine.reserve(&h.match_id, &h.user_id).await.expect("reserve");
        h.clock.advance(chrono::Duration::seconds(180));

        assert_eq!(h.engine.sweep_expired().await, 2);
        assert_eq!(h.cache.read(&h.match_id).await.expect("read"), Some(3));
        assert_eq!(h.engine.sweep_expired().await, 0, "sweep is idempotent");
    }

    #[tokio::test]
    async fn unreachable_cache_degrades_to_the_store_path() {
        let match_id = MatchId::random();
        let mut cache = MockStockCache::new();
        cache
            .expect_try_decrement()
            .returning(|_| Err(StockCacheError::unavailable("redis down")));
        cache
            .expect_increment()
            .returning(|_| Err(StockCacheError::unavailable("redis down")));
        cache
            .expect_write()
            .returning(|_, _| Err(StockCacheError::unavailable("redis down")));
        let bookings = Arc::new(FixtureBookingRepository::new());
        let authority = Arc::new(
            FixtureStockAuthority::with_capacities([(match_id, 1)])
                .with_bookings(Arc::clone(&bookings)),
        );
        let clock = Arc::new(ManualClock::starting_now());
        let engine = ReservationEngine::new(
            Arc::new(cache),
            authority,
            bookings,
            clock,
            DEFAULT_RESERVATION_TTL,
        );
        let user = UserId::random();

        engine
            .reserve(&match_id, &user)
            .await
            .expect("store path admits the first unit");
        let err = engine
            .reserve(&match_id, &user)
            .await
            .expect_err("store path must refuse beyond capacity");
        assert_eq!(err, StockError::OutOfStock { match_id });
    }

    #[rstest]
    #[case(3, 3)]
    #[case(5, 2)]
    fn live_holds_ignores_expired_entries(#[case] total: u32, #[case] expired: u32) {
        let h = harness(10);
        let now = h.clock.utc();
        {
            let mut holds = h.engine.lock_holds();
            for i in 0..total {
                let id = ReservationId::random();
                let expires_at = if i < expired {
                    now - chrono::Duration::seconds(1)
                } else {
                    now + chrono::Duration::seconds(60)
                };
                holds.insert(
                    id.as_uuid(),
                    Reservation::new(id, h.user_id, h.match_id, expires_at),
                );
            }
        }
        assert_eq!(h.engine.live_holds(&h.match_id, now), total - expired);
    }
}
