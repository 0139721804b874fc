//! Shared harness for integration tests: fixture-backed state, a manual
//! clock, and seeded matches.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use mockable::Clock;

use backend::domain::accounts::AccountService;
use backend::domain::checkout::CheckoutService;
use backend::domain::matches::{Match, MatchId, Price};
use backend::domain::ports::{
    BookingRepository, CartRepository, FixtureBookingRepository, FixtureCartRepository,
    FixtureMatchRepository, FixturePasswordHasher, FixtureStockAuthority, FixtureUserRepository,
    InMemoryStockCache, MatchRepository, StockAuthority, StockCache,
};
use backend::domain::stock::{DEFAULT_RESERVATION_TTL, ReservationEngine};
use backend::inbound::http::state::AppState;
use chrono::TimeZone;

/// Test clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn starting_now() -> Self {
        Self {
            now: Mutex::new(Utc::now()),
        }
    }

    pub fn advance(&self, delta: chrono::Duration) {
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

/// One match with the given capacity, for reservation tests.
pub fn game(capacity: u32) -> Match {
    Match::new(
        MatchId::random(),
        "Man City",
        "Wolves",
        Utc.with_ymd_and_hms(2026, 1, 24, 22, 0, 0)
            .single()
            .expect("valid fixture timestamp"),
        "Etihad Stadium",
        capacity,
        Price::from_pence(11_000),
    )
    .expect("valid match")
}

/// Fixture-backed engine plus handles to its collaborators.
pub struct EngineHarness {
    pub engine: Arc<ReservationEngine>,
    pub cache: Arc<InMemoryStockCache>,
    pub bookings: Arc<FixtureBookingRepository>,
    pub authority: Arc<FixtureStockAuthority>,
    pub clock: Arc<ManualClock>,
}

/// Build an engine over in-memory fixtures for the given matches.
pub fn engine_harness(matches: &[Match], ttl: Duration) -> EngineHarness {
    let cache = Arc::new(InMemoryStockCache::new());
    let bookings = Arc::new(FixtureBookingRepository::new());
    let authority = Arc::new(
        FixtureStockAuthority::with_capacities(
            matches.iter().map(|game| (*game.id(), game.capacity())),
        )
        .with_bookings(Arc::clone(&bookings)),
    );
    let clock = Arc::new(ManualClock::starting_now());
    let engine = Arc::new(ReservationEngine::new(
        Arc::clone(&cache) as Arc<dyn StockCache>,
        Arc::clone(&authority) as Arc<dyn StockAuthority>,
        Arc::clone(&bookings) as Arc<dyn BookingRepository>,
        Arc::clone(&clock) as Arc<dyn Clock + Send + Sync>,
        ttl,
    ));
    EngineHarness {
        engine,
        cache,
        bookings,
        authority,
        clock,
    }
}

/// Fixture-backed HTTP application state plus fixture handles.
pub struct StateHarness {
    pub state: AppState,
    pub matches: Vec<Match>,
    pub cart: Arc<FixtureCartRepository>,
    pub bookings: Arc<FixtureBookingRepository>,
    pub engine: Arc<ReservationEngine>,
}

/// Build an [`AppState`] over in-memory fixtures for the given matches.
pub fn state_harness(matches: Vec<Match>) -> StateHarness {
    let harness = engine_harness(&matches, DEFAULT_RESERVATION_TTL);
    let match_repo = Arc::new(FixtureMatchRepository::with_matches(matches.clone()));
    let cart = Arc::new(FixtureCartRepository::new());
    let checkout = Arc::new(CheckoutService::new(
        Arc::clone(&harness.engine),
        Arc::clone(&cart) as Arc<dyn CartRepository>,
    ));
    let accounts = Arc::new(AccountService::new(
        Arc::new(FixtureUserRepository::new()),
        Arc::new(FixturePasswordHasher),
    ));

    let state = AppState {
        login: accounts.clone(),
        onboarding: accounts,
        matches: match_repo as Arc<dyn MatchRepository>,
        cart: Arc::clone(&cart) as Arc<dyn CartRepository>,
        bookings: Arc::clone(&harness.bookings) as Arc<dyn BookingRepository>,
        stock: Arc::clone(&harness.engine),
        checkout,
    };
    StateHarness {
        state,
        matches,
        cart,
        bookings: harness.bookings,
        engine: harness.engine,
    }
}
