//! Shared helpers for HTTP handler tests.

use std::sync::Arc;

use actix_http::Request;
use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::test;
use mockable::DefaultClock;
use serde_json::json;

use crate::domain::accounts::AccountService;
use crate::domain::checkout::CheckoutService;
use crate::domain::example_data::premier_league_fixtures;
use crate::domain::matches::Match;
use crate::domain::ports::{
    BookingRepository, CartRepository, FixtureBookingRepository, FixtureCartRepository,
    FixtureMatchRepository, FixturePasswordHasher, FixtureStockAuthority, FixtureUserRepository,
    InMemoryStockCache, MatchRepository, StockCache,
};
use crate::domain::stock::{DEFAULT_RESERVATION_TTL, ReservationEngine};
use crate::inbound::http::state::AppState;

/// Session middleware with an ephemeral key and lax cookies, for tests only.
pub(crate) fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(false)
        .cookie_http_only(true)
        .cookie_same_site(SameSite::Lax)
        .build()
}

/// Fixture-backed application state plus handles to poke the fixtures.
pub(crate) struct TestHarness {
    pub state: AppState,
    pub matches: Vec<Match>,
    pub bookings: Arc<FixtureBookingRepository>,
}

/// Build an [`AppState`] over in-memory fixtures seeded with the example
/// matchday.
pub(crate) fn harness() -> TestHarness {
    let fixtures = premier_league_fixtures().expect("valid fixtures");
    let matches = Arc::new(FixtureMatchRepository::with_matches(fixtures.clone()));
    let cart = Arc::new(FixtureCartRepository::new());
    let bookings = Arc::new(FixtureBookingRepository::new());
    let cache = Arc::new(InMemoryStockCache::new());
    let authority = Arc::new(
        FixtureStockAuthority::with_capacities(
            fixtures.iter().map(|game| (*game.id(), game.capacity())),
        )
        .with_bookings(Arc::clone(&bookings)),
    );
    let engine = Arc::new(ReservationEngine::new(
        Arc::clone(&cache) as Arc<dyn StockCache>,
        authority,
        Arc::clone(&bookings) as Arc<dyn BookingRepository>,
        Arc::new(DefaultClock),
        DEFAULT_RESERVATION_TTL,
    ));
    let checkout = Arc::new(CheckoutService::new(
        Arc::clone(&engine),
        Arc::clone(&cart) as Arc<dyn CartRepository>,
    ));
    let accounts = Arc::new(AccountService::new(
        Arc::new(FixtureUserRepository::new()),
        Arc::new(FixturePasswordHasher),
    ));

    let state = AppState {
        login: accounts.clone(),
        onboarding: accounts,
        matches: Arc::clone(&matches) as Arc<dyn MatchRepository>,
        cart: Arc::clone(&cart) as Arc<dyn CartRepository>,
        bookings: Arc::clone(&bookings) as Arc<dyn BookingRepository>,
        stock: Arc::clone(&engine),
        checkout,
    };
    TestHarness {
        state,
        matches: fixtures,
        bookings,
    }
}

/// Register and log in through the app under test, returning the session
/// cookie. The app must serve `/register` and `/login`.
pub(crate) async fn logged_in_cookie<S, B>(
    app: &S,
    username: &str,
    password: &str,
) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
{
    let register = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    let _ = test::call_service(app, register).await;

    let login = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    let res = test::call_service(app, login).await;
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("login must set the session cookie")
        .into_owned()
}
