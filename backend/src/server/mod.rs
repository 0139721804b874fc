//! Server assembly: adapter wiring, migrations, and route registration.

pub mod config;

use std::sync::Arc;

use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::HttpServiceFactory;
use actix_web::web;
use diesel_migrations::{EmbeddedMigrations, embed_migrations};
use mockable::DefaultClock;
use tracing::{info, warn};

use crate::domain::accounts::AccountService;
use crate::domain::checkout::CheckoutService;
use crate::domain::example_data::premier_league_fixtures;
use crate::domain::ports::{
    BookingRepository, CartRepository, MatchRepository, StockCache, UserRepository,
};
use crate::domain::stock::ReservationEngine;
use crate::inbound::http::state::AppState;
use crate::inbound::http::{cart, checkout, matches, tickets, users};
use crate::outbound::cache::RedisStockCache;
use crate::outbound::persistence::{
    DbPool, DieselBookingRepository, DieselCartRepository, DieselMatchRepository,
    DieselStockAuthority, DieselUserRepository, PoolConfig,
};
use crate::outbound::security::BcryptPasswordHasher;

use self::config::AppConfig;

/// Embedded Diesel migrations, applied at bootstrap.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Bootstrap failures that prevent the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// Database pool construction failed.
    #[error("database pool: {0}")]
    Pool(String),
    /// Schema migration failed.
    #[error("migrations: {0}")]
    Migrations(String),
    /// Redis cache client construction failed.
    #[error("stock cache: {0}")]
    Cache(String),
    /// Seed data could not be assembled or written.
    #[error("seed data: {0}")]
    Seed(String),
}

/// Run pending migrations against the database.
///
/// Diesel's migration harness is synchronous, so this borrows a blocking
/// thread rather than stalling a runtime worker.
pub async fn run_migrations(database_url: &str) -> Result<(), BootstrapError> {
    let url = database_url.to_owned();
    tokio::task::spawn_blocking(move || {
        use diesel::Connection;
        use diesel_migrations::MigrationHarness;

        let mut conn = diesel::PgConnection::establish(&url)
            .map_err(|err| BootstrapError::Migrations(err.to_string()))?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|err| BootstrapError::Migrations(err.to_string()))?;
        Ok(())
    })
    .await
    .map_err(|err| BootstrapError::Migrations(err.to_string()))?
}

/// Wire production adapters into the handler state and warm the counters.
pub async fn build_state(config: &AppConfig) -> Result<AppState, BootstrapError> {
    run_migrations(&config.database_url).await?;

    let pool = DbPool::build(PoolConfig::new(&config.database_url))
        .await
        .map_err(|err| BootstrapError::Pool(err.to_string()))?;

    let matches: Arc<dyn MatchRepository> = Arc::new(DieselMatchRepository::new(pool.clone()));
    let cart: Arc<dyn CartRepository> = Arc::new(DieselCartRepository::new(pool.clone()));
    let bookings: Arc<dyn BookingRepository> =
        Arc::new(DieselBookingRepository::new(pool.clone()));
    let users_repo: Arc<dyn UserRepository> = Arc::new(DieselUserRepository::new(pool.clone()));
    let authority = Arc::new(DieselStockAuthority::new(pool));

    let cache: Arc<dyn StockCache> = Arc::new(
        RedisStockCache::connect(&config.redis_url, 10)
            .await
            .map_err(|err| BootstrapError::Cache(err.to_string()))?,
    );

    let engine = Arc::new(ReservationEngine::new(
        Arc::clone(&cache),
        authority,
        Arc::clone(&bookings),
        Arc::new(DefaultClock),
        config.reservation_ttl,
    ));

    let seed = premier_league_fixtures().map_err(|err| BootstrapError::Seed(err.to_string()))?;
    let inserted = matches
        .seed_if_empty(&seed)
        .await
        .map_err(|err| BootstrapError::Seed(err.to_string()))?;
    if inserted > 0 {
        info!(matches = inserted, "seeded example matchday");
    }
    // Warm the counters; the engine heals lazily if any of this fails.
    for game in &seed {
        if let Err(err) = engine.reconcile(game.id()).await {
            warn!(match_id = %game.id(), error = %err, "counter warm-up skipped");
        }
    }

    let accounts = Arc::new(AccountService::new(
        users_repo,
        Arc::new(BcryptPasswordHasher::new()),
    ));
    let checkout_service = Arc::new(CheckoutService::new(Arc::clone(&engine), Arc::clone(&cart)));

    Ok(AppState {
        login: accounts.clone(),
        onboarding: accounts,
        matches,
        cart,
        bookings,
        stock: engine,
        checkout: checkout_service,
    })
}

/// Session middleware over the signed cookie store.
pub fn session_middleware(
    key: Key,
    cookie_secure: bool,
) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_same_site(SameSite::Lax)
        .build()
}

/// The `/api/v1` scope with session middleware and every API handler.
pub fn api_scope(state: AppState, key: Key, cookie_secure: bool) -> impl HttpServiceFactory {
    web::scope("/api/v1")
        .app_data(web::Data::new(state))
        .wrap(session_middleware(key, cookie_secure))
        .service(users::register)
        .service(users::login)
        .service(users::logout)
        .service(matches::list_matches)
        .service(cart::view_cart)
        .service(cart::add_to_cart)
        .service(cart::remove_from_cart)
        .service(checkout::checkout)
        .service(tickets::list_tickets)
        .service(tickets::cancel_ticket)
        .service(tickets::validate_ticket)
}
