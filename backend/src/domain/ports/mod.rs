//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod booking_repository;
mod cart_repository;
mod login_service;
mod match_repository;
mod password_hasher;
mod stock_authority;
mod stock_cache;
mod user_onboarding;
mod user_repository;

pub use booking_repository::{
    BookingRepository, BookingRepositoryError, CancelOutcome, FixtureBookingRepository, NewBooking,
};
#[cfg(test)]
pub use booking_repository::MockBookingRepository;
pub use cart_repository::{CartRepository, CartRepositoryError, FixtureCartRepository};
#[cfg(test)]
pub use cart_repository::MockCartRepository;
pub use login_service::LoginService;
#[cfg(test)]
pub use login_service::MockLoginService;
pub use match_repository::{FixtureMatchRepository, MatchRepository, MatchRepositoryError};
#[cfg(test)]
pub use match_repository::MockMatchRepository;
pub use password_hasher::{FixturePasswordHasher, PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use stock_authority::{
    FixtureStockAuthority, StockAuthority, StockAuthorityError, StockSnapshot,
};
#[cfg(test)]
pub use stock_authority::MockStockAuthority;
pub use stock_cache::{DecrementOutcome, InMemoryStockCache, StockCache, StockCacheError};
#[cfg(test)]
pub use stock_cache::MockStockCache;
pub use user_onboarding::UserOnboarding;
#[cfg(test)]
pub use user_onboarding::MockUserOnboarding;
pub use user_repository::{FixtureUserRepository, UserPersistenceError, UserRepository};
#[cfg(test)]
pub use user_repository::MockUserRepository;
