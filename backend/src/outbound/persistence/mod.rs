//! PostgreSQL persistence adapters (Diesel ORM, async pool).

mod diesel_booking_repository;
mod diesel_cart_repository;
mod diesel_error;
mod diesel_match_repository;
mod diesel_stock_authority;
mod diesel_user_repository;
mod models;
pub mod pool;
pub mod schema;

pub use diesel_booking_repository::DieselBookingRepository;
pub use diesel_cart_repository::DieselCartRepository;
pub use diesel_match_repository::DieselMatchRepository;
pub use diesel_stock_authority::DieselStockAuthority;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
