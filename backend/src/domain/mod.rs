//! Domain primitives, services, and ports.
//!
//! Purpose: define the strongly typed entities and the stock-reservation core
//! used by the API and persistence layers. Keep types immutable and document
//! invariants and serialisation contracts (serde) in each type's Rustdoc.
//!
//! Layering: `ports/` holds the hexagonal boundary traits with fixture
//! implementations; the services here ([`ReservationEngine`],
//! [`CheckoutService`], [`AccountService`]) depend only on those ports.

pub mod accounts;
pub mod auth;
pub mod booking;
pub mod cart;
pub mod checkout;
pub mod error;
pub mod example_data;
pub mod matches;
pub mod ports;
pub mod reservation;
pub mod stock;
pub mod user;

pub use self::accounts::AccountService;
pub use self::auth::{
    CredentialValidationError, LoginCredentials, PASSWORD_MIN_LEN, RegistrationCredentials,
};
pub use self::booking::{Booking, BookingId, BookingStatus};
pub use self::cart::{CartItem, CartLine, cart_total};
pub use self::checkout::{CheckoutOutcome, CheckoutService};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::matches::{Match, MatchId, MatchValidationError, Price};
pub use self::reservation::{Reservation, ReservationId};
pub use self::stock::{DEFAULT_RESERVATION_TTL, ReservationEngine, StockError};
pub use self::user::{PasswordHash, User, UserId, UserValidationError, Username};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::unauthorized("login required"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
