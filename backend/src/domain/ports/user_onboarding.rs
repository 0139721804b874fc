//! Driving port for account registration use-cases.

use async_trait::async_trait;

use crate::domain::auth::RegistrationCredentials;
use crate::domain::error::Error;
use crate::domain::user::UserId;

/// Domain use-case port for registering a new account.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserOnboarding: Send + Sync {
    /// Create an account and return the new user id.
    ///
    /// A taken username produces the same generic `invalid_request` failure
    /// as any other rejection so responses never confirm which usernames
    /// exist.
    async fn register(&self, credentials: &RegistrationCredentials) -> Result<UserId, Error>;
}
