//! Port abstraction for one-way credential hashing.
//!
//! Keeps the hashing algorithm out of the domain: the account service only
//! sees "hash this" and "does this password match this hash". The production
//! adapter is bcrypt; the fixture uses a reversible marker scheme that tests
//! can read.

use async_trait::async_trait;

use crate::domain::user::{PasswordHash, UserValidationError};

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by password hasher adapters.
    pub enum PasswordHasherError {
        /// Hashing or verification failed inside the adapter.
        Hashing { message: String } => "credential hashing failed: {message}",
    }
}

/// Port for salted one-way credential hashing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Produce a salted hash of the plaintext password.
    async fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError>;

    /// Compare a plaintext password against a stored hash.
    async fn verify(
        &self,
        password: &str,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHasherError>;
}

/// Fixture hasher with a transparent `plain:` scheme.
///
/// Never use outside tests; it exists so unit tests can assert on stored
/// hashes without paying bcrypt's deliberately slow work factor.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePasswordHasher;

#[async_trait]
impl PasswordHasher for FixturePasswordHasher {
    async fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError> {
        PasswordHash::new(format!("plain:{password}"))
            .map_err(|err: UserValidationError| PasswordHasherError::hashing(err.to_string()))
    }

    async fn verify(
        &self,
        password: &str,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHasherError> {
        Ok(hash.as_str() == format!("plain:{password}"))
    }
}
