//! Credential hashing adapter.
//!
//! Implements the `PasswordHasher` port with bcrypt. Hashing and verification
//! are deliberately slow, so both run on the blocking thread pool rather than
//! a runtime worker.

use async_trait::async_trait;

use crate::domain::ports::{PasswordHasher, PasswordHasherError};
use crate::domain::user::PasswordHash;

fn hashing_error(err: impl std::fmt::Display) -> PasswordHasherError {
    PasswordHasherError::hashing(err.to_string())
}

/// Bcrypt implementation of the `PasswordHasher` port.
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl BcryptPasswordHasher {
    /// Hasher with the library's default work factor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hasher with an explicit work factor. Lower costs are for tests only.
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError> {
        let password = password.to_owned();
        let cost = self.cost;
        let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(hashing_error)?
            .map_err(hashing_error)?;
        PasswordHash::new(hashed).map_err(hashing_error)
    }

    async fn verify(
        &self,
        password: &str,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHasherError> {
        let password = password.to_owned();
        let hash = hash.as_str().to_owned();
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(hashing_error)?
            .map_err(hashing_error)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    const TEST_COST: u32 = 4;

    #[tokio::test]
    async fn hash_and_verify_round_trip() {
        let hasher = BcryptPasswordHasher::with_cost(TEST_COST);
        let hash = hasher.hash("correct horse").await.expect("hash");
        assert!(hasher.verify("correct horse", &hash).await.expect("verify"));
        assert!(!hasher.verify("wrong", &hash).await.expect("verify"));
    }

    #[tokio::test]
    async fn hashes_are_salted() {
        let hasher = BcryptPasswordHasher::with_cost(TEST_COST);
        let first = hasher.hash("correct horse").await.expect("hash");
        let second = hasher.hash("correct horse").await.expect("hash");
        assert_ne!(first, second, "bcrypt output must embed a fresh salt");
    }
}
