//! User identity primitives.
//!
//! Purpose: strongly typed user identity plus the stored credential hash.
//! Plaintext passwords never appear here; hashing happens behind the
//! [`crate::domain::ports::PasswordHasher`] port and only the opaque hash is
//! retained.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum accepted username length in characters.
pub const USERNAME_MAX_LEN: usize = 64;

/// Minimum accepted username length in characters.
pub const USERNAME_MIN_LEN: usize = 3;

/// Unique user identifier (UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse an identifier from its canonical string form.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, uuid::Error> {
        Uuid::parse_str(raw.as_ref()).map(Self)
    }

    /// Wrap an already-validated UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Underlying UUID for persistence adapters.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validation failures for user fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Username was blank once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Username length falls outside the accepted bounds.
    #[error("username must be between {USERNAME_MIN_LEN} and {USERNAME_MAX_LEN} characters")]
    UsernameLength,
    /// Username contains a character outside `[A-Za-z0-9._-]`.
    #[error("username may only contain letters, digits, '.', '_' and '-'")]
    UsernameCharset,
    /// Credential hash was empty.
    #[error("password hash must not be empty")]
    EmptyPasswordHash,
}

/// Validated username.
///
/// ## Invariants
/// - Trimmed, non-empty, between [`USERNAME_MIN_LEN`] and
///   [`USERNAME_MAX_LEN`] characters.
/// - Restricted to letters, digits, `.`, `_` and `-` so usernames are safe to
///   echo into logs and cache keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and normalise a raw username.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        let len = trimmed.chars().count();
        if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
            return Err(UserValidationError::UsernameLength);
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            return Err(UserValidationError::UsernameCharset);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Username as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque salted one-way credential hash.
///
/// Deliberately does not implement `Display`; the hash is only ever compared
/// through the password-hasher port or written by a persistence adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a hash produced by a password hasher or read from storage.
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(UserValidationError::EmptyPasswordHash);
        }
        Ok(Self(raw))
    }

    /// Hash as a string slice for verification and persistence.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Domain user identity.
///
/// Owns the stored credential hash; cart items and bookings reference the
/// user by [`UserId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    username: Username,
    password_hash: PasswordHash,
}

impl User {
    /// Assemble a user from validated parts.
    pub fn new(id: UserId, username: Username, password_hash: PasswordHash) -> Self {
        Self {
            id,
            username,
            password_hash,
        }
    }

    /// Unique identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Validated username.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Stored credential hash.
    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }
}
