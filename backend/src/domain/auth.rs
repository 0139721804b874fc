//! Authentication primitives such as login and registration credentials.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.
//! Plaintext passwords are held in zeroizing buffers so they are wiped once
//! the request finishes.

use std::fmt;

use zeroize::Zeroizing;

use crate::domain::user::{UserValidationError, Username};

/// Minimum accepted password length for new registrations.
pub const PASSWORD_MIN_LEN: usize = 8;

/// Domain error returned when credential payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialValidationError {
    /// Username failed validation.
    Username(UserValidationError),
    /// Password was blank.
    EmptyPassword,
    /// Password shorter than [`PASSWORD_MIN_LEN`] characters (registration
    /// only; login accepts whatever the user originally registered with).
    PasswordTooShort,
}

impl fmt::Display for CredentialValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Username(err) => write!(f, "{err}"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort => {
                write!(f, "password must be at least {PASSWORD_MIN_LEN} characters")
            }
        }
    }
}

impl std::error::Error for CredentialValidationError {}

impl From<UserValidationError> for CredentialValidationError {
    fn from(err: UserValidationError) -> Self {
        Self::Username(err)
    }
}

/// Validated login credentials used by the authentication service.
///
/// ## Invariants
/// - `username` satisfies [`Username`] validation.
/// - `password` is non-empty but otherwise unconstrained; it retains
///   caller-provided whitespace to avoid surprising credential comparisons.
#[derive(Clone)]
pub struct LoginCredentials {
    username: Username,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(
        username: &str,
        password: &str,
    ) -> Result<Self, CredentialValidationError> {
        let username = Username::new(username)?;
        if password.is_empty() {
            return Err(CredentialValidationError::EmptyPassword);
        }
        Ok(Self {
            username,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username suitable for user lookups.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Validated registration credentials.
///
/// Applies the password policy on top of [`LoginCredentials`] validation;
/// existing accounts with shorter passwords keep logging in.
#[derive(Clone)]
pub struct RegistrationCredentials {
    inner: LoginCredentials,
}

impl RegistrationCredentials {
    /// Construct and policy-check registration credentials.
    pub fn try_from_parts(
        username: &str,
        password: &str,
    ) -> Result<Self, CredentialValidationError> {
        let inner = LoginCredentials::try_from_parts(username, password)?;
        if inner.password().chars().count() < PASSWORD_MIN_LEN {
            return Err(CredentialValidationError::PasswordTooShort);
        }
        Ok(Self { inner })
    }

    /// Username suitable for user lookups.
    pub fn username(&self) -> &Username {
        self.inner.username()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.inner.password()
    }
}

impl fmt::Debug for RegistrationCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationCredentials")
            .field("username", self.inner.username())
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw123456")]
    #[case("   ", "pw123456")]
    fn blank_usernames_fail(#[case] username: &str, #[case] password: &str) {
        let err = LoginCredentials::try_from_parts(username, password)
            .expect_err("blank username must fail");
        assert!(matches!(err, CredentialValidationError::Username(_)));
    }

    #[test]
    fn empty_password_fails_login_validation() {
        let err = LoginCredentials::try_from_parts("alice", "")
            .expect_err("empty password must fail");
        assert_eq!(err, CredentialValidationError::EmptyPassword);
    }

    #[test]
    fn short_password_fails_registration_only() {
        let err = RegistrationCredentials::try_from_parts("alice", "short")
            .expect_err("short password must fail registration");
        assert_eq!(err, CredentialValidationError::PasswordTooShort);

        LoginCredentials::try_from_parts("alice", "short")
            .expect("login accepts legacy short passwords");
    }

    #[test]
    fn debug_output_redacts_passwords() {
        let creds = LoginCredentials::try_from_parts("alice", "hunter22")
            .expect("valid credentials");
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("hunter22"), "password must not leak: {rendered}");
    }
}
