//! Account services implementing the login and onboarding driving ports.
//!
//! Credential checks are constant-shaped: an unknown username performs a
//! dummy hash verification and returns the same error as a wrong password, so
//! neither the response body nor its timing reveals which usernames exist.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::auth::{LoginCredentials, RegistrationCredentials};
use crate::domain::error::Error;
use crate::domain::ports::{
    LoginService, PasswordHasher, UserOnboarding, UserPersistenceError, UserRepository,
};
use crate::domain::user::{PasswordHash, User, UserId};

/// Error body shared by every authentication rejection.
const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Error body shared by every registration rejection that could otherwise
/// confirm a username exists.
const REGISTRATION_FAILED: &str = "registration failed";

/// Well-formed bcrypt hash used to equalise work on unknown-username logins.
const DUMMY_HASH: &str = "$2b$12$R9h/cIPz0gi.URNNX3kh2OPST9/PgBkqquzi.Ss7KIUgO2t0jWMUW";

fn map_user_error(err: UserPersistenceError) -> Error {
    match err {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user store unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user store error: {message}"))
        }
        UserPersistenceError::DuplicateUsername { .. } => {
            Error::invalid_request(REGISTRATION_FAILED)
        }
    }
}

/// User account service backed by a repository and a password hasher.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl AccountService {
    /// Build an account service over the given adapters.
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    async fn equalise_unknown_username_work(&self, password: &str) {
        if let Ok(hash) = PasswordHash::new(DUMMY_HASH) {
            // Outcome and errors are deliberately ignored.
            let _ = self.hasher.verify(password, &hash).await;
        }
    }
}

#[async_trait]
impl LoginService for AccountService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let user = self
            .users
            .find_by_username(credentials.username())
            .await
            .map_err(map_user_error)?;

        let Some(user) = user else {
            self.equalise_unknown_username_work(credentials.password()).await;
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let matches = self
            .hasher
            .verify(credentials.password(), user.password_hash())
            .await
            .map_err(|err| Error::internal(format!("credential verification failed: {err}")))?;
        if matches {
            Ok(*user.id())
        } else {
            Err(Error::unauthorized(INVALID_CREDENTIALS))
        }
    }
}

#[async_trait]
impl UserOnboarding for AccountService {
    async fn register(&self, credentials: &RegistrationCredentials) -> Result<UserId, Error> {
        let hash = self
            .hasher
            .hash(credentials.password())
            .await
            .map_err(|err| Error::internal(format!("credential hashing failed: {err}")))?;
        let user = User::new(UserId::random(), credentials.username().clone(), hash);
        self.users.create(&user).await.map_err(map_user_error)?;
        Ok(*user.id())
    }
}
