//! Port abstraction for durable user persistence.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::user::{User, UserId, Username};

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Store connection could not be established. Transient.
        Connection { message: String } => "user store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user store query failed: {message}",
        /// Another account already owns this username.
        DuplicateUsername { username: String } => "username already taken: {username}",
    }
}

/// Port for user storage and lookup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user; a taken username yields `DuplicateUsername`.
    async fn create(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Look up a user by username.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Look up a user by id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;
}

/// In-memory user repository for tests and fixtures.
#[derive(Debug, Default)]
pub struct FixtureUserRepository {
    users: Mutex<HashMap<String, User>>,
}

impl FixtureUserRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, User>> {
        match self.users.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn create(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut users = self.lock();
        let key = user.username().as_str().to_owned();
        if users.contains_key(&key) {
            return Err(UserPersistenceError::duplicate_username(key));
        }
        users.insert(key, user.clone());
        Ok(())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock().get(username.as_str()).cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock().values().find(|u| u.id() == id).cloned())
    }
}
