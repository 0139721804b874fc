//! Port abstraction for the match catalogue.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::matches::{Match, MatchId};

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by match repository adapters.
    pub enum MatchRepositoryError {
        /// Store connection could not be established. Transient.
        Connection { message: String } => "match store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "match store query failed: {message}",
    }
}

/// Port for reading and seeding the match catalogue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// All matches ordered by kick-off.
    async fn list(&self) -> Result<Vec<Match>, MatchRepositoryError>;

    /// Look up one match.
    async fn find(&self, match_id: &MatchId) -> Result<Option<Match>, MatchRepositoryError>;

    /// Insert the given matches only when the catalogue is empty.
    ///
    /// Returns the number of matches inserted (zero when already seeded).
    async fn seed_if_empty(&self, matches: &[Match]) -> Result<u32, MatchRepositoryError>;
}

/// In-memory match repository for tests and fixtures.
#[derive(Debug, Default)]
pub struct FixtureMatchRepository {
    matches: Mutex<Vec<Match>>,
}

impl FixtureMatchRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-loaded with the given matches.
    pub fn with_matches(matches: impl IntoIterator<Item = Match>) -> Self {
        Self {
            matches: Mutex::new(matches.into_iter().collect()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Match>> {
        match self.matches.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl MatchRepository for FixtureMatchRepository {
    async fn list(&self) -> Result<Vec<Match>, MatchRepositoryError> {
        let mut all = self.lock().clone();
        all.sort_by_key(Match::kickoff);
        Ok(all)
    }

    async fn find(&self, match_id: &MatchId) -> Result<Option<Match>, MatchRepositoryError> {
        Ok(self.lock().iter().find(|m| m.id() == match_id).cloned())
    }

    async fn seed_if_empty(&self, matches: &[Match]) -> Result<u32, MatchRepositoryError> {
        let mut stored = self.lock();
        if !stored.is_empty() {
            return Ok(0);
        }
        stored.extend(matches.iter().cloned());
        Ok(matches.len() as u32)
    }
}
