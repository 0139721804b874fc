//! Port abstraction for cart persistence.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::cart::CartItem;
use crate::domain::matches::MatchId;
use crate::domain::user::UserId;

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by cart repository adapters.
    pub enum CartRepositoryError {
        /// Store connection could not be established. Transient.
        Connection { message: String } => "cart store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "cart store query failed: {message}",
    }
}

/// Port for cart storage.
///
/// Cart contents are unique per user+match; `add` is idempotent.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Add a match to the user's cart. Returns `false` when already present.
    async fn add(&self, user_id: &UserId, match_id: &MatchId)
    -> Result<bool, CartRepositoryError>;

    /// Remove a match from the user's cart. Returns `false` when absent.
    async fn remove(
        &self,
        user_id: &UserId,
        match_id: &MatchId,
    ) -> Result<bool, CartRepositoryError>;

    /// Cart items belonging to a user, oldest first.
    async fn items_for_user(&self, user_id: &UserId)
    -> Result<Vec<CartItem>, CartRepositoryError>;

    /// Drop every item in the user's cart. Returns the number removed.
    async fn clear(&self, user_id: &UserId) -> Result<u32, CartRepositoryError>;
}

/// In-memory cart repository for tests and fixtures.
#[derive(Debug, Default)]
pub struct FixtureCartRepository {
    items: Mutex<Vec<CartItem>>,
}

impl FixtureCartRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<CartItem>> {
        match self.items.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl CartRepository for FixtureCartRepository {
    async fn add(
        &self,
        user_id: &UserId,
        match_id: &MatchId,
    ) -> Result<bool, CartRepositoryError> {
        let mut items = self.lock();
        if items
            .iter()
            .any(|item| item.user_id() == user_id && item.match_id() == match_id)
        {
            return Ok(false);
        }
        items.push(CartItem::new(Uuid::new_v4(), *user_id, *match_id, Utc::now()));
        Ok(true)
    }

    async fn remove(
        &self,
        user_id: &UserId,
        match_id: &MatchId,
    ) -> Result<bool, CartRepositoryError> {
        let mut items = self.lock();
        let before = items.len();
        items.retain(|item| !(item.user_id() == user_id && item.match_id() == match_id));
        Ok(items.len() < before)
    }

    async fn items_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<CartItem>, CartRepositoryError> {
        let mut owned: Vec<CartItem> = self
            .lock()
            .iter()
            .filter(|item| item.user_id() == user_id)
            .cloned()
            .collect();
        owned.sort_by_key(CartItem::added_at);
        Ok(owned)
    }

    async fn clear(&self, user_id: &UserId) -> Result<u32, CartRepositoryError> {
        let mut items = self.lock();
        let before = items.len();
        items.retain(|item| item.user_id() != user_id);
        Ok((before - items.len()) as u32)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[tokio::test]
    async fn add_is_idempotent_per_user_and_match() {
        let repo = FixtureCartRepository::new();
        let user = UserId::random();
        let game = MatchId::random();

        assert!(repo.add(&user, &game).await.expect("add"));
        assert!(!repo.add(&user, &game).await.expect("repeat add"));
        assert_eq!(repo.items_for_user(&user).await.expect("items").len(), 1);

        let other = UserId::random();
        assert!(repo.add(&other, &game).await.expect("other user add"));
    }

    #[tokio::test]
    async fn clear_only_touches_the_given_user() {
        let repo = FixtureCartRepository::new();
        let alice = UserId::random();
        let bob = UserId::random();
        let game = MatchId::random();
        repo.add(&alice, &game).await.expect("add");
        repo.add(&bob, &game).await.expect("add");

        assert_eq!(repo.clear(&alice).await.expect("clear"), 1);
        assert!(repo.items_for_user(&alice).await.expect("items").is_empty());
        assert_eq!(repo.items_for_user(&bob).await.expect("items").len(), 1);
    }
}
