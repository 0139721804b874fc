//! Port abstraction for durable booking persistence.
//!
//! `create_paid` is the transactional heart of checkout: every booking in the
//! batch persists or none do. Adapters must run the batch inside a single
//! durable-store transaction.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::booking::{Booking, BookingId, BookingStatus};
use crate::domain::matches::MatchId;
use crate::domain::user::UserId;

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by booking repository adapters.
    pub enum BookingRepositoryError {
        /// Store connection could not be established. Transient.
        Connection { message: String } => "booking store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "booking store query failed: {message}",
    }
}

/// Booking fields supplied by the caller; the adapter assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    /// Purchasing user.
    pub user_id: UserId,
    /// Booked match.
    pub match_id: MatchId,
    /// Purchase instant.
    pub booked_at: DateTime<Utc>,
}

/// Result of a cancellation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The booking transitioned PAID → CANCELLED.
    Cancelled {
        /// Match whose stock should be reconciled.
        match_id: MatchId,
    },
    /// No booking with this id belongs to the caller.
    NotFound,
    /// The booking was already cancelled; nothing changed.
    AlreadyCancelled,
}

/// Port for booking storage and retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Persist a batch of PAID bookings inside one transaction.
    ///
    /// All-or-nothing: a failure anywhere in the batch leaves no rows behind.
    async fn create_paid(
        &self,
        bookings: &[NewBooking],
    ) -> Result<Vec<Booking>, BookingRepositoryError>;

    /// Bookings belonging to a user, newest first.
    async fn list_for_user(&self, user_id: &UserId)
    -> Result<Vec<Booking>, BookingRepositoryError>;

    /// Look up one booking, scoped to its owner.
    async fn find_for_user(
        &self,
        booking_id: &BookingId,
        user_id: &UserId,
    ) -> Result<Option<Booking>, BookingRepositoryError>;

    /// Count PAID bookings for a match.
    async fn paid_count(&self, match_id: &MatchId) -> Result<u64, BookingRepositoryError>;

    /// Transition a booking the caller owns from PAID to CANCELLED.
    async fn cancel(
        &self,
        booking_id: &BookingId,
        user_id: &UserId,
    ) -> Result<CancelOutcome, BookingRepositoryError>;
}

/// In-memory booking repository for tests and fixtures.
///
/// Batch creation honours the all-or-nothing contract, and a failure toggle
/// lets tests simulate the durable store dropping mid-checkout.
#[derive(Debug, Default)]
pub struct FixtureBookingRepository {
    bookings: Mutex<Vec<Booking>>,
    fail_creates: AtomicBool,
}

impl FixtureBookingRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `create_paid` calls fail with a connection error.
    pub fn set_fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Booking>> {
        match self.bookings.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Synchronous PAID count, shared with the fixture stock authority.
    pub(crate) fn paid_count_sync(&self, match_id: &MatchId) -> u64 {
        self.lock()
            .iter()
            .filter(|b| b.match_id() == match_id && b.status() == BookingStatus::Paid)
            .count() as u64
    }
}

#[async_trait]
impl BookingRepository for FixtureBookingRepository {
    async fn create_paid(
        &self,
        bookings: &[NewBooking],
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(BookingRepositoryError::connection("booking store offline"));
        }
        let created: Vec<Booking> = bookings
            .iter()
            .map(|new| {
                Booking::new(
                    BookingId::random(),
                    new.user_id,
                    new.match_id,
                    new.booked_at,
                    BookingStatus::Paid,
                )
            })
            .collect();
        self.lock().extend(created.iter().cloned());
        Ok(created)
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        let mut owned: Vec<Booking> = self
            .lock()
            .iter()
            .filter(|b| b.user_id() == user_id)
            .cloned()
            .collect();
        owned.sort_by_key(|b| std::cmp::Reverse(b.booked_at()));
        Ok(owned)
    }

    async fn find_for_user(
        &self,
        booking_id: &BookingId,
        user_id: &UserId,
    ) -> Result<Option<Booking>, BookingRepositoryError> {
        Ok(self
            .lock()
            .iter()
            .find(|b| b.id() == booking_id && b.user_id() == user_id)
            .cloned())
    }

    async fn paid_count(&self, match_id: &MatchId) -> Result<u64, BookingRepositoryError> {
        Ok(self.paid_count_sync(match_id))
    }

    async fn cancel(
        &self,
        booking_id: &BookingId,
        user_id: &UserId,
    ) -> Result<CancelOutcome, BookingRepositoryError> {
        let mut bookings = self.lock();
        let Some(position) = bookings
            .iter()
            .position(|b| b.id() == booking_id && b.user_id() == user_id)
        else {
            return Ok(CancelOutcome::NotFound);
        };
        let existing = &bookings[position];
        if existing.status() == BookingStatus::Cancelled {
            return Ok(CancelOutcome::AlreadyCancelled);
        }
        let match_id = *existing.match_id();
        let cancelled = Booking::new(
            *existing.id(),
            *existing.user_id(),
            match_id,
            existing.booked_at(),
            BookingStatus::Cancelled,
        );
        bookings[position] = cancelled;
        Ok(CancelOutcome::Cancelled { match_id })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    fn new_booking(user_id: UserId, match_id: MatchId) -> NewBooking {
        NewBooking {
            user_id,
            match_id,
            booked_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_paid_is_all_or_nothing_under_failure() {
        let repo = FixtureBookingRepository::new();
        let user = UserId::random();
        let game = MatchId::random();

        repo.set_fail_creates(true);
        repo.create_paid(&[new_booking(user, game)])
            .await
            .expect_err("failure toggle must surface");
        assert_eq!(repo.paid_count(&game).await.expect("count"), 0);

        repo.set_fail_creates(false);
        repo.create_paid(&[new_booking(user, game), new_booking(user, game)])
            .await
            .expect("batch persists");
        assert_eq!(repo.paid_count(&game).await.expect("count"), 2);
    }

    #[tokio::test]
    async fn cancel_transitions_only_paid_bookings() {
        let repo = FixtureBookingRepository::new();
        let user = UserId::random();
        let game = MatchId::random();
        let created = repo
            .create_paid(&[new_booking(user, game)])
            .await
            .expect("booking persists");
        let id = *created[0].id();

        assert_eq!(
            repo.cancel(&id, &user).await.expect("cancel"),
            CancelOutcome::Cancelled { match_id: game }
        );
        assert_eq!(
            repo.cancel(&id, &user).await.expect("cancel"),
            CancelOutcome::AlreadyCancelled
        );
        assert_eq!(repo.paid_count(&game).await.expect("count"), 0);

        let other = UserId::random();
        assert_eq!(
            repo.cancel(&id, &other).await.expect("cancel"),
            CancelOutcome::NotFound,
            "cancel is scoped to the owner"
        );
    }
}
