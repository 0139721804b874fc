//! Checkout orchestration: all-or-nothing conversion of a cart into bookings.
//!
//! Drives cart items through the reservation engine. Either every item in the
//! cart becomes a PAID booking, or none do and every reservation acquired
//! during the attempt is released before control returns to the caller.

use std::sync::Arc;

use tracing::warn;

use crate::domain::booking::Booking;
use crate::domain::error::Error;
use crate::domain::matches::MatchId;
use crate::domain::ports::{CartRepository, CartRepositoryError};
use crate::domain::reservation::ReservationId;
use crate::domain::stock::{ReservationEngine, StockError};
use crate::domain::user::UserId;

/// Machine-readable checkout result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Every cart item was booked; the cart has been cleared.
    Completed {
        /// The bookings created by this checkout, in cart order.
        bookings: Vec<Booking>,
    },
    /// The cart was empty; nothing happened.
    EmptyCart,
    /// At least one match had no stock. No booking was created and no stock
    /// was consumed.
    OutOfStock {
        /// The sold-out matches, in cart order.
        match_ids: Vec<MatchId>,
    },
}

fn map_cart_error(err: CartRepositoryError) -> Error {
    match err {
        CartRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("cart store unavailable: {message}"))
        }
        CartRepositoryError::Query { message } => {
            Error::internal(format!("cart store error: {message}"))
        }
    }
}

/// Orchestrates checkout across the cart, the reservation engine, and the
/// booking store.
pub struct CheckoutService {
    engine: Arc<ReservationEngine>,
    cart: Arc<dyn CartRepository>,
}

impl CheckoutService {
    /// Build a checkout service over the engine and cart store.
    pub fn new(engine: Arc<ReservationEngine>, cart: Arc<dyn CartRepository>) -> Self {
        Self { engine, cart }
    }

    /// Check out the user's cart.
    ///
    /// Reserves one unit per cart item; if any item is sold out, releases
    /// everything acquired in this attempt and reports the sold-out matches.
    /// Otherwise confirms all reservations inside one durable transaction
    /// and clears the cart only after every confirmation has persisted.
    pub async fn checkout(&self, user_id: &UserId) -> Result<CheckoutOutcome, Error> {
        let items = self
            .cart
            .items_for_user(user_id)
            .await
            .map_err(map_cart_error)?;
        if items.is_empty() {
            return Ok(CheckoutOutcome::EmptyCart);
        }

        let mut acquired: Vec<ReservationId> = Vec::with_capacity(items.len());
        let mut sold_out: Vec<MatchId> = Vec::new();
        for item in &items {
            match self.engine.reserve(item.match_id(), user_id).await {
                Ok(reservation_id) => acquired.push(reservation_id),
                Err(StockError::OutOfStock { match_id }) => sold_out.push(match_id),
                Err(err) => {
                    // Infra fault mid-reserve: hand back everything we hold.
                    self.release_all(&acquired).await;
                    return Err(Error::from(err));
                }
            }
        }

        if !sold_out.is_empty() {
            self.release_all(&acquired).await;
            return Ok(CheckoutOutcome::OutOfStock { match_ids: sold_out });
        }

        match self.engine.confirm_all(&acquired).await {
            Ok(bookings) => {
                if let Err(err) = self.cart.clear(user_id).await {
                    // The purchase stands; a stale cart is cosmetic and the
                    // user can clear it manually.
                    warn!(%user_id, error = %err, "cart clear failed after checkout");
                }
                Ok(CheckoutOutcome::Completed { bookings })
            }
            Err(err) => {
                self.release_all(&acquired).await;
                Err(Error::from(err))
            }
        }
    }

    async fn release_all(&self, reservations: &[ReservationId]) {
        for reservation_id in reservations {
            if let Err(err) = self.engine.release(reservation_id).await {
                warn!(%reservation_id, error = %err, "release during checkout unwind failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the checkout orchestrator.
    use mockable::DefaultClock;

    use super::*;
    use crate::domain::matches::{Match, Price};
    use crate::domain::ports::{
        BookingRepository, FixtureBookingRepository, FixtureCartRepository,
        FixtureStockAuthority, InMemoryStockCache, StockCache,
    };
    use crate::domain::stock::DEFAULT_RESERVATION_TTL;
    use chrono::{TimeZone, Utc};

    struct Harness {
        service: CheckoutService,
        engine: Arc<ReservationEngine>,
        cart: Arc<FixtureCartRepository>,
        bookings: Arc<FixtureBookingRepository>,
        user_id: UserId,
    }

    fn game(capacity: u32) -> Match {
        Match::new(
            MatchId::random(),
            "Burnley",
            "Tottenham",
            Utc.with_ymd_and_hms(2026, 1, 24, 22, 0, 0)
                .single()
                .expect("valid fixture timestamp"),
            "Turf Moor",
            capacity,
            Price::from_pence(9_500),
        )
        .expect("valid match")
    }

    fn harness(capacities: &[(MatchId, u32)]) -> Harness {
        let cache = Arc::new(InMemoryStockCache::new());
        let bookings = Arc::new(FixtureBookingRepository::new());
        let authority = Arc::new(
            FixtureStockAuthority::with_capacities(capacities.iter().copied())
                .with_bookings(Arc::clone(&bookings)),
        );
        let engine = Arc::new(ReservationEngine::new(
            Arc::clone(&cache) as Arc<dyn StockCache>,
            authority,
            Arc::clone(&bookings) as Arc<dyn BookingRepository>,
            Arc::new(DefaultClock),
            DEFAULT_RESERVATION_TTL,
        ));
        let cart = Arc::new(FixtureCartRepository::new());
        Harness {
            service: CheckoutService::new(Arc::clone(&engine), Arc::clone(&cart) as Arc<dyn CartRepository>),
            engine,
            cart,
            bookings,
            user_id: UserId::random(),
        }
    }

    #[tokio::test]
    async fn empty_cart_short_circuits() {
        let h = harness(&[]);
        let outcome = h.service.checkout(&h.user_id).await.expect("checkout");
        assert_eq!(outcome, CheckoutOutcome::EmptyCart);
    }

    #[tokio::test]
    async fn full_cart_books_everything_and_clears() {
        let a = game(3);
        let b = game(2);
        let h = harness(&[(*a.id(), a.capacity()), (*b.id(), b.capacity())]);
        h.cart.add(&h.user_id, a.id()).await.expect("add");
        h.cart.add(&h.user_id, b.id()).await.expect("add");

        let outcome = h.service.checkout(&h.user_id).await.expect("checkout");
        let CheckoutOutcome::Completed { bookings } = outcome else {
            panic!("expected completion, got {outcome:?}");
        };
        assert_eq!(bookings.len(), 2);
        assert!(h.cart.items_for_user(&h.user_id).await.expect("items").is_empty());
        assert_eq!(h.engine.remaining(a.id()).await.expect("remaining"), 2);
        assert_eq!(h.engine.remaining(b.id()).await.expect("remaining"), 1);
    }

    #[tokio::test]
    async fn sold_out_item_aborts_the_whole_cart() {
        let available = game(3);
        let gone = game(0);
        let h = harness(&[
            (*available.id(), available.capacity()),
            (*gone.id(), gone.capacity()),
        ]);
        h.cart.add(&h.user_id, available.id()).await.expect("add");
        h.cart.add(&h.user_id, gone.id()).await.expect("add");

        let before = h.engine.remaining(available.id()).await.expect("remaining");
        let outcome = h.service.checkout(&h.user_id).await.expect("checkout");
        assert_eq!(
            outcome,
            CheckoutOutcome::OutOfStock { match_ids: vec![*gone.id()] }
        );
        assert_eq!(
            h.bookings.paid_count(available.id()).await.expect("count"),
            0,
            "no booking may be created for the available match"
        );
        assert_eq!(
            h.engine.remaining(available.id()).await.expect("remaining"),
            before,
            "the available match's stock must be unchanged"
        );
        assert_eq!(
            h.cart.items_for_user(&h.user_id).await.expect("items").len(),
            2,
            "a failed checkout leaves the cart intact"
        );
    }

    #[tokio::test]
    async fn store_failure_during_confirm_releases_every_hold() {
        let a = game(2);
        let h = harness(&[(*a.id(), a.capacity())]);
        h.cart.add(&h.user_id, a.id()).await.expect("add");

        h.bookings.set_fail_creates(true);
        let err = h
            .service
            .checkout(&h.user_id)
            .await
            .expect_err("store failure must surface");
        assert_eq!(err.code(), crate::domain::error::ErrorCode::ServiceUnavailable);

        h.bookings.set_fail_creates(false);
        assert_eq!(
            h.engine.remaining(a.id()).await.expect("remaining"),
            2,
            "released holds must restore the counter"
        );
        assert_eq!(h.bookings.paid_count(a.id()).await.expect("count"), 0);
    }
}
