//! Reservation engine properties under concurrency and expiry.
//!
//! These tests pin the engine's contract: a match with capacity C admits at
//! most C concurrent reservations, releases are idempotent, and
//! reconciliation always recomputes `capacity − PAID − live holds`.

mod support;

use std::sync::Arc;
use std::time::Duration;

use backend::domain::UserId;
use backend::domain::ports::StockCache as _;
use backend::domain::stock::{DEFAULT_RESERVATION_TTL, StockError};

use support::{engine_harness, game};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reserves_admit_exactly_the_capacity() {
    const CAPACITY: u32 = 5;
    const REQUESTERS: usize = 24;

    let game = game(CAPACITY);
    let h = engine_harness(std::slice::from_ref(&game), DEFAULT_RESERVATION_TTL);
    let match_id = *game.id();

    let mut tasks = Vec::with_capacity(REQUESTERS);
    for _ in 0..REQUESTERS {
        let engine = Arc::clone(&h.engine);
        tasks.push(tokio::spawn(async move {
            let user = UserId::random();
            engine.reserve(&match_id, &user).await
        }));
    }

    let mut admitted = 0_u32;
    let mut refused = 0_u32;
    for task in tasks {
        match task.await.expect("task completes") {
            Ok(_) => admitted += 1,
            Err(StockError::OutOfStock { .. }) => refused += 1,
            Err(other) => panic!("unexpected reserve failure: {other}"),
        }
    }

    assert_eq!(admitted, CAPACITY, "exactly capacity requesters may win");
    assert_eq!(refused, REQUESTERS as u32 - CAPACITY);
    assert_eq!(
        h.cache.read(&match_id).await.expect("cache read"),
        Some(0),
        "the counter must bottom out at zero, never below"
    );
}

#[tokio::test]
async fn release_is_idempotent_through_the_public_api() {
    let game = game(2);
    let h = engine_harness(std::slice::from_ref(&game), DEFAULT_RESERVATION_TTL);
    let user = UserId::random();

    let reservation = h.engine.reserve(game.id(), &user).await.expect("reserve");
    h.engine.release(&reservation).await.expect("first release");
    h.engine.release(&reservation).await.expect("second release");

    assert_eq!(
        h.engine.remaining(game.id()).await.expect("remaining"),
        2,
        "double release must not mint stock"
    );
}

#[tokio::test]
async fn reconcile_recomputes_from_paid_and_live_holds() {
    let game = game(10);
    let h = engine_harness(std::slice::from_ref(&game), DEFAULT_RESERVATION_TTL);
    let user = UserId::random();

    // Interleave: three reserves, one confirmed, one released, one left live.
    let confirmed = h.engine.reserve(game.id(), &user).await.expect("reserve");
    let released = h.engine.reserve(game.id(), &user).await.expect("reserve");
    let _live = h.engine.reserve(game.id(), &user).await.expect("reserve");

    h.engine.confirm(&confirmed).await.expect("confirm");
    h.engine.release(&released).await.expect("release");

    let remaining = h.engine.reconcile(game.id()).await.expect("reconcile");
    assert_eq!(remaining, 10 - 1 - 1, "capacity − paid − live holds");
    assert_eq!(
        h.cache.read(game.id()).await.expect("cache read"),
        Some(remaining),
        "reconcile must overwrite the cached counter"
    );
}

#[tokio::test]
async fn expired_reservation_is_reclaimed_by_reconcile() {
    let game = game(4);
    let h = engine_harness(std::slice::from_ref(&game), Duration::from_secs(60));
    let user = UserId::random();

    let before = h.engine.remaining(game.id()).await.expect("remaining");
    let _abandoned = h.engine.reserve(game.id(), &user).await.expect("reserve");
    assert_eq!(h.engine.remaining(game.id()).await.expect("remaining"), before - 1);

    h.clock.advance(chrono::Duration::seconds(61));
    let restored = h.engine.reconcile(game.id()).await.expect("reconcile");
    assert_eq!(restored, before, "expiry must return the unit to stock");
}

#[tokio::test]
async fn confirm_then_reconcile_leaves_remaining_unchanged() {
    let game = game(7);
    let h = engine_harness(std::slice::from_ref(&game), DEFAULT_RESERVATION_TTL);
    let user = UserId::random();

    let reservation = h.engine.reserve(game.id(), &user).await.expect("reserve");
    let after_reserve = h.engine.remaining(game.id()).await.expect("remaining");

    h.engine.confirm(&reservation).await.expect("confirm");
    let after_reconcile = h.engine.reconcile(game.id()).await.expect("reconcile");

    assert_eq!(
        after_reconcile, after_reserve,
        "a booking replaces its reservation's deduction exactly"
    );
}

#[tokio::test]
async fn cache_flush_heals_through_reconciliation() {
    let game = game(6);
    let h = engine_harness(std::slice::from_ref(&game), DEFAULT_RESERVATION_TTL);
    let user = UserId::random();

    let reservation = h.engine.reserve(game.id(), &user).await.expect("reserve");
    h.engine.confirm(&reservation).await.expect("confirm");

    // Simulate a cache restart: every counter is lost.
    h.cache.flush();
    assert_eq!(
        h.engine.remaining(game.id()).await.expect("remaining"),
        5,
        "a cold cache must rebuild from the durable store"
    );

    // And reserving against the rebuilt counter still works.
    h.engine.reserve(game.id(), &user).await.expect("reserve");
    assert_eq!(h.engine.remaining(game.id()).await.expect("remaining"), 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sweep_races_with_reservers_without_minting_stock() {
    const CAPACITY: u32 = 8;

    let game = game(CAPACITY);
    let h = engine_harness(std::slice::from_ref(&game), DEFAULT_RESERVATION_TTL);
    let match_id = *game.id();

    let mut reserve_tasks = Vec::new();
    for _ in 0..16 {
        let engine = Arc::clone(&h.engine);
        reserve_tasks.push(tokio::spawn(async move {
            let user = UserId::random();
            engine.reserve(&match_id, &user).await
        }));
    }
    // Sweeps run concurrently with the reserve storm.
    let mut sweep_tasks = Vec::new();
    for _ in 0..4 {
        let engine = Arc::clone(&h.engine);
        sweep_tasks.push(tokio::spawn(async move { engine.sweep_expired().await }));
    }

    let mut admitted = 0_u32;
    for task in reserve_tasks {
        if task.await.expect("task completes").is_ok() {
            admitted += 1;
        }
    }
    for task in sweep_tasks {
        task.await.expect("sweep completes");
    }

    assert!(admitted <= CAPACITY, "sweeps must never enable overselling");
    let remaining = h.engine.reconcile(&match_id).await.expect("reconcile");
    assert_eq!(remaining, CAPACITY - admitted);
}
