//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they depend
//! only on domain ports and services and remain testable without I/O.

use std::sync::Arc;

use crate::domain::checkout::CheckoutService;
use crate::domain::ports::{
    BookingRepository, CartRepository, LoginService, MatchRepository, UserOnboarding,
};
use crate::domain::stock::ReservationEngine;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Authentication driving port.
    pub login: Arc<dyn LoginService>,
    /// Registration driving port.
    pub onboarding: Arc<dyn UserOnboarding>,
    /// Match catalogue reads.
    pub matches: Arc<dyn MatchRepository>,
    /// Cart reads and mutations.
    pub cart: Arc<dyn CartRepository>,
    /// Booking reads and cancellation.
    pub bookings: Arc<dyn BookingRepository>,
    /// The stock reservation engine.
    pub stock: Arc<ReservationEngine>,
    /// The checkout orchestrator.
    pub checkout: Arc<CheckoutService>,
}
