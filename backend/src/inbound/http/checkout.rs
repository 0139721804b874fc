//! Checkout API handler.
//!
//! ```text
//! POST /api/v1/checkout
//! ```
//!
//! The response is machine readable: `success`, `empty`, or `out_of_stock`
//! with the sold-out match ids.

use actix_web::{post, web};
use serde::Serialize;

use crate::domain::{ApiResult, BookingId, CheckoutOutcome, MatchId};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::AppState;

/// Machine-readable checkout result.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckoutResponse {
    /// Every cart item was booked.
    #[serde(rename_all = "camelCase")]
    Success {
        /// Created booking identifiers, in cart order.
        booking_ids: Vec<BookingId>,
    },
    /// The cart was empty.
    Empty,
    /// At least one match was sold out; nothing was booked.
    #[serde(rename_all = "camelCase")]
    OutOfStock {
        /// The sold-out matches.
        match_ids: Vec<MatchId>,
    },
}

impl From<CheckoutOutcome> for CheckoutResponse {
    fn from(outcome: CheckoutOutcome) -> Self {
        match outcome {
            CheckoutOutcome::Completed { bookings } => Self::Success {
                booking_ids: bookings.iter().map(|b| *b.id()).collect(),
            },
            CheckoutOutcome::EmptyCart => Self::Empty,
            CheckoutOutcome::OutOfStock { match_ids } => Self::OutOfStock { match_ids },
        }
    }
}

/// Check out the authenticated user's cart, all-or-nothing.
#[utoipa::path(
    post,
    path = "/api/v1/checkout",
    responses(
        (status = 200, description = "Checkout outcome", body = CheckoutResponse),
        (status = 401, description = "Not authenticated", body = crate::domain::Error),
        (status = 503, description = "Store or cache unavailable", body = crate::domain::Error),
        (status = 500, description = "Internal server error", body = crate::domain::Error)
    ),
    tags = ["checkout"],
    operation_id = "checkout"
)]
#[post("/checkout")]
pub async fn checkout(
    state: web::Data<AppState>,
    session: SessionContext,
) -> ApiResult<web::Json<CheckoutResponse>> {
    let user_id = session.require_user_id()?;
    let outcome = state.checkout.checkout(&user_id).await?;
    Ok(web::Json(CheckoutResponse::from(outcome)))
}
