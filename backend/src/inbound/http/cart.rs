//! Cart API handlers.
//!
//! ```text
//! GET    /api/v1/cart
//! POST   /api/v1/cart/{match_id}
//! DELETE /api/v1/cart/{match_id}
//! ```

use actix_web::{delete, get, post, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use crate::domain::ports::CartRepositoryError;
use crate::domain::{ApiResult, CartLine, Error, MatchId, cart_total};
use crate::inbound::http::matches::map_match_repository_error;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::AppState;

/// One cart line joined with its match.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    /// Match identifier.
    pub match_id: MatchId,
    /// Home side.
    pub home_team: String,
    /// Away side.
    pub away_team: String,
    /// Kick-off instant (UTC).
    pub kickoff: DateTime<Utc>,
    /// Ticket price in pence.
    pub price_pence: i64,
}

/// The authenticated user's cart.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    /// Cart lines, oldest first.
    pub items: Vec<CartLineView>,
    /// Sum of line prices in pence.
    pub total_pence: i64,
}

pub(crate) fn map_cart_repository_error(err: CartRepositoryError) -> Error {
    match err {
        CartRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("cart store unavailable: {message}"))
        }
        CartRepositoryError::Query { message } => {
            Error::internal(format!("cart store error: {message}"))
        }
    }
}

/// View the authenticated user's cart with its total price.
#[utoipa::path(
    get,
    path = "/api/v1/cart",
    responses(
        (status = 200, description = "Cart contents", body = CartView),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["cart"],
    operation_id = "viewCart"
)]
#[get("/cart")]
pub async fn view_cart(
    state: web::Data<AppState>,
    session: SessionContext,
) -> ApiResult<web::Json<CartView>> {
    let user_id = session.require_user_id()?;
    let items = state
        .cart
        .items_for_user(&user_id)
        .await
        .map_err(map_cart_repository_error)?;

    let mut lines = Vec::with_capacity(items.len());
    for item in items {
        let Some(game) = state
            .matches
            .find(item.match_id())
            .await
            .map_err(map_match_repository_error)?
        else {
            // The match vanished underneath the cart row; skip rather than
            // fail the whole view.
            tracing::warn!(match_id = %item.match_id(), "cart references unknown match");
            continue;
        };
        lines.push(CartLine { item, game });
    }

    let total = cart_total(&lines);
    Ok(web::Json(CartView {
        items: lines
            .into_iter()
            .map(|line| CartLineView {
                match_id: *line.game.id(),
                home_team: line.game.home_team().to_owned(),
                away_team: line.game.away_team().to_owned(),
                kickoff: line.game.kickoff(),
                price_pence: line.game.price().pence(),
            })
            .collect(),
        total_pence: total.pence(),
    }))
}

/// Add a match to the cart. Idempotent per user+match.
#[utoipa::path(
    post,
    path = "/api/v1/cart/{match_id}",
    params(("match_id" = MatchId, Path, description = "Match to add")),
    responses(
        (status = 200, description = "Cart updated"),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 404, description = "Unknown match", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["cart"],
    operation_id = "addToCart"
)]
#[post("/cart/{match_id}")]
pub async fn add_to_cart(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<MatchId>,
) -> ApiResult<web::Json<serde_json::Value>> {
    let user_id = session.require_user_id()?;
    let match_id = path.into_inner();

    state
        .matches
        .find(&match_id)
        .await
        .map_err(map_match_repository_error)?
        .ok_or_else(|| Error::not_found(format!("match {match_id} not found")))?;

    let added = state
        .cart
        .add(&user_id, &match_id)
        .await
        .map_err(map_cart_repository_error)?;
    let count = state
        .cart
        .items_for_user(&user_id)
        .await
        .map_err(map_cart_repository_error)?
        .len();
    Ok(web::Json(json!({ "added": added, "cartCount": count })))
}

/// Remove a match from the cart.
#[utoipa::path(
    delete,
    path = "/api/v1/cart/{match_id}",
    params(("match_id" = MatchId, Path, description = "Match to remove")),
    responses(
        (status = 200, description = "Cart updated"),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["cart"],
    operation_id = "removeFromCart"
)]
#[delete("/cart/{match_id}")]
pub async fn remove_from_cart(
    state: web::Data<AppState>,
    session: SessionContext,
    path: web::Path<MatchId>,
) -> ApiResult<web::Json<serde_json::Value>> {
    let user_id = session.require_user_id()?;
    let match_id = path.into_inner();
    let removed = state
        .cart
        .remove(&user_id, &match_id)
        .await
        .map_err(map_cart_repository_error)?;
    Ok(web::Json(json!({ "removed": removed })))
}
