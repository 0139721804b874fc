//! Match catalogue API handlers.
//!
//! ```text
//! GET /api/v1/matches
//! ```

use actix_web::{get, web};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{ApiResult, Error, Match, MatchId};
use crate::domain::ports::MatchRepositoryError;
use crate::inbound::http::state::AppState;

/// A match joined with its live remaining stock.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    /// Match identifier.
    pub id: MatchId,
    /// Home side.
    pub home_team: String,
    /// Away side.
    pub away_team: String,
    /// Kick-off instant (UTC).
    pub kickoff: DateTime<Utc>,
    /// Stadium name.
    pub stadium: String,
    /// Ticket price in pence.
    pub price_pence: i64,
    /// Remaining sellable stock (cache read path).
    pub remaining: u32,
}

impl MatchSummary {
    fn from_match(game: &Match, remaining: u32) -> Self {
        Self {
            id: *game.id(),
            home_team: game.home_team().to_owned(),
            away_team: game.away_team().to_owned(),
            kickoff: game.kickoff(),
            stadium: game.stadium().to_owned(),
            price_pence: game.price().pence(),
            remaining,
        }
    }
}

pub(crate) fn map_match_repository_error(err: MatchRepositoryError) -> Error {
    match err {
        MatchRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("match store unavailable: {message}"))
        }
        MatchRepositoryError::Query { message } => {
            Error::internal(format!("match store error: {message}"))
        }
    }
}

/// List matches ordered by kick-off, with live remaining stock per match.
#[utoipa::path(
    get,
    path = "/api/v1/matches",
    responses(
        (status = 200, description = "Matches with remaining stock", body = [MatchSummary]),
        (status = 503, description = "Store or cache unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["matches"],
    operation_id = "listMatches",
    security([])
)]
#[get("/matches")]
pub async fn list_matches(state: web::Data<AppState>) -> ApiResult<web::Json<Vec<MatchSummary>>> {
    let games = state
        .matches
        .list()
        .await
        .map_err(map_match_repository_error)?;

    let mut summaries = Vec::with_capacity(games.len());
    for game in &games {
        let remaining = state.stock.remaining(game.id()).await?;
        summaries.push(MatchSummary::from_match(game, remaining));
    }
    Ok(web::Json(summaries))
}
