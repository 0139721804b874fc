//! Seed fixtures: the opening Premier League matchday.
//!
//! Identifiers are deterministic so operators and tests can refer to seeded
//! matches by stable id across restarts.

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::domain::matches::{Match, MatchId, MatchValidationError, Price};

/// Failure assembling the seed fixtures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExampleDataError {
    /// A fixture kick-off timestamp was not a valid UTC instant.
    #[error("invalid fixture kick-off timestamp")]
    InvalidKickoff,
    /// A fixture failed match validation.
    #[error("invalid fixture match: {0}")]
    InvalidMatch(#[from] MatchValidationError),
}

struct Fixture {
    id: u128,
    home: &'static str,
    away: &'static str,
    kickoff: (u32, u32, u32, u32),
    stadium: &'static str,
    capacity: u32,
    price_pence: i64,
}

const FIXTURES: [Fixture; 5] = [
    Fixture {
        id: 0x5eed_0001,
        home: "West Ham",
        away: "Sunderland",
        kickoff: (1, 24, 19, 30),
        stadium: "London Stadium",
        capacity: 500,
        price_pence: 8_500,
    },
    Fixture {
        id: 0x5eed_0002,
        home: "Man City",
        away: "Wolves",
        kickoff: (1, 24, 22, 0),
        stadium: "Etihad Stadium",
        capacity: 200,
        price_pence: 11_000,
    },
    Fixture {
        id: 0x5eed_0003,
        home: "Burnley",
        away: "Tottenham",
        kickoff: (1, 24, 22, 0),
        stadium: "Turf Moor",
        capacity: 250,
        price_pence: 9_500,
    },
    Fixture {
        id: 0x5eed_0004,
        home: "Bournemouth",
        away: "Liverpool",
        kickoff: (1, 25, 0, 30),
        stadium: "Vitality Stadium",
        capacity: 150,
        price_pence: 12_000,
    },
    Fixture {
        id: 0x5eed_0005,
        home: "Arsenal",
        away: "Man United",
        kickoff: (1, 25, 23, 30),
        stadium: "Emirates Stadium",
        capacity: 100,
        price_pence: 25_000,
    },
];

fn kickoff_instant(month: u32, day: u32, hour: u32, minute: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(2026, month, day, hour, minute, 0).single()
}

/// Build the seed matchday.
///
/// # Examples
/// ```
/// let fixtures = backend::domain::example_data::premier_league_fixtures()
///     .expect("fixtures are statically valid");
/// assert_eq!(fixtures.len(), 5);
/// ```
pub fn premier_league_fixtures() -> Result<Vec<Match>, ExampleDataError> {
    FIXTURES
        .iter()
        .map(|fixture| {
            let (month, day, hour, minute) = fixture.kickoff;
            let kickoff = kickoff_instant(month, day, hour, minute)
                .ok_or(ExampleDataError::InvalidKickoff)?;
            Match::new(
                MatchId::from_uuid(Uuid::from_u128(fixture.id)),
                fixture.home,
                fixture.away,
                kickoff,
                fixture.stadium,
                fixture.capacity,
                Price::from_pence(fixture.price_pence),
            )
            .map_err(ExampleDataError::from)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_build_and_keep_stable_ids() {
        let first = premier_league_fixtures().expect("valid fixtures");
        let second = premier_league_fixtures().expect("valid fixtures");
        let first_ids: Vec<_> = first.iter().map(|m| *m.id()).collect();
        let second_ids: Vec<_> = second.iter().map(|m| *m.id()).collect();
        assert_eq!(first_ids, second_ids, "seed ids must be deterministic");
    }

    #[test]
    fn capacities_match_the_published_matchday() {
        let fixtures = premier_league_fixtures().expect("valid fixtures");
        let capacities: Vec<u32> = fixtures.iter().map(Match::capacity).collect();
        assert_eq!(capacities, vec![500, 200, 250, 150, 100]);
    }
}
