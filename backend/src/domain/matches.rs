//! Football match catalogue types.
//!
//! A match's capacity and price are fixed at creation; remaining stock is a
//! derived quantity owned by the reservation engine, never a mutable field on
//! the match itself.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique match identifier (UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(transparent)]
pub struct MatchId(Uuid);

impl MatchId {
    /// Parse an identifier from its canonical string form.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, uuid::Error> {
        Uuid::parse_str(raw.as_ref()).map(Self)
    }

    /// Wrap an already-validated UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Underlying UUID for persistence adapters and cache keys.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ticket price in minor currency units (pence).
///
/// Money never touches floating point; adapters render pounds at the edge.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    /// Wrap an amount expressed in pence.
    pub fn from_pence(pence: i64) -> Self {
        Self(pence)
    }

    /// Amount in pence.
    pub fn pence(&self) -> i64 {
        self.0
    }

    /// Saturating sum, used for cart totals.
    #[must_use]
    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pounds = self.0 / 100;
        let pence = (self.0 % 100).abs();
        write!(f, "£{pounds}.{pence:02}")
    }
}

/// Validation failures for match fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchValidationError {
    /// A team name was blank once trimmed.
    #[error("team names must not be empty")]
    EmptyTeam,
    /// The stadium name was blank once trimmed.
    #[error("stadium must not be empty")]
    EmptyStadium,
    /// A negative price was supplied.
    #[error("price must not be negative")]
    NegativePrice,
}

/// A scheduled football match with fixed capacity and pricing.
///
/// ## Invariants
/// - `capacity` is immutable once the match is created.
/// - `price` is fixed and non-negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    id: MatchId,
    home_team: String,
    away_team: String,
    kickoff: DateTime<Utc>,
    stadium: String,
    capacity: u32,
    price: Price,
}

impl Match {
    /// Assemble a match from raw parts, validating the text fields.
    pub fn new(
        id: MatchId,
        home_team: impl Into<String>,
        away_team: impl Into<String>,
        kickoff: DateTime<Utc>,
        stadium: impl Into<String>,
        capacity: u32,
        price: Price,
    ) -> Result<Self, MatchValidationError> {
        let home_team = home_team.into();
        let away_team = away_team.into();
        let stadium = stadium.into();
        if home_team.trim().is_empty() || away_team.trim().is_empty() {
            return Err(MatchValidationError::EmptyTeam);
        }
        if stadium.trim().is_empty() {
            return Err(MatchValidationError::EmptyStadium);
        }
        if price.pence() < 0 {
            return Err(MatchValidationError::NegativePrice);
        }
        Ok(Self {
            id,
            home_team,
            away_team,
            kickoff,
            stadium,
            capacity,
            price,
        })
    }

    /// Unique identifier.
    pub fn id(&self) -> &MatchId {
        &self.id
    }

    /// Home side.
    pub fn home_team(&self) -> &str {
        self.home_team.as_str()
    }

    /// Away side.
    pub fn away_team(&self) -> &str {
        self.away_team.as_str()
    }

    /// Kick-off instant (UTC).
    pub fn kickoff(&self) -> DateTime<Utc> {
        self.kickoff
    }

    /// Stadium name.
    pub fn stadium(&self) -> &str {
        self.stadium.as_str()
    }

    /// Total seats available for sale. Immutable after creation.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Fixed ticket price.
    pub fn price(&self) -> Price {
        self.price
    }
}
