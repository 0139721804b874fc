//! Reservation types: time-bounded holds on match stock.
//!
//! A reservation is created when a cart item enters checkout processing, not
//! when it is added to the cart. It is owned by the reservation engine, lives
//! only in process memory, and is never persisted beyond its expiry window.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::matches::MatchId;
use crate::domain::user::UserId;

/// Unique reservation identifier (UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(transparent)]
pub struct ReservationId(Uuid);

impl ReservationId {
    /// Parse an identifier from its canonical string form.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, uuid::Error> {
        Uuid::parse_str(raw.as_ref()).map(Self)
    }

    /// Generate a fresh random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A hold on exactly one unit of match stock, pending confirmation.
///
/// ## Invariants
/// - Quantity is fixed at one; a cart with several matches produces several
///   reservations.
/// - Must be confirmed before `expires_at` or the unit returns to stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    id: ReservationId,
    user_id: UserId,
    match_id: MatchId,
    expires_at: DateTime<Utc>,
}

impl Reservation {
    /// Create a hold expiring at the given instant.
    pub fn new(
        id: ReservationId,
        user_id: UserId,
        match_id: MatchId,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            match_id,
            expires_at,
        }
    }

    /// Unique identifier.
    pub fn id(&self) -> &ReservationId {
        &self.id
    }

    /// Holding user.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Match whose stock is held.
    pub fn match_id(&self) -> &MatchId {
        &self.match_id
    }

    /// Instant after which the hold no longer confirms.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the hold has lapsed at the given instant.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn expiry_is_inclusive_of_the_deadline() {
        let now = Utc::now();
        let hold = Reservation::new(
            ReservationId::random(),
            UserId::random(),
            MatchId::random(),
            now,
        );
        assert!(hold.is_expired(now), "deadline instant counts as expired");
        assert!(!hold.is_expired(now - Duration::seconds(1)));
    }
}
