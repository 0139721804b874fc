//! Booking types: the durable record of a completed purchase.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::matches::MatchId;
use crate::domain::user::UserId;

/// Unique booking identifier (UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(transparent)]
pub struct BookingId(Uuid);

impl BookingId {
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

    /// Underlying UUID for persistence adapters.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a booking.
///
/// A booking is created `Paid` and is immutable afterwards except for the
/// `Paid` → `Cancelled` transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Purchase completed; the ticket counts against match capacity.
    Paid,
    /// Purchase cancelled; the seat returns to stock on the next reconcile.
    Cancelled,
}

impl BookingStatus {
    /// Storage representation, matching the `bookings.status` column.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Self::Paid => "PAID",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parse the storage representation.
    pub fn from_db_str(raw: &str) -> Option<Self> {
        match raw {
            "PAID" => Some(Self::Paid),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Permanent record of a completed purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    id: BookingId,
    user_id: UserId,
    match_id: MatchId,
    booked_at: DateTime<Utc>,
    status: BookingStatus,
}

impl Booking {
    /// Assemble a booking from its parts.
    pub fn new(
        id: BookingId,
        user_id: UserId,
        match_id: MatchId,
        booked_at: DateTime<Utc>,
        status: BookingStatus,
    ) -> Self {
        Self {
            id,
            user_id,
            match_id,
            booked_at,
            status,
        }
    }

    /// Unique identifier.
    pub fn id(&self) -> &BookingId {
        &self.id
    }

    /// Purchasing user.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Booked match.
    pub fn match_id(&self) -> &MatchId {
        &self.match_id
    }

    /// Purchase instant.
    pub fn booked_at(&self) -> DateTime<Utc> {
        self.booked_at
    }

    /// Current lifecycle status.
    pub fn status(&self) -> BookingStatus {
        self.status
    }
}
