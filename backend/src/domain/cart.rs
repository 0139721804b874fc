//! Cart types: purchase intent prior to checkout.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::matches::{Match, MatchId, Price};
use crate::domain::user::UserId;

/// A (user, match) pair representing intent to purchase one ticket.
///
/// ## Invariants
/// - Unique per user+match; adding the same match twice is a no-op.
/// - Ephemeral: removed on checkout or explicit removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    id: Uuid,
    user_id: UserId,
    match_id: MatchId,
    added_at: DateTime<Utc>,
}

impl CartItem {
    /// Assemble a cart item from its parts.
    pub fn new(id: Uuid, user_id: UserId, match_id: MatchId, added_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            match_id,
            added_at,
        }
    }

    /// Row identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Owning user.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Match the user intends to buy a ticket for.
    pub fn match_id(&self) -> &MatchId {
        &self.match_id
    }

    /// Instant the item entered the cart.
    pub fn added_at(&self) -> DateTime<Utc> {
        self.added_at
    }
}

/// A cart line joined with its match for presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    /// The underlying cart item.
    pub item: CartItem,
    /// The match it refers to.
    pub game: Match,
}

/// Sum the ticket prices across cart lines.
pub fn cart_total(lines: &[CartLine]) -> Price {
    lines
        .iter()
        .fold(Price::from_pence(0), |total, line| {
            total.saturating_add(line.game.price())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn game(price_pence: i64) -> Match {
        Match::new(
            MatchId::random(),
            "Arsenal",
            "Man United",
            Utc.with_ymd_and_hms(2026, 1, 25, 23, 30, 0)
                .single()
                .expect("valid fixture timestamp"),
            "Emirates Stadium",
            100,
            Price::from_pence(price_pence),
        )
        .expect("valid match")
    }

    #[test]
    fn totals_sum_across_lines() {
        let user = UserId::random();
        let lines: Vec<CartLine> = [8500, 25000]
            .into_iter()
            .map(|pence| {
                let game = game(pence);
                CartLine {
                    item: CartItem::new(Uuid::new_v4(), user, *game.id(), Utc::now()),
                    game,
                }
            })
            .collect();
        assert_eq!(cart_total(&lines), Price::from_pence(33500));
    }

    #[test]
    fn empty_cart_totals_zero() {
        assert_eq!(cart_total(&[]), Price::from_pence(0));
    }
}
