//! Bet types.
//!
//! A [`Bet`] is unique per (match, bettor). A second placement either
//! fails or rewrites the same row; it never creates a duplicate.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BetId, MatchId, PitbossError, Result, Side, UserId, check_loser_score};

/// Lifecycle state of a bet.
///
/// - `Pending → Settled` (match settled; payout recorded, possibly 0)
/// - `Pending → Refunded` (bettor withdrew, or the match was abandoned)
///
/// A replacement resets a pending bet to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BetStatus {
    Pending,
    Settled,
    Refunded,
}

impl fmt::Display for BetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Settled => write!(f, "SETTLED"),
            Self::Refunded => write!(f, "REFUNDED"),
        }
    }
}

/// A wager by one bettor on one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bet {
    pub id: BetId,
    pub match_id: MatchId,
    pub bettor: UserId,
    pub predicted_winner: Side,
    pub predicted_loser_score: u8,
    /// Stake in base-currency units.
    pub amount: u64,
    pub status: BetStatus,
    /// `None` until settled. Refunds record `Some(0)`.
    pub payout: Option<u64>,
    pub placed_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bet {
    /// Whether this bet predicted the exact final result.
    #[must_use]
    pub fn is_exact(&self, winner: Side, loser_score: u8) -> bool {
        self.predicted_winner == winner && self.predicted_loser_score == loser_score
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == BetStatus::Pending
    }
}

/// A validated request to place (or replace) a bet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetRequest {
    pub match_id: MatchId,
    /// Bettor username, resolved case-insensitively.
    pub bettor: String,
    pub predicted_winner: Side,
    pub predicted_loser_score: u8,
    pub amount: u64,
    /// Overwrite an existing bet instead of failing.
    pub replace: bool,
}

impl BetRequest {
    /// Check the request's own fields (not ledger state).
    ///
    /// # Errors
    /// - [`PitbossError::InvalidAmount`] if `amount` is zero
    /// - [`PitbossError::InvalidScore`] if the loser score is outside `[0, 9]`
    /// - [`PitbossError::InvalidInput`] if the bettor name is empty
    pub fn validate(&self) -> Result<()> {
        if self.bettor.trim().is_empty() {
            return Err(PitbossError::InvalidInput {
                reason: "bettor username required".to_string(),
            });
        }
        if self.amount == 0 {
            return Err(PitbossError::InvalidAmount {
                reason: "stake must be greater than zero".to_string(),
            });
        }
        check_loser_score("predicted_loser_score", self.predicted_loser_score)?;
        Ok(())
    }

    /// Materialize a fresh pending bet row for `bettor`.
    #[must_use]
    pub fn to_bet(&self, bettor: UserId, now: DateTime<Utc>) -> Bet {
        Bet {
            id: BetId::new(),
            match_id: self.match_id,
            bettor,
            predicted_winner: self.predicted_winner,
            predicted_loser_score: self.predicted_loser_score,
            amount: self.amount,
            status: BetStatus::Pending,
            payout: None,
            placed_at: now,
            updated_at: now,
        }
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl BetRequest {
    /// A non-replacing request with the given prediction.
    pub fn fixture(match_id: MatchId, bettor: &str, winner: Side, loser_score: u8, amount: u64) -> Self {
        Self {
            match_id,
            bettor: bettor.to_string(),
            predicted_winner: winner,
            predicted_loser_score: loser_score,
            amount,
            replace: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_requires_side_and_score() {
        let req = BetRequest::fixture(MatchId::new(), "alice", Side::P1, 7, 100);
        let bet = req.to_bet(UserId::new(), Utc::now());
        assert!(bet.is_exact(Side::P1, 7));
        assert!(!bet.is_exact(Side::P1, 6));
        assert!(!bet.is_exact(Side::P2, 7));
        assert!(bet.is_pending());
        assert_eq!(bet.payout, None);
    }

    #[test]
    fn validate_rejects_zero_amount() {
        let req = BetRequest::fixture(MatchId::new(), "alice", Side::P1, 7, 0);
        assert!(matches!(req.validate(), Err(PitbossError::InvalidAmount { .. })));
    }

    #[test]
    fn validate_rejects_score_out_of_range() {
        let req = BetRequest::fixture(MatchId::new(), "alice", Side::P2, 10, 50);
        assert!(matches!(req.validate(), Err(PitbossError::InvalidScore { .. })));
    }

    #[test]
    fn validate_rejects_blank_bettor() {
        let req = BetRequest::fixture(MatchId::new(), "  ", Side::P2, 3, 50);
        assert!(matches!(req.validate(), Err(PitbossError::InvalidInput { .. })));
    }

    #[test]
    fn status_display() {
        assert_eq!(BetStatus::Pending.to_string(), "PENDING");
        assert_eq!(BetStatus::Refunded.to_string(), "REFUNDED");
    }
}
