//! Settlement receipts for the audit trail.
//!
//! Every successful settlement returns a [`SettlementReceipt`] describing
//! the pools, each bettor's payout, and the rating change. The
//! `payout_root` commits to the payout lines so that a replayed settlement
//! can be compared byte-for-byte against the original.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{BetId, MatchId, RatingDelta, Side, UserId};

/// One bet's outcome at settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutLine {
    pub bet_id: BetId,
    pub bettor: UserId,
    pub stake: u64,
    /// Zero for everyone but exact winners.
    pub payout: u64,
    pub exact: bool,
}

/// The rating change applied to both participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingOutcome {
    pub winner: RatingDelta,
    pub loser: RatingDelta,
}

/// Proof of a completed pari-mutuel settlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementReceipt {
    pub match_id: MatchId,
    pub winner: Side,
    pub loser_score: u8,
    /// Sum of exact winners' stakes.
    pub winners_pool: u64,
    /// Sum of everyone else's stakes.
    pub losers_pool: u64,
    pub lines: Vec<PayoutLine>,
    pub rating: RatingOutcome,
    pub settled_at: DateTime<Utc>,
    /// SHA-256 over the payout lines in ledger order.
    pub payout_root: [u8; 32],
}

impl SettlementReceipt {
    /// Total credited to winners.
    #[must_use]
    pub fn total_paid(&self) -> u64 {
        self.lines.iter().map(|l| l.payout).sum()
    }

    /// Combined pool (`winners_pool + losers_pool`).
    #[must_use]
    pub fn total_pool(&self) -> u64 {
        self.winners_pool + self.losers_pool
    }

    #[must_use]
    pub fn exact_winners(&self) -> usize {
        self.lines.iter().filter(|l| l.exact).count()
    }

    #[must_use]
    pub fn payout_root_hex(&self) -> String {
        hex::encode(self.payout_root)
    }
}

/// Deterministic hash over a match's payout lines.
#[must_use]
pub fn compute_payout_root(match_id: MatchId, lines: &[PayoutLine]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"pitboss:payout_root:v1:");
    hasher.update(match_id.0.as_bytes());
    hasher.update((lines.len() as u64).to_le_bytes());
    for line in lines {
        hasher.update(line.bet_id.0.as_bytes());
        hasher.update(line.bettor.0.as_bytes());
        hasher.update(line.stake.to_le_bytes());
        hasher.update(line.payout.to_le_bytes());
        hasher.update([u8::from(line.exact)]);
    }
    let result = hasher.finalize();
    let mut root = [0u8; 32];
    root.copy_from_slice(&result);
    root
}
