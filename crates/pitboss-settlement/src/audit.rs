//! Post-settlement audit.
//!
//! Two checks run on every receipt:
//! ```text
//! ∀ line: !exact ⇒ payout == 0
//! Σ payouts ≤ winners_pool + losers_pool
//! ```
//!
//! The first is an invariant and fails the settlement. The second can
//! legitimately break on thin pools, where the 10× cap pays out more than
//! was staked; that is logged, never corrected.

use pitboss_types::{MatchId, PitbossError, Result, SettlementReceipt};
use tracing::warn;

/// Pool coverage of one settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolAudit {
    pub match_id: MatchId,
    /// Combined pool.
    pub pool: u64,
    /// Total credited to exact winners.
    pub paid: u64,
}

impl PoolAudit {
    /// Audit a receipt.
    ///
    /// # Errors
    /// Returns [`PitbossError::InvariantViolation`] if a non-exact line was
    /// paid, or if the lines disagree with the pool totals.
    pub fn inspect(receipt: &SettlementReceipt) -> Result<Self> {
        if let Some(line) = receipt.lines.iter().find(|l| !l.exact && l.payout > 0) {
            return Err(PitbossError::InvariantViolation {
                reason: format!("non-exact {} paid {}", line.bet_id, line.payout),
            });
        }

        let staked: u64 = receipt.lines.iter().map(|l| l.stake).sum();
        if staked != receipt.total_pool() {
            return Err(PitbossError::InvariantViolation {
                reason: format!(
                    "{}: lines stake {staked} but pools total {}",
                    receipt.match_id,
                    receipt.total_pool()
                ),
            });
        }

        let audit = Self {
            match_id: receipt.match_id,
            pool: receipt.total_pool(),
            paid: receipt.total_paid(),
        };
        if audit.overdraw() > 0 {
            warn!(
                match_id = %audit.match_id,
                pool = audit.pool,
                paid = audit.paid,
                overdraw = audit.overdraw(),
                "payouts exceed the combined pool"
            );
        }
        Ok(audit)
    }

    /// How much more was paid than staked. Zero when covered.
    #[must_use]
    pub fn overdraw(&self) -> u64 {
        self.paid.saturating_sub(self.pool)
    }

    #[must_use]
    pub fn is_covered(&self) -> bool {
        self.paid <= self.pool
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pitboss_types::{BetId, PayoutLine, RatingDelta, RatingOutcome, Side, UserId, compute_payout_root};

    use super::*;

    fn line(stake: u64, payout: u64, exact: bool) -> PayoutLine {
        PayoutLine {
            bet_id: BetId::new(),
            bettor: UserId::new(),
            stake,
            payout,
            exact,
        }
    }

    fn receipt(lines: Vec<PayoutLine>, winners_pool: u64, losers_pool: u64) -> SettlementReceipt {
        let match_id = MatchId::new();
        let now = Utc::now();
        let delta = RatingDelta::new(match_id, UserId::new(), 1200, 1200, now);
        SettlementReceipt {
            match_id,
            winner: Side::P1,
            loser_score: 3,
            winners_pool,
            losers_pool,
            payout_root: compute_payout_root(match_id, &lines),
            lines,
            rating: RatingOutcome { winner: delta, loser: delta },
            settled_at: now,
        }
    }

    #[test]
    fn covered_pool() {
        let r = receipt(vec![line(500, 1500, true), line(1000, 0, false)], 500, 1000);
        let audit = PoolAudit::inspect(&r).unwrap();
        assert!(audit.is_covered());
        assert_eq!(audit.overdraw(), 0);
    }

    #[test]
    fn thin_pool_overdraw_is_reported_not_rejected() {
        // 150 staked in total, cap-limited payout of 1000.
        let r = receipt(vec![line(100, 1000, true), line(50, 0, false)], 100, 50);
        let audit = PoolAudit::inspect(&r).unwrap();
        assert!(!audit.is_covered());
        assert_eq!(audit.overdraw(), 850);
    }

    #[test]
    fn paid_loser_is_invariant_violation() {
        let r = receipt(vec![line(100, 10, false)], 0, 100);
        assert!(matches!(PoolAudit::inspect(&r), Err(PitbossError::InvariantViolation { .. })));
    }

    #[test]
    fn pool_mismatch_is_invariant_violation() {
        let r = receipt(vec![line(100, 0, false)], 0, 90);
        assert!(PoolAudit::inspect(&r).is_err());
    }
}
