//! Pool partitioning for settlement.
//!
//! Only **exact winners** (right side *and* exact loser score) share the
//! pool. A bet on the right side with the wrong score is a losing bet.

use pitboss_types::{Bet, PitbossError, Result, Side, SideTotals};

/// Pending bets of one match split by the final result.
#[derive(Debug, Clone)]
pub struct PoolSplit<'a> {
    pub exact: Vec<&'a Bet>,
    pub others: Vec<&'a Bet>,
    /// Sum of exact winners' stakes.
    pub winners_pool: u64,
    /// Sum of everyone else's stakes.
    pub losers_pool: u64,
}

impl PoolSplit<'_> {
    #[must_use]
    pub fn total(&self) -> u64 {
        self.winners_pool + self.losers_pool
    }
}

/// Partition pending `bets` by `(winner, loser_score)`.
///
/// # Errors
/// Returns [`PitbossError::InvariantViolation`] if a bet is not pending, or
/// if a pool total overflows.
pub fn partition(bets: &[Bet], winner: Side, loser_score: u8) -> Result<PoolSplit<'_>> {
    let mut split = PoolSplit {
        exact: Vec::new(),
        others: Vec::new(),
        winners_pool: 0,
        losers_pool: 0,
    };

    for bet in bets {
        if !bet.is_pending() {
            return Err(PitbossError::InvariantViolation {
                reason: format!("{} is {} and cannot enter a pool", bet.id, bet.status),
            });
        }
        let (side, pool) = if bet.is_exact(winner, loser_score) {
            (&mut split.exact, &mut split.winners_pool)
        } else {
            (&mut split.others, &mut split.losers_pool)
        };
        *pool = pool.checked_add(bet.amount).ok_or_else(|| PitbossError::InvariantViolation {
            reason: "pool total overflow".to_string(),
        })?;
        side.push(bet);
    }

    verify_partition(&split, winner, loser_score)?;
    Ok(split)
}

/// Re-check the split. A losing bet among the exact winners means the
/// partition logic itself is broken.
///
/// # Errors
/// Returns [`PitbossError::InvariantViolation`] on any mismatch.
pub fn verify_partition(split: &PoolSplit<'_>, winner: Side, loser_score: u8) -> Result<()> {
    if let Some(bad) = split.exact.iter().find(|b| !b.is_exact(winner, loser_score)) {
        return Err(PitbossError::InvariantViolation {
            reason: format!("losing {} in exact-winner partition", bad.id),
        });
    }
    if let Some(bad) = split.others.iter().find(|b| b.is_exact(winner, loser_score)) {
        return Err(PitbossError::InvariantViolation {
            reason: format!("exact {} left out of winners", bad.id),
        });
    }
    let winners: u64 = split.exact.iter().map(|b| b.amount).sum();
    let losers: u64 = split.others.iter().map(|b| b.amount).sum();
    if winners != split.winners_pool || losers != split.losers_pool {
        return Err(PitbossError::InvariantViolation {
            reason: "pool totals do not match partition".to_string(),
        });
    }
    Ok(())
}

/// Stake totals per predicted winner, over pending bets only.
#[must_use]
pub fn side_totals(bets: &[Bet]) -> SideTotals {
    bets.iter().filter(|b| b.is_pending()).fold(SideTotals::default(), |mut acc, bet| {
        match bet.predicted_winner {
            Side::P1 => acc.p1 += bet.amount,
            Side::P2 => acc.p2 += bet.amount,
        }
        acc
    })
}
