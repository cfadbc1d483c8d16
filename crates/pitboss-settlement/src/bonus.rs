//! Bonus modifiers for exact winners.
//!
//! The payout engine takes combo stacks and a perfect flag as plain inputs.
//! A [`BonusPolicy`] decides them from the bettor's history at settlement.

use std::fmt;

use pitboss_engine::Bonus;
use pitboss_types::constants::MAX_COMBO_STACKS;
use pitboss_types::{Bet, BetStatus};

/// Decides bonus modifiers for one exact winner.
pub trait BonusPolicy: fmt::Debug + Send + Sync {
    /// `history` is every bet row of the bettor, newest placement first.
    /// Rows of the match being settled are still pending.
    fn bonus(&self, history: &[Bet], loser_score: u8) -> Bonus;
}

/// No bonuses, ever.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBonus;

impl BonusPolicy for NoBonus {
    fn bonus(&self, _history: &[Bet], _loser_score: u8) -> Bonus {
        Bonus::none()
    }
}

/// One combo stack per consecutive paid settlement, most recent first.
/// A call on a shutout (loser score 0) is perfect.
#[derive(Debug, Clone, Copy)]
pub struct StreakBonus {
    pub max_stacks: u32,
}

impl Default for StreakBonus {
    fn default() -> Self {
        Self {
            max_stacks: MAX_COMBO_STACKS,
        }
    }
}

impl BonusPolicy for StreakBonus {
    fn bonus(&self, history: &[Bet], loser_score: u8) -> Bonus {
        let mut settled: Vec<&Bet> = history
            .iter()
            .filter(|b| b.status == BetStatus::Settled)
            .collect();
        // Stable: equal settlement times keep newest placement first.
        settled.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        let streak = settled
            .iter()
            .take_while(|b| b.payout.unwrap_or(0) > 0)
            .count();

        Bonus {
            combo_stacks: u32::try_from(streak).unwrap_or(u32::MAX).min(self.max_stacks),
            perfect: loser_score == 0,
        }
    }
}
