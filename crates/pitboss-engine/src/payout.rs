//! Pari-mutuel payout computation.
//!
//! An exact winner's payout is their stake scaled by the losers-to-winners
//! pool ratio, bounded to `[floor_ratio × stake, cap_multiple × stake]`,
//! then boosted by combo and perfect bonuses. The cap is applied again after
//! the bonuses: no multiplier can push a payout past it.
//!
//! The result is floored to whole base-currency units.

use pitboss_types::{PayoutConfig, PitbossError, Result};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Bonus modifiers for one exact winner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bonus {
    /// Streak stacks. Values above the configured maximum are clamped.
    pub combo_stacks: u32,
    pub perfect: bool,
}

impl Bonus {
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }
}

/// Payout with the default rules.
///
/// # Errors
/// See [`payout_with`].
pub fn payout(stake: u64, winners_pool: u64, losers_pool: u64, bonus: Bonus) -> Result<u64> {
    payout_with(&PayoutConfig::default(), stake, winners_pool, losers_pool, bonus)
}

/// Payout for one exact winner's `stake`.
///
/// With an empty losers pool the ratio is 1: winners get their stake back
/// and no profit.
///
/// # Errors
/// Returns [`PitbossError::InvalidAmount`] if an intermediate product
/// overflows `Decimal` or the result does not fit in `u64`.
pub fn payout_with(
    rules: &PayoutConfig,
    stake: u64,
    winners_pool: u64,
    losers_pool: u64,
    bonus: Bonus,
) -> Result<u64> {
    if stake == 0 {
        return Ok(0);
    }
    let overflow = || PitbossError::InvalidAmount {
        reason: format!("payout for stake {stake} is not representable"),
    };
    let stake_d = Decimal::from(stake);

    // Multiply before dividing so exact ratios floor exactly.
    let base = if losers_pool == 0 {
        stake_d
    } else {
        stake_d
            .checked_mul(Decimal::from(losers_pool))
            .and_then(|v| v.checked_div(Decimal::from(winners_pool.max(1))))
            .ok_or_else(overflow)?
    };

    let floor = stake_d.checked_mul(rules.floor_ratio).ok_or_else(overflow)?;
    let cap = stake_d.checked_mul(rules.cap_multiple).ok_or_else(overflow)?;
    let mut amount = base.max(floor).min(cap);

    let stacks = bonus.combo_stacks.min(rules.max_combo_stacks);
    let combo = rules
        .combo_step
        .checked_mul(Decimal::from(stacks))
        .and_then(|step| Decimal::ONE.checked_add(step))
        .ok_or_else(overflow)?;
    amount = amount.checked_mul(combo).ok_or_else(overflow)?;
    if bonus.perfect {
        amount = amount.checked_mul(rules.perfect_multiplier).ok_or_else(overflow)?;
    }

    amount.min(cap).floor().to_u64().ok_or_else(overflow)
}
