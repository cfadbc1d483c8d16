//! Stake escrow.
//!
//! A stake leaves the bettor's base wallet when the bet is written and
//! comes back only through a refund. Settlement credits payouts and never
//! returns the stake separately: the payout formula already contains it.
//!
//! All functions run inside the caller's ledger transaction.

use chrono::{DateTime, Utc};
use pitboss_ledger::LedgerTx;
use pitboss_types::{Bet, BetStatus, MatchId, PitbossError, Result, UserId};
use rust_decimal::Decimal;
use tracing::debug;

/// Debit `amount` from the bettor's wallet into escrow.
///
/// # Errors
/// Returns `InsufficientBalance` if the wallet cannot cover the stake.
pub fn hold_stake(tx: &mut dyn LedgerTx, symbol: &str, bettor: UserId, amount: u64) -> Result<()> {
    tx.debit(bettor, symbol, Decimal::from(amount))?;
    Ok(())
}

/// Return a pending bet's stake and mark it REFUNDED with payout 0.
///
/// # Errors
/// - `InvariantViolation` if the bet is not pending
/// - `BetNotFound` if the row vanished
pub fn release_stake(tx: &mut dyn LedgerTx, symbol: &str, bet: &Bet, now: DateTime<Utc>) -> Result<Bet> {
    if !bet.is_pending() {
        return Err(PitbossError::InvariantViolation {
            reason: format!("{} is {}, only pending stakes are held", bet.id, bet.status),
        });
    }
    tx.credit(bet.bettor, symbol, Decimal::from(bet.amount))?;

    let row = Bet {
        status: BetStatus::Refunded,
        payout: Some(0),
        updated_at: now,
        ..bet.clone()
    };
    tx.update_bet(&row)?;
    debug!(bet = %row.id, bettor = %row.bettor, amount = row.amount, "stake released");
    Ok(row)
}

/// Refund every pending bet on a match. Returns the refunded rows.
///
/// # Errors
/// See [`release_stake`].
pub fn release_all(tx: &mut dyn LedgerTx, symbol: &str, match_id: MatchId, now: DateTime<Utc>) -> Result<Vec<Bet>> {
    let pending: Vec<Bet> = tx
        .bets_for_match(match_id)
        .into_iter()
        .filter(Bet::is_pending)
        .collect();
    let mut released = Vec::with_capacity(pending.len());
    for bet in &pending {
        released.push(release_stake(tx, symbol, bet, now)?);
    }
    Ok(released)
}
