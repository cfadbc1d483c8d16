//! Atomic pari-mutuel settlement.
//!
//! Given a LOCKED match, winner side, and loser score, one ledger
//! transaction:
//! 1. CAS the match LOCKED → SETTLED and record the result
//! 2. Load the match's pending bets
//! 3. Partition into exact winners and everyone else
//! 4. Total both pools
//! 5. Pay each exact winner through the payout engine, with bonuses
//! 6. Mark every bet SETTLED and credit winners' base wallets
//! 7. Update both players' ratings and append the two delta rows
//!
//! Any error aborts the transaction. A second settlement of the same match
//! fails at step 1.

use chrono::{DateTime, Utc};
use pitboss_engine::{Bonus, partition, payout_with, rate_match};
use pitboss_ledger::LedgerTx;
use pitboss_types::{
    Bet, BetStatus, Match, MatchId, MatchState, PayoutLine, RatingDelta, RatingOutcome, Result,
    SettlementReceipt, Side, compute_payout_root,
};
use rust_decimal::Decimal;
use tracing::info;

use crate::audit::PoolAudit;
use crate::bonus::BonusPolicy;
use crate::settings::Settings;

/// Settle a LOCKED match inside `tx`.
///
/// # Errors
/// - `MatchNotFound`, `AlreadySettled` or `StateConflict` from the CAS
/// - `InvariantViolation` if the partition or the receipt audit fails
pub fn settle_locked(
    tx: &mut dyn LedgerTx,
    settings: &Settings,
    bonus: &dyn BonusPolicy,
    match_id: MatchId,
    winner: Side,
    loser_score: u8,
    now: DateTime<Utc>,
) -> Result<SettlementReceipt> {
    let mut matchup = tx.transition_match(match_id, MatchState::Locked, MatchState::Settled)?;
    matchup.record_result(winner, loser_score, now);
    tx.update_match(&matchup)?;

    let bets: Vec<Bet> = tx
        .bets_for_match(match_id)
        .into_iter()
        .filter(Bet::is_pending)
        .collect();
    let split = partition(&bets, winner, loser_score)?;
    let (winners_pool, losers_pool) = (split.winners_pool, split.losers_pool);

    let mut lines = Vec::with_capacity(bets.len());
    for bet in &bets {
        let exact = bet.is_exact(winner, loser_score);
        let paid = if exact {
            let history = tx.bets_for_user(bet.bettor);
            let modifiers: Bonus = bonus.bonus(&history, loser_score);
            payout_with(&settings.payout, bet.amount, winners_pool, losers_pool, modifiers)?
        } else {
            0
        };

        tx.update_bet(&Bet {
            status: BetStatus::Settled,
            payout: Some(paid),
            updated_at: now,
            ..bet.clone()
        })?;
        if paid > 0 {
            tx.credit(bet.bettor, &settings.base_symbol, Decimal::from(paid))?;
        }
        lines.push(PayoutLine {
            bet_id: bet.id,
            bettor: bet.bettor,
            stake: bet.amount,
            payout: paid,
            exact,
        });
    }

    let rating = apply_rating(tx, settings, &matchup, winner, now)?;

    let receipt = SettlementReceipt {
        match_id,
        winner,
        loser_score,
        winners_pool,
        losers_pool,
        payout_root: compute_payout_root(match_id, &lines),
        lines,
        rating,
        settled_at: now,
    };
    let audit = PoolAudit::inspect(&receipt)?;

    info!(
        match_id = %match_id,
        channel = %matchup.channel,
        winner = %winner,
        loser_score,
        bets = receipt.lines.len(),
        exact_winners = receipt.exact_winners(),
        pool = audit.pool,
        paid = audit.paid,
        "match settled"
    );
    Ok(receipt)
}

/// Rate a decided match and append both delta rows.
///
/// # Errors
/// Propagates ledger errors.
pub fn apply_rating(
    tx: &mut dyn LedgerTx,
    settings: &Settings,
    matchup: &Match,
    winner: Side,
    now: DateTime<Utc>,
) -> Result<RatingOutcome> {
    let winner_id = matchup.player(winner);
    let loser_id = matchup.player(winner.opponent());
    let before_w = tx.rating(winner_id).unwrap_or_else(|| settings.unrated(winner_id));
    let before_l = tx.rating(loser_id).unwrap_or_else(|| settings.unrated(loser_id));

    let (after_w, after_l, _) = rate_match(&before_w, &before_l, settings.rating.k_factor);
    tx.put_rating(after_w);
    tx.put_rating(after_l);

    let outcome = RatingOutcome {
        winner: RatingDelta::new(matchup.id, winner_id, before_w.rating, after_w.rating, now),
        loser: RatingDelta::new(matchup.id, loser_id, before_l.rating, after_l.rating, now),
    };
    tx.append_rating_delta(outcome.winner);
    tx.append_rating_delta(outcome.loser);
    Ok(outcome)
}
