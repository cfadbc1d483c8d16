//! Wager placement and refunds.
//!
//! Bets are accepted only while a match is OPEN. One row per
//! (match, bettor): a second placement fails unless `replace` is set, in
//! which case the row is rewritten in place and the old stake, if still
//! held, goes back to the bettor before the new one is taken.

use std::sync::Arc;

use chrono::Utc;
use pitboss_ledger::{LedgerStore, LedgerTx};
use pitboss_types::{
    Bet, BetRequest, ChannelId, Match, MatchId, MatchState, PitbossError, Result, Side,
};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::escrow::{hold_stake, release_stake};
use crate::settings::Settings;

/// Places, replaces and refunds bets.
#[derive(Debug)]
pub struct WagerController<S> {
    store: Arc<S>,
    settings: Settings,
}

impl<S> Clone for WagerController<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            settings: self.settings.clone(),
        }
    }
}

impl<S: LedgerStore> WagerController<S> {
    #[must_use]
    pub fn new(store: Arc<S>, settings: Settings) -> Self {
        Self { store, settings }
    }

    /// Place or replace a bet.
    ///
    /// Returns the stored row. On replace the row keeps its id and
    /// placement time.
    ///
    /// # Errors
    /// - `InvalidAmount`, `InvalidScore`, `InvalidInput` from request validation
    /// - `UserNotFound` for an unknown bettor
    /// - `MatchNotFound`, or `StateConflict` if the match is not OPEN
    /// - `BetExists` if a row exists and `replace` is false
    /// - `InsufficientBalance` if the wallet cannot cover the stake
    pub fn place_bet(&self, req: &BetRequest) -> Result<Bet> {
        req.validate()?;
        let bet = self.store.transaction(|tx| self.place_in_tx(tx, req))?;
        info!(
            match_id = %bet.match_id,
            bettor = %req.bettor.trim(),
            winner = %bet.predicted_winner,
            loser_score = bet.predicted_loser_score,
            amount = bet.amount,
            replace = req.replace,
            "bet placed"
        );
        Ok(bet)
    }

    /// Place a bet on the channel's OPEN match.
    ///
    /// # Errors
    /// `NoMatchInState` if the channel has no OPEN match, otherwise as
    /// [`Self::place_bet`].
    pub fn place_current_bet(
        &self,
        channel: &ChannelId,
        bettor: &str,
        predicted_winner: Side,
        predicted_loser_score: u8,
        amount: u64,
        replace: bool,
    ) -> Result<Bet> {
        let open = self.open_match(channel)?;
        self.place_bet(&BetRequest {
            match_id: open.id,
            bettor: bettor.to_string(),
            predicted_winner,
            predicted_loser_score,
            amount,
            replace,
        })
    }

    /// Withdraw a pending bet and return its stake.
    ///
    /// # Errors
    /// - `UserNotFound` for an unknown bettor
    /// - `MatchNotFound`, or `StateConflict` if the match is not OPEN
    /// - `BetNotFound` if the bettor has no pending bet on the match
    pub fn refund_bet(&self, match_id: MatchId, bettor: &str) -> Result<Bet> {
        let now = Utc::now();
        let refunded = self.store.transaction(|tx| {
            let user = tx
                .user_by_name(bettor)
                .ok_or_else(|| PitbossError::UserNotFound(bettor.trim().to_string()))?;
            require_open(tx, match_id)?;
            let bet = tx
                .bet(match_id, user.id)
                .filter(Bet::is_pending)
                .ok_or_else(|| PitbossError::BetNotFound {
                    match_id,
                    bettor: user.username.clone(),
                })?;
            release_stake(tx, &self.settings.base_symbol, &bet, now)
        })?;
        info!(match_id = %match_id, bettor = %bettor.trim(), amount = refunded.amount, "bet refunded");
        Ok(refunded)
    }

    /// Refund the bettor's pending bet on the channel's OPEN match.
    ///
    /// # Errors
    /// `NoMatchInState` if the channel has no OPEN match, otherwise as
    /// [`Self::refund_bet`].
    pub fn refund_current_bet(&self, channel: &ChannelId, bettor: &str) -> Result<Bet> {
        let open = self.open_match(channel)?;
        self.refund_bet(open.id, bettor)
    }

    fn open_match(&self, channel: &ChannelId) -> Result<Match> {
        self.store.read(|view| {
            view.latest_match(channel, &[MatchState::Open])
                .ok_or_else(|| PitbossError::NoMatchInState {
                    channel: channel.clone(),
                    state: MatchState::Open,
                })
        })
    }

    fn place_in_tx(&self, tx: &mut dyn LedgerTx, req: &BetRequest) -> Result<Bet> {
        let now = Utc::now();
        let user = tx
            .user_by_name(&req.bettor)
            .ok_or_else(|| PitbossError::UserNotFound(req.bettor.trim().to_string()))?;
        require_open(tx, req.match_id)?;

        let symbol = &self.settings.base_symbol;
        let previous = tx.upsert_bet(req.to_bet(user.id, now), req.replace)?;
        if let Some(prev) = previous.as_ref().filter(|p| p.is_pending()) {
            tx.credit(user.id, symbol, Decimal::from(prev.amount))?;
            debug!(bet = %prev.id, amount = prev.amount, "replaced stake returned");
        }
        hold_stake(tx, symbol, user.id, req.amount)?;

        tx.bet(req.match_id, user.id)
            .ok_or_else(|| PitbossError::InvariantViolation {
                reason: format!("bet by {} on {} vanished after write", user.username, req.match_id),
            })
    }
}

fn require_open(tx: &dyn LedgerTx, match_id: MatchId) -> Result<Match> {
    let matchup = tx
        .match_by_id(match_id)
        .ok_or(PitbossError::MatchNotFound(match_id))?;
    if matchup.state != MatchState::Open {
        return Err(PitbossError::StateConflict {
            match_id,
            expected: MatchState::Open,
            actual: matchup.state,
        });
    }
    Ok(matchup)
}

#[cfg(test)]
mod tests {
    use pitboss_ledger::{LedgerView, MemoryLedger};
    use pitboss_types::{BetStatus, User, UserId};

    use super::*;
    use crate::lifecycle::MatchController;

    struct Rig {
        store: Arc<MemoryLedger>,
        matches: MatchController<MemoryLedger>,
        wagers: WagerController<MemoryLedger>,
        match_id: MatchId,
        alice: UserId,
    }

    fn rig() -> Rig {
        let store = Arc::new(MemoryLedger::new());
        let alice = User::new("Alice");
        let alice_id = alice.id;
        store
            .transaction(|tx| {
                tx.insert_user(User::new("Glorp"))?;
                tx.insert_user(User::new("Zorb"))?;
                tx.insert_user(alice)?;
                tx.credit(alice_id, "DSC", Decimal::from(1000))?;
                Ok(())
            })
            .unwrap();
        let matches = MatchController::new(Arc::clone(&store), Settings::default());
        let wagers = WagerController::new(Arc::clone(&store), Settings::default());
        let match_id = matches.open_match(&ChannelId::new("main"), "Glorp", "Zorb").unwrap();
        Rig {
            store,
            matches,
            wagers,
            match_id,
            alice: alice_id,
        }
    }

    fn balance(rig: &Rig) -> Decimal {
        rig.store.read(|v| Ok(v.wallet_balance(rig.alice, "DSC"))).unwrap()
    }

    #[test]
    fn place_escrows_stake() {
        let rig = rig();
        let bet = rig
            .wagers
            .place_bet(&BetRequest::fixture(rig.match_id, "alice", Side::P1, 4, 300))
            .unwrap();
        assert_eq!(bet.status, BetStatus::Pending);
        assert_eq!(bet.bettor, rig.alice);
        assert_eq!(balance(&rig), Decimal::from(700));
    }

    #[test]
    fn second_placement_without_replace_conflicts() {
        let rig = rig();
        let req = BetRequest::fixture(rig.match_id, "Alice", Side::P1, 4, 300);
        rig.wagers.place_bet(&req).unwrap();
        let err = rig.wagers.place_bet(&req).unwrap_err();
        assert!(matches!(err, PitbossError::BetExists { ref bettor, .. } if bettor == "Alice"));
        assert_eq!(balance(&rig), Decimal::from(700));
    }

    #[test]
    fn replace_rewrites_row_and_swaps_stake() {
        let rig = rig();
        let first = rig
            .wagers
            .place_bet(&BetRequest::fixture(rig.match_id, "alice", Side::P1, 4, 300))
            .unwrap();
        let mut req = BetRequest::fixture(rig.match_id, "alice", Side::P2, 9, 900);
        req.replace = true;
        let second = rig.wagers.place_bet(&req).unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.placed_at, first.placed_at);
        assert_eq!((second.predicted_winner, second.predicted_loser_score), (Side::P2, 9));
        assert_eq!(balance(&rig), Decimal::from(100));
        let rows = rig.store.read(|v| Ok(v.bets_for_match(rig.match_id))).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn replace_is_idempotent() {
        let rig = rig();
        let mut req = BetRequest::fixture(rig.match_id, "alice", Side::P1, 2, 250);
        req.replace = true;
        for _ in 0..3 {
            rig.wagers.place_bet(&req).unwrap();
        }
        assert_eq!(balance(&rig), Decimal::from(750));
    }

    #[test]
    fn insufficient_balance_rolls_back() {
        let rig = rig();
        let err = rig
            .wagers
            .place_bet(&BetRequest::fixture(rig.match_id, "alice", Side::P1, 4, 5000))
            .unwrap_err();
        assert!(matches!(err, PitbossError::InsufficientBalance { .. }));
        let rows = rig.store.read(|v| Ok(v.bets_for_match(rig.match_id))).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn locked_match_rejects_bets() {
        let rig = rig();
        rig.matches.lock_match(&ChannelId::new("main")).unwrap();
        let err = rig
            .wagers
            .place_bet(&BetRequest::fixture(rig.match_id, "alice", Side::P1, 4, 10))
            .unwrap_err();
        assert!(matches!(err, PitbossError::StateConflict { actual: MatchState::Locked, .. }));
    }

    #[test]
    fn unknown_bettor_and_match() {
        let rig = rig();
        let err = rig
            .wagers
            .place_bet(&BetRequest::fixture(rig.match_id, "nobody", Side::P1, 4, 10))
            .unwrap_err();
        assert!(matches!(err, PitbossError::UserNotFound(_)));
        let err = rig
            .wagers
            .place_bet(&BetRequest::fixture(MatchId::new(), "alice", Side::P1, 4, 10))
            .unwrap_err();
        assert!(matches!(err, PitbossError::MatchNotFound(_)));
    }

    #[test]
    fn refund_returns_stake_once() {
        let rig = rig();
        rig.wagers
            .place_bet(&BetRequest::fixture(rig.match_id, "alice", Side::P1, 4, 300))
            .unwrap();
        let refunded = rig.wagers.refund_bet(rig.match_id, "ALICE").unwrap();
        assert_eq!(refunded.status, BetStatus::Refunded);
        assert_eq!(refunded.payout, Some(0));
        assert_eq!(balance(&rig), Decimal::from(1000));

        let err = rig.wagers.refund_bet(rig.match_id, "alice").unwrap_err();
        assert!(matches!(err, PitbossError::BetNotFound { .. }));
    }

    #[test]
    fn refunded_row_still_needs_replace() {
        let rig = rig();
        let req = BetRequest::fixture(rig.match_id, "alice", Side::P1, 4, 300);
        rig.wagers.place_bet(&req).unwrap();
        rig.wagers.refund_bet(rig.match_id, "alice").unwrap();
        assert!(matches!(rig.wagers.place_bet(&req), Err(PitbossError::BetExists { .. })));

        let again = rig.wagers.place_bet(&BetRequest { replace: true, ..req }).unwrap();
        assert_eq!(again.status, BetStatus::Pending);
        assert_eq!(balance(&rig), Decimal::from(700));
    }

    #[test]
    fn current_bet_helpers_follow_open_match() {
        let rig = rig();
        let channel = ChannelId::new("main");
        let bet = rig
            .wagers
            .place_current_bet(&channel, "alice", Side::P2, 0, 100, false)
            .unwrap();
        assert_eq!(bet.match_id, rig.match_id);
        rig.wagers.refund_current_bet(&channel, "alice").unwrap();

        let err = rig
            .wagers
            .place_current_bet(&ChannelId::new("elsewhere"), "alice", Side::P2, 0, 100, false)
            .unwrap_err();
        assert!(matches!(err, PitbossError::NoMatchInState { state: MatchState::Open, .. }));
    }
}
