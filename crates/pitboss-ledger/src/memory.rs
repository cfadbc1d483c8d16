//! In-process ledger.
//!
//! Each transaction works on a private copy of the tables while holding the
//! store lock, and the copy replaces the live tables only when the closure
//! returns `Ok`. That gives serializable isolation and all-or-nothing
//! commits at the cost of one table clone per transaction.
//!
//! Calling back into the same store from inside a transaction deadlocks.

use std::collections::HashMap;

use parking_lot::Mutex;
use pitboss_types::{
    Bet, BetId, ChannelId, Coin, Match, MatchId, MatchState, PitbossError, RatingDelta,
    RatingRecord, Result, Symbol, User, UserId, WalletEntry, username_key,
};
use rust_decimal::Decimal;
use tracing::debug;

use crate::WalletBook;
use crate::store::{LedgerStore, LedgerTx, LedgerView};

#[derive(Debug, Clone, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    usernames: HashMap<String, UserId>,
    matches: HashMap<MatchId, Match>,
    /// Insertion order, oldest first.
    match_order: Vec<MatchId>,
    bets: HashMap<BetId, Bet>,
    bet_index: HashMap<(MatchId, UserId), BetId>,
    bet_order: Vec<BetId>,
    ratings: HashMap<UserId, RatingRecord>,
    rating_deltas: Vec<RatingDelta>,
    coins: HashMap<Symbol, Coin>,
    wallets: WalletBook,
}

/// Serializable in-memory [`LedgerStore`].
#[derive(Debug, Default)]
pub struct MemoryLedger {
    tables: Mutex<Tables>,
}

impl MemoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryLedger {
    fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn LedgerTx) -> Result<T>,
    {
        let mut live = self.tables.lock();
        let mut draft = live.clone();
        match f(&mut draft) {
            Ok(out) => {
                *live = draft;
                Ok(out)
            }
            Err(err) => {
                debug!(error = %err, "ledger transaction rolled back");
                Err(err)
            }
        }
    }

    fn read<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn LedgerView) -> Result<T>,
    {
        let live = self.tables.lock();
        f(&*live)
    }
}

impl LedgerView for Tables {
    fn user(&self, id: UserId) -> Option<User> {
        self.users.get(&id).cloned()
    }

    fn user_by_name(&self, username: &str) -> Option<User> {
        self.usernames
            .get(&username_key(username))
            .and_then(|id| self.users.get(id))
            .cloned()
    }

    fn users(&self) -> Vec<User> {
        self.users.values().cloned().collect()
    }

    fn match_by_id(&self, id: MatchId) -> Option<Match> {
        self.matches.get(&id).cloned()
    }

    fn latest_match(&self, channel: &ChannelId, states: &[MatchState]) -> Option<Match> {
        self.match_order
            .iter()
            .rev()
            .filter_map(|id| self.matches.get(id))
            .find(|m| &m.channel == channel && states.contains(&m.state))
            .cloned()
    }

    fn matches_for_user(&self, user: UserId) -> Vec<Match> {
        self.match_order
            .iter()
            .rev()
            .filter_map(|id| self.matches.get(id))
            .filter(|m| m.side_of(user).is_some())
            .cloned()
            .collect()
    }

    fn bet(&self, match_id: MatchId, bettor: UserId) -> Option<Bet> {
        self.bet_index
            .get(&(match_id, bettor))
            .and_then(|id| self.bets.get(id))
            .cloned()
    }

    fn bets_for_match(&self, match_id: MatchId) -> Vec<Bet> {
        self.bet_order
            .iter()
            .filter_map(|id| self.bets.get(id))
            .filter(|b| b.match_id == match_id)
            .cloned()
            .collect()
    }

    fn bets_for_user(&self, bettor: UserId) -> Vec<Bet> {
        self.bet_order
            .iter()
            .rev()
            .filter_map(|id| self.bets.get(id))
            .filter(|b| b.bettor == bettor)
            .cloned()
            .collect()
    }

    fn rating(&self, user: UserId) -> Option<RatingRecord> {
        self.ratings.get(&user).copied()
    }

    fn ratings(&self) -> Vec<RatingRecord> {
        self.ratings.values().copied().collect()
    }

    fn rating_deltas(&self, match_id: MatchId) -> Vec<RatingDelta> {
        self.rating_deltas
            .iter()
            .filter(|d| d.match_id == match_id)
            .copied()
            .collect()
    }

    fn coin(&self, symbol: &str) -> Option<Coin> {
        self.coins.get(symbol).cloned()
    }

    fn coins(&self) -> Vec<Coin> {
        let mut coins: Vec<Coin> = self.coins.values().cloned().collect();
        coins.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        coins
    }

    fn wallet_balance(&self, user: UserId, symbol: &str) -> Decimal {
        self.wallets.balance(user, symbol)
    }

    fn wallets_of(&self, user: UserId) -> Vec<(Symbol, Decimal)> {
        self.wallets.wallets_of(user)
    }

    fn wallets(&self, symbol: &str) -> Vec<WalletEntry> {
        self.wallets.holders(symbol)
    }

    fn circulation(&self, symbol: &str) -> Decimal {
        self.wallets.total_supply(symbol)
    }
}

impl LedgerTx for Tables {
    fn insert_user(&mut self, user: User) -> Result<()> {
        let key = user.key();
        if self.usernames.contains_key(&key) {
            return Err(PitbossError::DuplicateUser(user.username));
        }
        self.usernames.insert(key, user.id);
        self.users.insert(user.id, user);
        Ok(())
    }

    fn insert_match(&mut self, matchup: Match) -> Result<()> {
        if self.matches.contains_key(&matchup.id) {
            return Err(PitbossError::InvariantViolation {
                reason: format!("{} inserted twice", matchup.id),
            });
        }
        self.match_order.push(matchup.id);
        self.matches.insert(matchup.id, matchup);
        Ok(())
    }

    fn transition_match(&mut self, id: MatchId, expected: MatchState, next: MatchState) -> Result<Match> {
        let row = self.matches.get_mut(&id).ok_or(PitbossError::MatchNotFound(id))?;
        if row.state != expected {
            if row.state == MatchState::Settled {
                return Err(PitbossError::AlreadySettled(id));
            }
            return Err(PitbossError::StateConflict {
                match_id: id,
                expected,
                actual: row.state,
            });
        }
        if !expected.can_transition_to(next) {
            return Err(PitbossError::InvariantViolation {
                reason: format!("illegal transition {expected} -> {next} for {id}"),
            });
        }
        row.state = next;
        Ok(row.clone())
    }

    fn update_match(&mut self, matchup: &Match) -> Result<()> {
        let row = self
            .matches
            .get_mut(&matchup.id)
            .ok_or(PitbossError::MatchNotFound(matchup.id))?;
        if row.state != matchup.state {
            return Err(PitbossError::StateConflict {
                match_id: matchup.id,
                expected: row.state,
                actual: matchup.state,
            });
        }
        *row = matchup.clone();
        Ok(())
    }

    fn upsert_bet(&mut self, bet: Bet, replace: bool) -> Result<Option<Bet>> {
        let key = (bet.match_id, bet.bettor);
        match self.bet_index.get(&key).copied() {
            Some(existing_id) => {
                if !replace {
                    let bettor = self
                        .users
                        .get(&bet.bettor)
                        .map_or_else(|| bet.bettor.to_string(), |u| u.username.clone());
                    return Err(PitbossError::BetExists {
                        match_id: bet.match_id,
                        bettor,
                    });
                }
                let previous = self.bets.get(&existing_id).cloned();
                let placed_at = previous.as_ref().map_or(bet.placed_at, |p| p.placed_at);
                self.bets.insert(
                    existing_id,
                    Bet {
                        id: existing_id,
                        placed_at,
                        ..bet
                    },
                );
                Ok(previous)
            }
            None => {
                self.bet_index.insert(key, bet.id);
                self.bet_order.push(bet.id);
                self.bets.insert(bet.id, bet);
                Ok(None)
            }
        }
    }

    fn update_bet(&mut self, bet: &Bet) -> Result<()> {
        let row = self.bets.get_mut(&bet.id).ok_or_else(|| PitbossError::BetNotFound {
            match_id: bet.match_id,
            bettor: bet.bettor.to_string(),
        })?;
        *row = bet.clone();
        Ok(())
    }

    fn put_rating(&mut self, record: RatingRecord) {
        self.ratings.insert(record.user, record);
    }

    fn append_rating_delta(&mut self, delta: RatingDelta) {
        self.rating_deltas.push(delta);
    }

    fn put_coin(&mut self, coin: Coin) {
        self.coins.insert(coin.symbol.clone(), coin);
    }

    fn credit(&mut self, user: UserId, symbol: &str, amount: Decimal) -> Result<Decimal> {
        self.wallets.credit(user, symbol, amount)
    }

    fn debit(&mut self, user: UserId, symbol: &str, amount: Decimal) -> Result<Decimal> {
        self.wallets.debit(user, symbol, amount)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pitboss_types::{BetRequest, BetStatus, Side};

    use super::*;

    fn seeded() -> (MemoryLedger, User, User) {
        let ledger = MemoryLedger::new();
        let a = User::new("Alice");
        let b = User::new("Bob");
        let (a2, b2) = (a.clone(), b.clone());
        ledger
            .transaction(|tx| {
                tx.insert_user(a2)?;
                tx.insert_user(b2)
            })
            .unwrap();
        (ledger, a, b)
    }

    fn open(ledger: &MemoryLedger, a: &User, b: &User) -> Match {
        let m = Match::open(ChannelId::new("main"), a.id, b.id, Utc::now());
        let row = m.clone();
        ledger.transaction(|tx| tx.insert_match(row)).unwrap();
        m
    }

    #[test]
    fn username_lookup_is_case_insensitive() {
        let (ledger, a, _) = seeded();
        let found = ledger.read(|v| Ok(v.user_by_name("  aLiCe"))).unwrap();
        assert_eq!(found.map(|u| u.id), Some(a.id));
    }

    #[test]
    fn duplicate_username_rejected() {
        let (ledger, _, _) = seeded();
        let err = ledger.transaction(|tx| tx.insert_user(User::new("ALICE"))).unwrap_err();
        assert!(matches!(err, PitbossError::DuplicateUser(_)));
    }

    #[test]
    fn failed_transaction_leaves_no_trace() {
        let (ledger, a, _) = seeded();
        let err = ledger
            .transaction(|tx| {
                tx.credit(a.id, "DSC", Decimal::from(500))?;
                tx.debit(a.id, "DSC", Decimal::from(900))
            })
            .unwrap_err();
        assert!(matches!(err, PitbossError::InsufficientBalance { .. }));
        let balance = ledger.read(|v| Ok(v.wallet_balance(a.id, "DSC"))).unwrap();
        assert_eq!(balance, Decimal::ZERO);
    }

    #[test]
    fn transition_is_compare_and_set() {
        let (ledger, a, b) = seeded();
        let m = open(&ledger, &a, &b);
        let locked = ledger
            .transaction(|tx| tx.transition_match(m.id, MatchState::Open, MatchState::Locked))
            .unwrap();
        assert_eq!(locked.state, MatchState::Locked);

        let err = ledger
            .transaction(|tx| tx.transition_match(m.id, MatchState::Open, MatchState::Locked))
            .unwrap_err();
        assert!(matches!(err, PitbossError::StateConflict { .. }));

        ledger
            .transaction(|tx| tx.transition_match(m.id, MatchState::Locked, MatchState::Settled))
            .unwrap();
        let err = ledger
            .transaction(|tx| tx.transition_match(m.id, MatchState::Locked, MatchState::Settled))
            .unwrap_err();
        assert!(matches!(err, PitbossError::AlreadySettled(_)));
    }

    #[test]
    fn latest_match_filters_by_state() {
        let (ledger, a, b) = seeded();
        let first = open(&ledger, &a, &b);
        let second = open(&ledger, &b, &a);
        let ch = ChannelId::new("main");
        let latest = ledger.read(|v| Ok(v.latest_match(&ch, &[MatchState::Open]))).unwrap();
        assert_eq!(latest.map(|m| m.id), Some(second.id));
        ledger
            .transaction(|tx| tx.transition_match(second.id, MatchState::Open, MatchState::Settled))
            .unwrap();
        let latest = ledger.read(|v| Ok(v.latest_match(&ch, &[MatchState::Open]))).unwrap();
        assert_eq!(latest.map(|m| m.id), Some(first.id));
        let other = ledger
            .read(|v| Ok(v.latest_match(&ChannelId::new("side"), &[MatchState::Open])))
            .unwrap();
        assert!(other.is_none());
    }

    #[test]
    fn upsert_without_replace_conflicts() {
        let (ledger, a, b) = seeded();
        let m = open(&ledger, &a, &b);
        let req = BetRequest::fixture(m.id, "Alice", Side::P1, 3, 100);
        let first = req.to_bet(a.id, Utc::now());
        ledger.transaction(|tx| tx.upsert_bet(first, false)).unwrap();

        let second = req.to_bet(a.id, Utc::now());
        let err = ledger.transaction(|tx| tx.upsert_bet(second, false)).unwrap_err();
        assert!(matches!(err, PitbossError::BetExists { ref bettor, .. } if bettor == "Alice"));
    }

    #[test]
    fn upsert_with_replace_keeps_row_identity() {
        let (ledger, a, b) = seeded();
        let m = open(&ledger, &a, &b);
        let first = BetRequest::fixture(m.id, "Alice", Side::P1, 3, 100).to_bet(a.id, Utc::now());
        let first_id = first.id;
        ledger.transaction(|tx| tx.upsert_bet(first, false)).unwrap();

        let replacement = BetRequest::fixture(m.id, "Alice", Side::P2, 9, 250).to_bet(a.id, Utc::now());
        let previous = ledger.transaction(|tx| tx.upsert_bet(replacement, true)).unwrap();
        assert_eq!(previous.map(|p| p.amount), Some(100));

        let rows = ledger.read(|v| Ok(v.bets_for_match(m.id))).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, first_id);
        assert_eq!(rows[0].amount, 250);
        assert_eq!(rows[0].predicted_winner, Side::P2);
        assert_eq!(rows[0].status, BetStatus::Pending);
    }

    #[test]
    fn reads_inside_transaction_see_own_writes() {
        let (ledger, a, _) = seeded();
        let seen = ledger
            .transaction(|tx| {
                tx.credit(a.id, "DSC", Decimal::from(42))?;
                Ok(tx.wallet_balance(a.id, "DSC"))
            })
            .unwrap();
        assert_eq!(seen, Decimal::from(42));
    }

    #[test]
    fn matches_for_user_newest_first() {
        let (ledger, a, b) = seeded();
        let first = open(&ledger, &a, &b);
        let second = open(&ledger, &a, &b);
        let rows = ledger.read(|v| Ok(v.matches_for_user(b.id))).unwrap();
        assert_eq!(rows.iter().map(|m| m.id).collect::<Vec<_>>(), vec![second.id, first.id]);
        let none = ledger.read(|v| Ok(v.matches_for_user(UserId::new()))).unwrap();
        assert!(none.is_empty());
    }
}
