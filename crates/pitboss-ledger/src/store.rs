//! Ledger traits.
//!
//! [`LedgerView`] is the read side, [`LedgerTx`] adds writes, and
//! [`LedgerStore`] hands out transactions. A relational backend maps each
//! `LedgerTx` method onto statements inside one database transaction; the
//! guarded writes (`transition_match`, `upsert_bet`) become conditional
//! `UPDATE … WHERE state = ?` and `INSERT … ON CONFLICT` respectively.

use pitboss_types::{
    Bet, ChannelId, Coin, Match, MatchId, MatchState, RatingDelta, RatingRecord, Result, Symbol,
    User, UserId, WalletEntry,
};
use rust_decimal::Decimal;

/// Read access to ledger state.
pub trait LedgerView {
    fn user(&self, id: UserId) -> Option<User>;

    /// Case-insensitive username lookup.
    fn user_by_name(&self, username: &str) -> Option<User>;

    fn users(&self) -> Vec<User>;

    fn match_by_id(&self, id: MatchId) -> Option<Match>;

    /// Most recently opened match on `channel` whose state is in `states`.
    fn latest_match(&self, channel: &ChannelId, states: &[MatchState]) -> Option<Match>;

    /// Matches involving `user`, newest first.
    fn matches_for_user(&self, user: UserId) -> Vec<Match>;

    /// The (match, bettor) bet row, whatever its status.
    fn bet(&self, match_id: MatchId, bettor: UserId) -> Option<Bet>;

    /// Every bet row of a match, in placement order.
    fn bets_for_match(&self, match_id: MatchId) -> Vec<Bet>;

    /// Every bet row of a bettor, newest placement first.
    fn bets_for_user(&self, bettor: UserId) -> Vec<Bet>;

    fn rating(&self, user: UserId) -> Option<RatingRecord>;

    fn ratings(&self) -> Vec<RatingRecord>;

    fn rating_deltas(&self, match_id: MatchId) -> Vec<RatingDelta>;

    fn coin(&self, symbol: &str) -> Option<Coin>;

    fn coins(&self) -> Vec<Coin>;

    /// Zero for a wallet that was never written.
    fn wallet_balance(&self, user: UserId, symbol: &str) -> Decimal;

    /// All of one user's wallets, sorted by symbol.
    fn wallets_of(&self, user: UserId) -> Vec<(Symbol, Decimal)>;

    /// Every wallet of a coin.
    fn wallets(&self, symbol: &str) -> Vec<WalletEntry>;

    /// Sum of every wallet of a coin.
    fn circulation(&self, symbol: &str) -> Decimal;
}

/// Writes inside one transaction. Reads through the same handle observe
/// the transaction's own writes.
pub trait LedgerTx: LedgerView {
    /// # Errors
    /// `DuplicateUser` if the username is taken case-insensitively.
    fn insert_user(&mut self, user: User) -> Result<()>;

    /// # Errors
    /// `InvariantViolation` if the id already exists.
    fn insert_match(&mut self, matchup: Match) -> Result<()>;

    /// Compare-and-set the match state. Returns the updated row.
    ///
    /// # Errors
    /// - `MatchNotFound` if the id is unknown
    /// - `AlreadySettled` if the match is settled and `expected` is not
    /// - `StateConflict` on any other state mismatch
    fn transition_match(&mut self, id: MatchId, expected: MatchState, next: MatchState) -> Result<Match>;

    /// Overwrite a match row (scores, result fields). State changes go
    /// through [`LedgerTx::transition_match`].
    ///
    /// # Errors
    /// `MatchNotFound` if the id is unknown, `StateConflict` if `matchup`
    /// carries a different state than the stored row.
    fn update_match(&mut self, matchup: &Match) -> Result<()>;

    /// Insert the (match, bettor) row, or overwrite it when `replace` is set.
    /// The row keeps its id on overwrite. Returns the previous row, if any.
    ///
    /// # Errors
    /// `BetExists` if a row exists and `replace` is false.
    fn upsert_bet(&mut self, bet: Bet, replace: bool) -> Result<Option<Bet>>;

    /// # Errors
    /// `BetNotFound` if the row does not exist.
    fn update_bet(&mut self, bet: &Bet) -> Result<()>;

    fn put_rating(&mut self, record: RatingRecord);

    fn append_rating_delta(&mut self, delta: RatingDelta);

    /// Insert or overwrite a coin descriptor.
    fn put_coin(&mut self, coin: Coin);

    /// # Errors
    /// `InvalidAmount` if `amount` is negative.
    fn credit(&mut self, user: UserId, symbol: &str, amount: Decimal) -> Result<Decimal>;

    /// # Errors
    /// `InsufficientBalance` if the wallet cannot cover `amount`.
    fn debit(&mut self, user: UserId, symbol: &str, amount: Decimal) -> Result<Decimal>;
}

/// A ledger that runs closures as atomic transactions.
///
/// If `f` returns `Err`, none of its writes become visible. Transactions on
/// one store are serializable with respect to each other.
pub trait LedgerStore: Send + Sync {
    /// # Errors
    /// Whatever `f` returns, or `StoreUnavailable` from the backend.
    fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn LedgerTx) -> Result<T>;

    /// Run `f` against a consistent snapshot.
    ///
    /// # Errors
    /// Whatever `f` returns, or `StoreUnavailable` from the backend.
    fn read<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn LedgerView) -> Result<T>;
}
