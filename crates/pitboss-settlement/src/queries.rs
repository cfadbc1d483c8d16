//! Read models.
//!
//! Every query runs against one consistent ledger snapshot.

use std::sync::Arc;

use pitboss_engine::side_totals;
use pitboss_ledger::{LedgerStore, LedgerView};
use pitboss_types::{
    ChannelId, HistoryEntry, LeaderboardEntry, LeaderboardKind, Match, MatchSnapshot,
    MatchState, PitbossError, PlayerStats, Result, User, UserId, WalletView,
    constants::{DEFAULT_HISTORY_LIMIT, LEADERBOARD_SIZE},
};
use rust_decimal::Decimal;

use crate::settings::Settings;

/// Read-only views over the ledger.
#[derive(Debug)]
pub struct Queries<S> {
    store: Arc<S>,
    settings: Settings,
}

impl<S> Clone for Queries<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            settings: self.settings.clone(),
        }
    }
}

impl<S: LedgerStore> Queries<S> {
    #[must_use]
    pub fn new(store: Arc<S>, settings: Settings) -> Self {
        Self { store, settings }
    }

    /// The channel's OPEN or LOCKED match with per-side totals of pending stakes.
    ///
    /// # Errors
    /// `NoActiveMatch` if the channel has neither.
    pub fn current_match_snapshot(&self, channel: &ChannelId) -> Result<MatchSnapshot> {
        self.store.read(|view| {
            let matchup = view
                .latest_match(channel, &[MatchState::Open, MatchState::Locked])
                .ok_or_else(|| PitbossError::NoActiveMatch(channel.clone()))?;
            let bets = view.bets_for_match(matchup.id);
            Ok(MatchSnapshot {
                p1_name: display_name(view, matchup.p1),
                p2_name: display_name(view, matchup.p2),
                totals: side_totals(&bets),
                pending_bets: bets.iter().filter(|b| b.is_pending()).count(),
                matchup,
            })
        })
    }

    /// Top players by rating, or top holders of a coin.
    ///
    /// Rating boards include every registered user, unrated ones at the
    /// initial rating. Balance boards include only positive balances.
    ///
    /// # Errors
    /// `CoinNotFound` for a balance board on an unknown coin.
    pub fn leaderboard(&self, kind: &LeaderboardKind) -> Result<Vec<LeaderboardEntry>> {
        self.store.read(|view| {
            let mut rows: Vec<(User, Decimal)> = match kind {
                LeaderboardKind::Rating => view
                    .users()
                    .into_iter()
                    .map(|u| {
                        let rating = view
                            .rating(u.id)
                            .unwrap_or_else(|| self.settings.unrated(u.id))
                            .rating;
                        (u, Decimal::from(rating))
                    })
                    .collect(),
                LeaderboardKind::Balance(symbol) => {
                    if view.coin(symbol).is_none() {
                        return Err(PitbossError::CoinNotFound(symbol.clone()));
                    }
                    view.wallets(symbol)
                        .into_iter()
                        .filter(|w| w.balance > Decimal::ZERO)
                        .filter_map(|w| view.user(w.user).map(|u| (u, w.balance)))
                        .collect()
                }
            };

            rows.sort_by(|(ua, a), (ub, b)| b.cmp(a).then_with(|| ua.key().cmp(&ub.key())));
            Ok(rows
                .into_iter()
                .take(LEADERBOARD_SIZE)
                .enumerate()
                .map(|(i, (user, value))| LeaderboardEntry {
                    rank: i + 1,
                    user: user.id,
                    username: user.username,
                    value,
                })
                .collect())
        })
    }

    /// # Errors
    /// `UserNotFound` for an unknown user.
    pub fn player_stats(&self, username: &str) -> Result<PlayerStats> {
        self.store.read(|view| {
            let user = find_user(view, username)?;
            let rating = view.rating(user.id).unwrap_or_else(|| self.settings.unrated(user.id));
            Ok(PlayerStats { user, rating })
        })
    }

    /// A player's settled matches with a result, newest first.
    ///
    /// `limit` defaults to [`DEFAULT_HISTORY_LIMIT`].
    ///
    /// # Errors
    /// `UserNotFound` for an unknown user.
    pub fn match_history(&self, username: &str, limit: Option<usize>) -> Result<Vec<HistoryEntry>> {
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        self.store.read(|view| {
            let user = find_user(view, username)?;
            Ok(view
                .matches_for_user(user.id)
                .into_iter()
                .filter(|m| m.state == MatchState::Settled && m.winner.is_some())
                .take(limit)
                .map(|m| history_entry(view, m))
                .collect())
        })
    }

    /// Every balance a user holds, by symbol.
    ///
    /// # Errors
    /// `UserNotFound` for an unknown user.
    pub fn wallet(&self, username: &str) -> Result<WalletView> {
        self.store.read(|view| {
            let user = find_user(view, username)?;
            Ok(WalletView {
                user: user.id,
                balances: view.wallets_of(user.id),
            })
        })
    }
}

fn find_user(view: &dyn LedgerView, username: &str) -> Result<User> {
    view.user_by_name(username)
        .ok_or_else(|| PitbossError::UserNotFound(username.trim().to_string()))
}

fn display_name(view: &dyn LedgerView, id: UserId) -> String {
    view.user(id).map_or_else(|| id.to_string(), |u| u.username)
}

fn history_entry(view: &dyn LedgerView, matchup: Match) -> HistoryEntry {
    let winner_name = matchup.winner.map(|side| display_name(view, matchup.player(side)));
    HistoryEntry {
        p1_name: display_name(view, matchup.p1),
        p2_name: display_name(view, matchup.p2),
        winner_name,
        matchup,
    }
}
