//! Read models returned to adapters.
//!
//! One fixed shape per operation; adapters format these, never the reverse.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Match, RatingRecord, Symbol, User, UserId};

/// Stake totals per predicted winner for a match's pending bets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideTotals {
    pub p1: u64,
    pub p2: u64,
}

impl SideTotals {
    #[must_use]
    pub fn total(&self) -> u64 {
        self.p1 + self.p2
    }
}

/// The channel's live match with its pools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub matchup: Match,
    pub p1_name: String,
    pub p2_name: String,
    pub totals: SideTotals,
    pub pending_bets: usize,
}

/// What a leaderboard is ranked by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "symbol", rename_all = "snake_case")]
pub enum LeaderboardKind {
    Rating,
    Balance(Symbol),
}

/// One ranked row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based.
    pub rank: usize,
    pub user: UserId,
    pub username: String,
    pub value: Decimal,
}

/// A player's profile line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub user: User,
    pub rating: RatingRecord,
}

/// One past match from a player's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub matchup: Match,
    pub p1_name: String,
    pub p2_name: String,
    pub winner_name: Option<String>,
}

/// A user's balances across coins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletView {
    pub user: UserId,
    pub balances: Vec<(Symbol, Decimal)>,
}
