//! # pitboss-types
//!
//! Shared types, errors, and configuration for the **Pitboss** wagering engine.
//!
//! This crate is the leaf dependency of the workspace. Every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`UserId`], [`MatchId`], [`BetId`], [`ChannelId`]
//! - **Match model**: [`Match`], [`MatchState`], [`Side`]
//! - **Bet model**: [`Bet`], [`BetStatus`], [`BetRequest`]
//! - **Ratings**: [`RatingRecord`], [`RatingDelta`]
//! - **Economy**: [`Coin`], [`CoinMarket`], [`WalletEntry`]
//! - **Receipts**: [`SettlementReceipt`], [`PayoutLine`]
//! - **Read models**: [`MatchSnapshot`], [`LeaderboardEntry`], [`PlayerStats`], [`HistoryEntry`]
//! - **Configuration**: [`PitbossConfig`] and its sections
//! - **Errors**: [`PitbossError`] with `PB_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod bet;
pub mod coin;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod matchup;
pub mod rating;
pub mod receipt;
pub mod snapshot;
pub mod user;

// Re-export all primary types at crate root for ergonomic imports:
//   use pitboss_types::{Bet, Match, MatchState, Side, ...};

pub use bet::*;
pub use coin::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use matchup::*;
pub use rating::*;
pub use receipt::*;
pub use snapshot::*;
pub use user::*;

// Constants are accessed via `pitboss_types::constants::FOO`
// (not re-exported to avoid name collisions).
