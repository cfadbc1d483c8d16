//! Match lifecycle types.
//!
//! A match moves through three states and never backwards:
//!
//! ```text
//!   ┌──────┐  lock   ┌────────┐  settle  ┌─────────┐
//!   │ OPEN ├────────▶│ LOCKED ├─────────▶│ SETTLED │
//!   └──┬───┘         └────────┘          └─────────┘
//!      │ superseded by a new open match        ▲
//!      └───────────────────────────────────────┘
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ChannelId, MatchId, PitbossError, Result, UserId, constants};

/// One of the two sides of a head-to-head match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    P1,
    P2,
}

impl Side {
    /// Parse the `1 | 2` choice used by chat adapters.
    ///
    /// # Errors
    /// Returns [`PitbossError::InvalidSide`] for anything else.
    pub fn from_choice(choice: u8) -> Result<Self> {
        match choice {
            1 => Ok(Self::P1),
            2 => Ok(Self::P2),
            other => Err(PitbossError::InvalidSide(other)),
        }
    }

    #[must_use]
    pub fn opponent(self) -> Self {
        match self {
            Self::P1 => Self::P2,
            Self::P2 => Self::P1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::P1 => write!(f, "p1"),
            Self::P2 => write!(f, "p2"),
        }
    }
}

/// Lifecycle state of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchState {
    /// Accepting, replacing and refunding bets.
    Open,
    /// Betting closed; waiting for the result.
    Locked,
    /// Terminal. Either paid out or abandoned.
    Settled,
}

impl MatchState {
    /// Can a match in this state move to `target`?
    #[must_use]
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Open, Self::Locked | Self::Settled) | (Self::Locked, Self::Settled)
        )
    }
}

impl fmt::Display for MatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Locked => write!(f, "LOCKED"),
            Self::Settled => write!(f, "SETTLED"),
        }
    }
}

/// A head-to-head contest on a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub channel: ChannelId,
    pub p1: UserId,
    pub p2: UserId,
    pub state: MatchState,
    pub score_p1: u8,
    pub score_p2: u8,
    /// Set once the match is settled with a result. Abandoned matches keep `None`.
    pub winner: Option<Side>,
    pub loser_score: Option<u8>,
    pub opened_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
}

impl Match {
    /// A fresh OPEN match at 0–0.
    #[must_use]
    pub fn open(channel: ChannelId, p1: UserId, p2: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: MatchId::new(),
            channel,
            p1,
            p2,
            state: MatchState::Open,
            score_p1: 0,
            score_p2: 0,
            winner: None,
            loser_score: None,
            opened_at: now,
            settled_at: None,
        }
    }

    /// The user playing `side`.
    #[must_use]
    pub fn player(&self, side: Side) -> UserId {
        match side {
            Side::P1 => self.p1,
            Side::P2 => self.p2,
        }
    }

    /// Which side `user` plays, if any.
    #[must_use]
    pub fn side_of(&self, user: UserId) -> Option<Side> {
        if user == self.p1 {
            Some(Side::P1)
        } else if user == self.p2 {
            Some(Side::P2)
        } else {
            None
        }
    }

    /// Whether this match is between `a` and `b` in either seat order.
    #[must_use]
    pub fn is_between(&self, a: UserId, b: UserId) -> bool {
        (self.p1 == a && self.p2 == b) || (self.p1 == b && self.p2 == a)
    }

    /// Record a final result: winner at [`constants::WINNING_SCORE`], loser at `loser_score`.
    pub fn record_result(&mut self, winner: Side, loser_score: u8, now: DateTime<Utc>) {
        let (p1, p2) = match winner {
            Side::P1 => (constants::WINNING_SCORE, loser_score),
            Side::P2 => (loser_score, constants::WINNING_SCORE),
        };
        self.score_p1 = p1;
        self.score_p2 = p2;
        self.winner = Some(winner);
        self.loser_score = Some(loser_score);
        self.state = MatchState::Settled;
        self.settled_at = Some(now);
    }
}

/// Validate a loser score against the `[0, 9]` range.
///
/// # Errors
/// Returns [`PitbossError::InvalidScore`] when out of range.
pub fn check_loser_score(field: &'static str, value: u8) -> Result<u8> {
    if value > constants::MAX_LOSER_SCORE {
        return Err(PitbossError::InvalidScore {
            field,
            value: u32::from(value),
            max: u32::from(constants::MAX_LOSER_SCORE),
        });
    }
    Ok(value)
}
