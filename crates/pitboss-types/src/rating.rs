//! Ladder rating types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{MatchId, UserId, constants};

/// A player's current ladder standing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub user: UserId,
    pub rating: i32,
    pub wins: u32,
    pub losses: u32,
}

impl RatingRecord {
    /// A player who has never been rated.
    #[must_use]
    pub fn unrated(user: UserId) -> Self {
        Self {
            user,
            rating: constants::INITIAL_RATING,
            wins: 0,
            losses: 0,
        }
    }

    #[must_use]
    pub fn games_played(&self) -> u32 {
        self.wins + self.losses
    }
}

/// Append-only audit row for one side of one settled match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingDelta {
    pub match_id: MatchId,
    pub user: UserId,
    pub before: i32,
    pub after: i32,
    /// `after - before` as stored, never the unrounded engine delta.
    pub delta: i32,
    pub recorded_at: DateTime<Utc>,
}

impl RatingDelta {
    #[must_use]
    pub fn new(match_id: MatchId, user: UserId, before: i32, after: i32, now: DateTime<Utc>) -> Self {
        Self {
            match_id,
            user,
            before,
            after,
            delta: after - before,
            recorded_at: now,
        }
    }
}
