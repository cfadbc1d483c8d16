//! Elo rating updates.

use pitboss_types::RatingRecord;
use pitboss_types::constants::ELO_SCALE;

/// Stored ratings after one decided match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EloOutcome {
    pub new_winner: i32,
    pub new_loser: i32,
    /// `new_winner - winner_before`.
    pub delta_winner: i32,
    /// `new_loser - loser_before`.
    pub delta_loser: i32,
}

/// Probability that a player rated `ra` beats one rated `rb`.
#[must_use]
pub fn expected_score(ra: i32, rb: i32) -> f64 {
    1.0 / (1.0 + 10f64.powf(f64::from(rb - ra) / ELO_SCALE))
}

/// Apply one win for `winner` over `loser` with factor `k`.
///
/// Each side is rounded on its own; the deltas are taken from the rounded
/// ratings so they always match what gets stored.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn update_elo(winner: i32, loser: i32, k: u32) -> EloOutcome {
    let raw = f64::from(k) * (1.0 - expected_score(winner, loser));
    let new_winner = (f64::from(winner) + raw).round() as i32;
    let new_loser = (f64::from(loser) - raw).round() as i32;
    EloOutcome {
        new_winner,
        new_loser,
        delta_winner: new_winner - winner,
        delta_loser: new_loser - loser,
    }
}

/// Rate a decided match, bumping wins and losses.
#[must_use]
pub fn rate_match(winner: &RatingRecord, loser: &RatingRecord, k: u32) -> (RatingRecord, RatingRecord, EloOutcome) {
    let outcome = update_elo(winner.rating, loser.rating, k);
    let w = RatingRecord {
        rating: outcome.new_winner,
        wins: winner.wins + 1,
        ..*winner
    };
    let l = RatingRecord {
        rating: outcome.new_loser,
        losses: loser.losses + 1,
        ..*loser
    };
    (w, l, outcome)
}
