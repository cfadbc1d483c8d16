//! Match lifecycle controller.
//!
//! ```text
//!   open ──lock──▶ locked ──settle──▶ settled
//!     └────────── superseded ──────────▲
//! ```
//!
//! Each channel has at most one OPEN match. Opening a new one abandons the
//! old: it is forced to SETTLED with no result, and its pending stakes are
//! refunded.

use std::sync::Arc;

use chrono::Utc;
use pitboss_ledger::{LedgerStore, LedgerTx};
use pitboss_types::{
    ChannelId, Match, MatchId, MatchState, PitbossError, RatingOutcome, Result, SettlementReceipt,
    Side, User, check_loser_score, constants, username_key,
};
use tracing::{info, warn};

use crate::bonus::{BonusPolicy, StreakBonus};
use crate::escrow::release_all;
use crate::settings::Settings;
use crate::settle::{apply_rating, settle_locked};

/// Result of a direct, rating-only result record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOutcome {
    pub match_id: MatchId,
    /// Whether an existing OPEN match was closed, as opposed to a new row.
    pub closed_open_match: bool,
    pub loser_score: u8,
    pub rating: RatingOutcome,
    /// Stakes returned from the closed match.
    pub refunded_bets: usize,
}

/// Owns the OPEN → LOCKED → SETTLED state machine.
#[derive(Debug)]
pub struct MatchController<S> {
    store: Arc<S>,
    settings: Settings,
    bonus: Arc<dyn BonusPolicy>,
}

impl<S> Clone for MatchController<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            settings: self.settings.clone(),
            bonus: Arc::clone(&self.bonus),
        }
    }
}

impl<S: LedgerStore> MatchController<S> {
    /// A controller using [`StreakBonus`].
    #[must_use]
    pub fn new(store: Arc<S>, settings: Settings) -> Self {
        Self {
            store,
            settings,
            bonus: Arc::new(StreakBonus::default()),
        }
    }

    #[must_use]
    pub fn with_bonus_policy(mut self, policy: Arc<dyn BonusPolicy>) -> Self {
        self.bonus = policy;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Open a match between two known players.
    ///
    /// # Errors
    /// `InvalidPlayers` if a name is blank, both names are the same
    /// case-insensitively, or either player is unknown.
    pub fn open_match(&self, channel: &ChannelId, player_a: &str, player_b: &str) -> Result<MatchId> {
        check_pair(player_a, player_b)?;
        let now = Utc::now();

        self.store.transaction(|tx| {
            let p1 = known_player(tx, player_a)?;
            let p2 = known_player(tx, player_b)?;

            while let Some(stale) = tx.latest_match(channel, &[MatchState::Open]) {
                tx.transition_match(stale.id, MatchState::Open, MatchState::Settled)?;
                let refunded = release_all(tx, &self.settings.base_symbol, stale.id, now)?;
                warn!(
                    match_id = %stale.id,
                    channel = %channel,
                    refunded = refunded.len(),
                    "open match abandoned"
                );
            }

            let matchup = Match::open(channel.clone(), p1.id, p2.id, now);
            let id = matchup.id;
            tx.insert_match(matchup)?;
            info!(match_id = %id, channel = %channel, p1 = %p1.username, p2 = %p2.username, "match opened");
            Ok(id)
        })
    }

    /// Close betting on the channel's OPEN match.
    ///
    /// # Errors
    /// `NoMatchInState` if the channel has no OPEN match.
    pub fn lock_match(&self, channel: &ChannelId) -> Result<Match> {
        self.store.transaction(|tx| {
            let open = tx
                .latest_match(channel, &[MatchState::Open])
                .ok_or_else(|| PitbossError::NoMatchInState {
                    channel: channel.clone(),
                    state: MatchState::Open,
                })?;
            let locked = tx.transition_match(open.id, MatchState::Open, MatchState::Locked)?;
            info!(match_id = %locked.id, channel = %channel, "match locked");
            Ok(locked)
        })
    }

    /// Set live scores on the channel's OPEN or LOCKED match.
    ///
    /// # Errors
    /// - `InvalidScore` if a score is above 10
    /// - `NoActiveMatch` if nothing is OPEN or LOCKED
    pub fn adjust_score(&self, channel: &ChannelId, p1_score: u8, p2_score: u8) -> Result<Match> {
        check_live_score("p1_score", p1_score)?;
        check_live_score("p2_score", p2_score)?;

        self.store.transaction(|tx| {
            let mut live = tx
                .latest_match(channel, &[MatchState::Open, MatchState::Locked])
                .ok_or_else(|| PitbossError::NoActiveMatch(channel.clone()))?;
            live.score_p1 = p1_score;
            live.score_p2 = p2_score;
            tx.update_match(&live)?;
            Ok(live)
        })
    }

    /// Settle the channel's LOCKED match.
    ///
    /// # Errors
    /// - `InvalidScore` if `loser_score` is above 9
    /// - `NoMatchInState` if the channel has no LOCKED match
    pub fn settle_match(&self, channel: &ChannelId, winner: Side, loser_score: u8) -> Result<SettlementReceipt> {
        check_loser_score("loser_score", loser_score)?;
        let now = Utc::now();

        self.store.transaction(|tx| {
            let locked = tx
                .latest_match(channel, &[MatchState::Locked])
                .ok_or_else(|| PitbossError::NoMatchInState {
                    channel: channel.clone(),
                    state: MatchState::Locked,
                })?;
            settle_locked(tx, &self.settings, self.bonus.as_ref(), locked.id, winner, loser_score, now)
        })
    }

    /// Settle a specific match.
    ///
    /// # Errors
    /// - `InvalidScore` if `loser_score` is above 9
    /// - `MatchNotFound` for an unknown id
    /// - `AlreadySettled` on a repeat call, `StateConflict` if still OPEN
    pub fn settle_match_by_id(&self, match_id: MatchId, winner: Side, loser_score: u8) -> Result<SettlementReceipt> {
        check_loser_score("loser_score", loser_score)?;
        let now = Utc::now();
        self.store.transaction(|tx| {
            settle_locked(tx, &self.settings, self.bonus.as_ref(), match_id, winner, loser_score, now)
        })
    }

    /// Record a result by player names, rating only.
    ///
    /// Closes the channel's OPEN match between the two players if there is
    /// one, refunding its stakes; otherwise records a new, already settled
    /// match with the winner as p1. `loser_score` is clamped into `[0, 9]`.
    ///
    /// # Errors
    /// - `InvalidPlayers` for blank or identical names
    /// - `UserNotFound` if either player is unknown
    pub fn record_result(&self, channel: &ChannelId, winner: &str, loser: &str, loser_score: i64) -> Result<RecordOutcome> {
        check_pair(winner, loser)?;
        let clamped = u8::try_from(loser_score.clamp(0, i64::from(constants::MAX_LOSER_SCORE)))
            .unwrap_or(constants::MAX_LOSER_SCORE);
        let now = Utc::now();

        self.store.transaction(|tx| {
            let w = tx
                .user_by_name(winner)
                .ok_or_else(|| PitbossError::UserNotFound(winner.trim().to_string()))?;
            let l = tx
                .user_by_name(loser)
                .ok_or_else(|| PitbossError::UserNotFound(loser.trim().to_string()))?;

            let open = tx
                .latest_match(channel, &[MatchState::Open])
                .filter(|m| m.is_between(w.id, l.id));

            let (mut matchup, refunded, closed) = match open {
                Some(m) => {
                    let settled = tx.transition_match(m.id, MatchState::Open, MatchState::Settled)?;
                    let refunded = release_all(tx, &self.settings.base_symbol, m.id, now)?;
                    (settled, refunded.len(), true)
                }
                None => {
                    let mut fresh = Match::open(channel.clone(), w.id, l.id, now);
                    fresh.state = MatchState::Settled;
                    tx.insert_match(fresh.clone())?;
                    (fresh, 0, false)
                }
            };

            let side = matchup.side_of(w.id).unwrap_or(Side::P1);
            matchup.record_result(side, clamped, now);
            tx.update_match(&matchup)?;
            let rating = apply_rating(tx, &self.settings, &matchup, side, now)?;

            info!(
                match_id = %matchup.id,
                channel = %channel,
                winner = %w.username,
                loser = %l.username,
                loser_score = clamped,
                winner_delta = rating.winner.delta,
                "result recorded"
            );
            Ok(RecordOutcome {
                match_id: matchup.id,
                closed_open_match: closed,
                loser_score: clamped,
                rating,
                refunded_bets: refunded,
            })
        })
    }
}

fn check_pair(a: &str, b: &str) -> Result<()> {
    if a.trim().is_empty() || b.trim().is_empty() {
        return Err(PitbossError::InvalidPlayers {
            reason: "both players are required".to_string(),
        });
    }
    if username_key(a) == username_key(b) {
        return Err(PitbossError::InvalidPlayers {
            reason: format!("{} cannot play themselves", a.trim()),
        });
    }
    Ok(())
}

fn known_player(tx: &dyn LedgerTx, name: &str) -> Result<User> {
    tx.user_by_name(name).ok_or_else(|| PitbossError::InvalidPlayers {
        reason: format!("unknown player {}", name.trim()),
    })
}

fn check_live_score(field: &'static str, value: u8) -> Result<()> {
    if value > constants::WINNING_SCORE {
        return Err(PitbossError::InvalidScore {
            field,
            value: u32::from(value),
            max: u32::from(constants::WINNING_SCORE),
        });
    }
    Ok(())
}
