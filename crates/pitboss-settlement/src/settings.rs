//! Runtime settings shared by the controllers.

use pitboss_types::{ChannelId, PayoutConfig, PitbossConfig, RatingConfig, RatingRecord, Symbol, UserId};

/// The slice of [`PitbossConfig`] settlement needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Currency stakes are escrowed in and payouts are credited in.
    pub base_symbol: Symbol,
    pub default_channel: ChannelId,
    pub payout: PayoutConfig,
    pub rating: RatingConfig,
}

impl Settings {
    #[must_use]
    pub fn from_config(cfg: &PitbossConfig) -> Self {
        Self {
            base_symbol: cfg.economy.base_symbol.clone(),
            default_channel: ChannelId::new(&cfg.economy.default_channel),
            payout: cfg.payout.clone(),
            rating: cfg.rating,
        }
    }

    /// Rating row for a player who has never been rated.
    #[must_use]
    pub fn unrated(&self, user: UserId) -> RatingRecord {
        RatingRecord {
            rating: self.rating.initial_rating,
            ..RatingRecord::unrated(user)
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(&PitbossConfig::default())
    }
}
