//! Configuration types for a Pitboss deployment.
//!
//! Every section has a `Default` backed by [`crate::constants`], so a
//! config file only needs to name what it changes:
//!
//! ```toml
//! [rating]
//! k_factor = 24
//!
//! [pricing]
//! feed_api_key = "demo"
//! feed_timeout_ms = 2000
//! ```

use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{PitbossError, Result, constants};

/// Environment variable overriding [`RatingConfig::k_factor`].
pub const ENV_ELO_K: &str = "PITBOSS_ELO_K";

/// Environment variable overriding [`PricingConfig::feed_api_key`].
pub const ENV_FEED_API_KEY: &str = "PITBOSS_FEED_API_KEY";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PitbossConfig {
    pub economy: EconomyConfig,
    pub payout: PayoutConfig,
    pub rating: RatingConfig,
    pub pricing: PricingConfig,
    pub logging: LoggingConfig,
}

impl PitbossConfig {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    /// Returns [`PitbossError::Configuration`] on parse or validation failure.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    ///
    /// # Errors
    /// Returns [`PitbossError::Io`] if the file can't be read, or
    /// [`PitbossError::Configuration`] if it is invalid.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Apply overrides from the process environment.
    ///
    /// # Errors
    /// Returns [`PitbossError::Configuration`] if an override is malformed.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// # Errors
    /// Returns [`PitbossError::Configuration`] if an override is malformed.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_ELO_K) {
            self.rating.k_factor = raw.trim().parse().map_err(|_| {
                PitbossError::Configuration(format!("{ENV_ELO_K} must be a positive integer, got {raw:?}"))
            })?;
        }
        if let Some(key) = lookup(ENV_FEED_API_KEY).filter(|k| !k.trim().is_empty()) {
            self.pricing.feed_api_key = Some(key);
        }
        self.validate()
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    /// Returns [`PitbossError::Configuration`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| Err(PitbossError::Configuration(msg.to_string()));

        if self.economy.base_symbol.trim().is_empty() || self.economy.derived_symbol.trim().is_empty() {
            return fail("coin symbols cannot be empty");
        }
        if self.economy.base_symbol.eq_ignore_ascii_case(&self.economy.derived_symbol) {
            return fail("base and derived coin symbols must differ");
        }
        if self.economy.derived_base_price <= Decimal::ZERO {
            return fail("economy.derived_base_price must be positive");
        }
        if self.rating.k_factor == 0 {
            return fail("rating.k_factor must be greater than zero");
        }
        if self.payout.floor_ratio < Decimal::ZERO || self.payout.floor_ratio > self.payout.cap_multiple {
            return fail("payout.floor_ratio must be within [0, cap_multiple]");
        }
        if self.payout.combo_step < Decimal::ZERO || self.payout.perfect_multiplier < Decimal::ONE {
            return fail("payout multipliers cannot reduce a payout");
        }
        if self.pricing.circulation_scale <= Decimal::ZERO {
            return fail("pricing.circulation_scale must be positive");
        }
        if self.pricing.ema_retain < Decimal::ZERO || self.pricing.ema_retain > Decimal::ONE {
            return fail("pricing.ema_retain must be within [0, 1]");
        }
        if self.pricing.alpha < Decimal::ZERO {
            return fail("pricing.alpha cannot be negative");
        }
        if self.pricing.fallback_reference <= Decimal::ZERO {
            return fail("pricing.fallback_reference must be positive");
        }
        if self.pricing.feed_timeout_ms == 0 {
            return fail("pricing.feed_timeout_ms must be greater than zero");
        }
        Ok(())
    }
}

/// Currencies and channel defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Integral betting currency, pinned at a price of 1.
    pub base_symbol: String,
    pub base_name: String,
    /// Price-indexed currency.
    pub derived_symbol: String,
    pub derived_name: String,
    pub derived_decimals: u32,
    /// Seed reference price of the derived coin.
    pub derived_base_price: Decimal,
    /// Pin the derived coin at this price instead of tracking the feed.
    pub derived_override: Option<Decimal>,
    pub derived_hm_enabled: bool,
    pub default_channel: String,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            base_symbol: constants::DEFAULT_BASE_SYMBOL.to_string(),
            base_name: "Dascoin".to_string(),
            derived_symbol: constants::DEFAULT_DERIVED_SYMBOL.to_string(),
            derived_name: "GlorpCoin".to_string(),
            derived_decimals: constants::DEFAULT_DERIVED_DECIMALS,
            derived_base_price: Decimal::new(constants::DEFAULT_FALLBACK_REFERENCE, 0),
            derived_override: None,
            derived_hm_enabled: false,
            default_channel: constants::DEFAULT_CHANNEL.to_string(),
        }
    }
}

/// Pari-mutuel payout shaping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayoutConfig {
    /// Minimum payout as a fraction of stake.
    pub floor_ratio: Decimal,
    /// Maximum payout as a multiple of stake. Applied last, always.
    pub cap_multiple: Decimal,
    /// Bonus per combo stack.
    pub combo_step: Decimal,
    pub max_combo_stacks: u32,
    pub perfect_multiplier: Decimal,
}

impl Default for PayoutConfig {
    fn default() -> Self {
        Self {
            floor_ratio: Decimal::new(constants::PAYOUT_FLOOR_PERCENT, 2),
            cap_multiple: Decimal::new(constants::PAYOUT_CAP_MULTIPLE, 0),
            combo_step: Decimal::new(constants::COMBO_STEP_PERMILLE, 3),
            max_combo_stacks: constants::MAX_COMBO_STACKS,
            perfect_multiplier: Decimal::new(constants::PERFECT_MULTIPLIER, 0),
        }
    }
}

/// Elo ladder tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    pub k_factor: u32,
    pub initial_rating: i32,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            k_factor: constants::DEFAULT_K_FACTOR,
            initial_rating: constants::INITIAL_RATING,
        }
    }
}

/// Derived-currency price discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Hidden multiplier sensitivity (α).
    pub alpha: Decimal,
    /// Circulation scale (S).
    pub circulation_scale: Decimal,
    /// Weight of the previous multiplier in the EMA.
    pub ema_retain: Decimal,
    /// Reference price used when the feed fails.
    pub fallback_reference: Decimal,
    pub feed_timeout_ms: u64,
    /// Daily-series endpoint of the reference feed.
    pub feed_url: String,
    /// Instrument whose daily open is the reference.
    pub feed_symbol: String,
    /// Without a key the feed is skipped and the fallback is used.
    pub feed_api_key: Option<String>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            alpha: Decimal::new(constants::HM_ALPHA_TENTHS, 1),
            circulation_scale: Decimal::new(constants::HM_CIRCULATION_SCALE, 0),
            ema_retain: Decimal::new(constants::HM_EMA_RETAIN_TENTHS, 1),
            fallback_reference: Decimal::new(constants::DEFAULT_FALLBACK_REFERENCE, 0),
            feed_timeout_ms: constants::DEFAULT_FEED_TIMEOUT_MS,
            feed_url: "https://www.alphavantage.co/query".to_string(),
            feed_symbol: "^GSPC".to_string(),
            feed_api_key: None,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}
