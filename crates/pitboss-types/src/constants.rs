//! System-wide constants for the Pitboss wagering engine.

/// Score that ends a match.
pub const WINNING_SCORE: u8 = 10;

/// Highest score the losing side can finish on.
pub const MAX_LOSER_SCORE: u8 = 9;

/// Rating assigned to a player with no history.
pub const INITIAL_RATING: i32 = 1200;

/// Default Elo K-factor.
pub const DEFAULT_K_FACTOR: u32 = 32;

/// Elo logistic scale.
pub const ELO_SCALE: f64 = 400.0;

/// Payout floor as a fraction of stake, in hundredths (5%).
pub const PAYOUT_FLOOR_PERCENT: i64 = 5;

/// Payout ceiling as a multiple of stake.
pub const PAYOUT_CAP_MULTIPLE: i64 = 10;

/// Combo bonus per stack, in thousandths (1.5%).
pub const COMBO_STEP_PERMILLE: i64 = 15;

/// Maximum combo stacks counted.
pub const MAX_COMBO_STACKS: u32 = 10;

/// Multiplier for a perfect call.
pub const PERFECT_MULTIPLIER: i64 = 2;

/// Hidden multiplier sensitivity (α = 0.1), in tenths.
pub const HM_ALPHA_TENTHS: i64 = 1;

/// Hidden multiplier circulation scale (S).
pub const HM_CIRCULATION_SCALE: i64 = 100;

/// Weight kept from the previous multiplier in the EMA, in tenths (0.7).
pub const HM_EMA_RETAIN_TENTHS: i64 = 7;

/// Decimal places kept on the stored hidden multiplier.
pub const HM_PRECISION: u32 = 12;

/// Decimal places on quoted prices.
pub const PRICE_PRECISION: u32 = 8;

/// Reference price used when the external feed is unavailable.
pub const DEFAULT_FALLBACK_REFERENCE: i64 = 4000;

/// Bound on a reference-feed request, in milliseconds.
pub const DEFAULT_FEED_TIMEOUT_MS: u64 = 5000;

/// Base currency symbol.
pub const DEFAULT_BASE_SYMBOL: &str = "DSC";

/// Derived currency symbol.
pub const DEFAULT_DERIVED_SYMBOL: &str = "GPC";

/// Derived currency decimal places.
pub const DEFAULT_DERIVED_DECIMALS: u32 = 4;

/// Channel used when an adapter does not supply one.
pub const DEFAULT_CHANNEL: &str = "default";

/// Rows returned by a leaderboard.
pub const LEADERBOARD_SIZE: usize = 100;

/// Rows returned by match history when the caller gives no limit.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Pitboss";
