//! # pitboss-economy
//!
//! **Points economy** for Pitboss: a pinned, integral base coin that stakes
//! and payouts are made in, and a derived coin priced off an external
//! reference.
//!
//! ## Architecture
//!
//! 1. **seed**: installs the base and derived coins from `EconomyConfig`
//! 2. [`ReferenceFeed`]: fetches the reference price ([`HttpReferenceFeed`]
//!    in production, [`FixedFeed`] offline)
//! 3. [`PriceEngine`]: scheduled refresh with bounded feed timeout and
//!    fallback, read-only quotes, price overrides
//! 4. [`Exchange`]: buy/sell at the quoted price, and grants
//!
//! ## Refresh flow
//!
//! ```text
//! scheduler → refresh_price(symbol)
//!     → feed (timeout → fallback) → ledger tx { base_price, hm EMA } → price
//! ```

pub mod exchange;
pub mod feed;
pub mod price;
pub mod seed;

pub use exchange::{Exchange, Trade, TradeSide};
pub use feed::{FixedFeed, HttpReferenceFeed, ReferenceFeed, parse_daily_open};
pub use price::{PriceEngine, PriceUpdate};
pub use seed::{base_coin, derived_coin, seed_coins};
