//! Currency descriptors, pricing configuration, and wallet rows.
//!
//! The economy has a base currency (integral, pinned at 1) and a derived
//! currency whose price tracks an external reference and, optionally, a
//! circulation-driven hidden multiplier.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::{Symbol, UserId};

/// Pricing configuration for a coin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinMarket {
    /// When set, [`CoinMarket::override_price`] is the price, full stop.
    pub override_enabled: bool,
    pub override_price: Decimal,
    /// Whether the circulation-driven multiplier is applied.
    pub hm_enabled: bool,
    /// Current hidden multiplier. Stays at its last value when disabled.
    pub hm_value: Decimal,
}

impl CoinMarket {
    /// A market pinned at `price`.
    #[must_use]
    pub fn pinned(price: Decimal) -> Self {
        Self {
            override_enabled: true,
            override_price: price,
            hm_enabled: false,
            hm_value: Decimal::ONE,
        }
    }

    /// A floating market with the multiplier at 1.
    #[must_use]
    pub fn floating(hm_enabled: bool) -> Self {
        Self {
            override_enabled: false,
            override_price: Decimal::ZERO,
            hm_enabled,
            hm_value: Decimal::ONE,
        }
    }
}

/// A currency descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub symbol: Symbol,
    pub name: String,
    /// Fixed decimal places carried by balances of this coin.
    pub decimals: u32,
    /// Reference price in base-currency units, refreshed on schedule.
    pub base_price: Decimal,
    pub market: CoinMarket,
}

impl Coin {
    /// Truncate an amount to this coin's precision.
    #[must_use]
    pub fn truncate(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.decimals, RoundingStrategy::ToZero)
    }

    /// Whether `amount` is representable without rounding.
    #[must_use]
    pub fn is_representable(&self, amount: Decimal) -> bool {
        self.truncate(amount) == amount
    }
}

/// A (user, coin) balance row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletEntry {
    pub user: UserId,
    pub symbol: Symbol,
    pub balance: Decimal,
}
