//! Coin seeding.

use pitboss_ledger::LedgerStore;
use pitboss_types::{Coin, CoinMarket, EconomyConfig, Result};
use rust_decimal::Decimal;
use tracing::info;

/// The base coin: integral and pinned at 1.
#[must_use]
pub fn base_coin(cfg: &EconomyConfig) -> Coin {
    Coin {
        symbol: cfg.base_symbol.clone(),
        name: cfg.base_name.clone(),
        decimals: 0,
        base_price: Decimal::ONE,
        market: CoinMarket::pinned(Decimal::ONE),
    }
}

/// The derived coin at its seed reference price.
#[must_use]
pub fn derived_coin(cfg: &EconomyConfig) -> Coin {
    let market = match cfg.derived_override {
        Some(price) => CoinMarket {
            override_price: price,
            override_enabled: true,
            ..CoinMarket::floating(cfg.derived_hm_enabled)
        },
        None => CoinMarket::floating(cfg.derived_hm_enabled),
    };
    Coin {
        symbol: cfg.derived_symbol.clone(),
        name: cfg.derived_name.clone(),
        decimals: cfg.derived_decimals,
        base_price: cfg.derived_base_price,
        market,
    }
}

/// Install the base and derived coins if missing. Existing coins are left
/// as they are. Returns the symbols that were created.
///
/// # Errors
/// Propagates ledger errors.
pub fn seed_coins<S: LedgerStore>(store: &S, cfg: &EconomyConfig) -> Result<Vec<String>> {
    let created = store.transaction(|tx| {
        let mut created = Vec::new();
        for coin in [base_coin(cfg), derived_coin(cfg)] {
            if tx.coin(&coin.symbol).is_none() {
                created.push(coin.symbol.clone());
                tx.put_coin(coin);
            }
        }
        Ok(created)
    })?;
    if !created.is_empty() {
        info!(coins = ?created, "coins seeded");
    }
    Ok(created)
}
