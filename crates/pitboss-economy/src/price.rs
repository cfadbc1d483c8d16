//! Scheduled price refresh and read-only quotes.
//!
//! ```text
//! refresh:  feed (bounded, fallback) ──▶ tx { base_price, hm EMA } ──▶ price
//! quote:    read { coin } ──▶ price
//! ```
//!
//! The feed is awaited before the ledger transaction opens; no store lock is
//! held across the network call.

use std::sync::Arc;
use std::time::Duration;

use pitboss_engine::{next_multiplier, resolve_price};
use pitboss_ledger::{LedgerStore, LedgerView};
use pitboss_types::{Coin, PitbossError, PricingConfig, Result};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::feed::ReferenceFeed;

/// Outcome of one refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceUpdate {
    pub symbol: String,
    pub price: Decimal,
    /// Reference stored as the coin's base price. `None` when pinned.
    pub reference: Option<Decimal>,
    /// Whether the fallback replaced a failed fetch.
    pub fallback: bool,
    pub hm_value: Decimal,
}

/// Prices coins from ledger state and a reference feed.
#[derive(Debug)]
pub struct PriceEngine<S, F> {
    store: Arc<S>,
    feed: F,
    pricing: PricingConfig,
}

impl<S: LedgerStore, F: ReferenceFeed> PriceEngine<S, F> {
    #[must_use]
    pub fn new(store: Arc<S>, feed: F, pricing: PricingConfig) -> Self {
        Self { store, feed, pricing }
    }

    /// Refresh a coin's reference price and hidden multiplier.
    ///
    /// Pinned coins are left untouched. A failed or slow feed falls back to
    /// the configured reference; it never fails the refresh.
    ///
    /// # Errors
    /// `CoinNotFound` for an unknown coin.
    pub async fn refresh_price(&self, symbol: &str) -> Result<PriceUpdate> {
        let coin = self.store.read(|view| find_coin(view, symbol))?;
        if coin.market.override_enabled {
            return Ok(pinned(&coin));
        }

        let (reference, fallback) = self.reference(symbol).await;

        let update = self.store.transaction(|tx| {
            let mut coin = find_coin(&*tx, symbol)?;
            // Pinned while the feed was in flight.
            if coin.market.override_enabled {
                return Ok(pinned(&coin));
            }
            coin.base_price = reference;
            if coin.market.hm_enabled {
                let circulation = tx.circulation(symbol);
                coin.market.hm_value = next_multiplier(coin.market.hm_value, circulation, &self.pricing)?;
            }
            let update = PriceUpdate {
                symbol: coin.symbol.clone(),
                price: resolve_price(&coin),
                reference: Some(reference),
                fallback,
                hm_value: coin.market.hm_value,
            };
            tx.put_coin(coin);
            Ok(update)
        })?;

        info!(
            symbol = %update.symbol,
            price = %update.price,
            reference = %reference,
            hm = %update.hm_value,
            fallback,
            "price refreshed"
        );
        Ok(update)
    }

    /// Current price from stored state. Never writes, never fetches.
    ///
    /// # Errors
    /// `CoinNotFound` for an unknown coin.
    pub fn quote_price(&self, symbol: &str) -> Result<Decimal> {
        self.store.read(|view| find_coin(view, symbol).map(|c| resolve_price(&c)))
    }

    /// Pin a coin at `price`, or unpin it with `None`.
    ///
    /// # Errors
    /// - `InvalidAmount` for a non-positive price
    /// - `CoinNotFound` for an unknown coin
    pub fn set_override(&self, symbol: &str, price: Option<Decimal>) -> Result<Coin> {
        if let Some(p) = price.filter(|p| *p <= Decimal::ZERO) {
            return Err(PitbossError::InvalidAmount {
                reason: format!("override price must be positive, got {p}"),
            });
        }
        let coin = self.store.transaction(|tx| {
            let mut coin = find_coin(&*tx, symbol)?;
            coin.market.override_enabled = price.is_some();
            if let Some(p) = price {
                coin.market.override_price = p;
            }
            tx.put_coin(coin.clone());
            Ok(coin)
        })?;
        info!(symbol, pinned = ?price, "price override changed");
        Ok(coin)
    }

    /// Turn the circulation-driven multiplier on or off. The current value
    /// is kept either way.
    ///
    /// # Errors
    /// `CoinNotFound` for an unknown coin.
    pub fn set_hidden_multiplier(&self, symbol: &str, enabled: bool) -> Result<Coin> {
        self.store.transaction(|tx| {
            let mut coin = find_coin(&*tx, symbol)?;
            coin.market.hm_enabled = enabled;
            tx.put_coin(coin.clone());
            Ok(coin)
        })
    }

    async fn reference(&self, symbol: &str) -> (Decimal, bool) {
        let timeout_ms = self.pricing.feed_timeout_ms;
        let fetched = tokio::time::timeout(Duration::from_millis(timeout_ms), self.feed.fetch_reference())
            .await
            .unwrap_or_else(|_| Err(PitbossError::FeedTimeout { timeout_ms }));

        match fetched {
            Ok(price) if price > Decimal::ZERO => (price, false),
            Ok(price) => {
                warn!(symbol, price = %price, "feed returned a non-positive price, using fallback");
                (self.pricing.fallback_reference, true)
            }
            Err(err) => {
                warn!(symbol, error = %err, fallback = %self.pricing.fallback_reference, "feed failed, using fallback");
                (self.pricing.fallback_reference, true)
            }
        }
    }
}

fn find_coin<V: LedgerView + ?Sized>(view: &V, symbol: &str) -> Result<Coin> {
    view.coin(symbol)
        .ok_or_else(|| PitbossError::CoinNotFound(symbol.to_string()))
}

fn pinned(coin: &Coin) -> PriceUpdate {
    PriceUpdate {
        symbol: coin.symbol.clone(),
        price: coin.market.override_price,
        reference: None,
        fallback: false,
        hm_value: coin.market.hm_value,
    }
}
