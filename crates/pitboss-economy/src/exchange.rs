//! Base ↔ derived currency exchange and grants.
//!
//! Trades execute at the quoted price, never refreshing it. Quantities are
//! truncated to the coin's precision. The base side is rounded in the
//! house's favour: buy costs round up, sell proceeds round down.

use std::sync::Arc;

use pitboss_engine::resolve_price;
use pitboss_ledger::{LedgerStore, LedgerTx};
use pitboss_types::{Coin, PitbossError, Result, User, UserId};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Direction of a trade, from the user's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// A completed exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub user: UserId,
    pub side: TradeSide,
    pub symbol: String,
    /// Derived-coin quantity actually traded.
    pub quantity: Decimal,
    pub price: Decimal,
    /// Base currency paid (buy) or received (sell).
    pub base_amount: Decimal,
}

/// Moves value between the base coin and priced coins.
#[derive(Debug)]
pub struct Exchange<S> {
    store: Arc<S>,
    base_symbol: String,
}

impl<S: LedgerStore> Exchange<S> {
    #[must_use]
    pub fn new(store: Arc<S>, base_symbol: impl Into<String>) -> Self {
        Self {
            store,
            base_symbol: base_symbol.into(),
        }
    }

    /// Buy `quantity` of `symbol` with base currency.
    ///
    /// # Errors
    /// - `InvalidAmount` if the quantity truncates to zero or its cost overflows
    /// - `InvalidInput` when trading the base coin against itself
    /// - `UserNotFound`, `CoinNotFound`
    /// - `InsufficientBalance` if the base wallet cannot cover the cost
    pub fn buy(&self, username: &str, symbol: &str, quantity: Decimal) -> Result<Trade> {
        self.trade(username, symbol, quantity, TradeSide::Buy)
    }

    /// Sell `quantity` of `symbol` for base currency.
    ///
    /// # Errors
    /// As [`Self::buy`], with `InsufficientBalance` on the coin wallet.
    pub fn sell(&self, username: &str, symbol: &str, quantity: Decimal) -> Result<Trade> {
        self.trade(username, symbol, quantity, TradeSide::Sell)
    }

    /// Credit `amount` of any coin to a user.
    ///
    /// # Errors
    /// - `InvalidAmount` if `amount` is not positive or exceeds the coin's precision
    /// - `UserNotFound`, `CoinNotFound`
    pub fn grant(&self, username: &str, symbol: &str, amount: Decimal) -> Result<Decimal> {
        let balance = self.store.transaction(|tx| {
            let user = find_user(&*tx, username)?;
            let coin = find_coin(&*tx, symbol)?;
            if amount <= Decimal::ZERO || !coin.is_representable(amount) {
                return Err(PitbossError::InvalidAmount {
                    reason: format!("cannot grant {amount} {symbol} ({} decimals)", coin.decimals),
                });
            }
            tx.credit(user.id, symbol, amount)
        })?;
        info!(username = %username.trim(), symbol, amount = %amount, "granted");
        Ok(balance)
    }

    fn trade(&self, username: &str, symbol: &str, quantity: Decimal, side: TradeSide) -> Result<Trade> {
        if symbol == self.base_symbol {
            return Err(PitbossError::InvalidInput {
                reason: format!("{symbol} is the base coin"),
            });
        }
        let trade = self.store.transaction(|tx| {
            let user = find_user(&*tx, username)?;
            let coin = find_coin(&*tx, symbol)?;
            let base = find_coin(&*tx, &self.base_symbol)?;

            let quantity = coin.truncate(quantity);
            if quantity <= Decimal::ZERO {
                return Err(PitbossError::InvalidAmount {
                    reason: format!("quantity must be at least one {symbol} unit"),
                });
            }
            let price = resolve_price(&coin);
            let gross = price.checked_mul(quantity).ok_or_else(|| PitbossError::InvalidAmount {
                reason: format!("{quantity} {symbol} at {price} is out of range"),
            })?;
            let base_amount = match side {
                TradeSide::Buy => gross.round_dp_with_strategy(base.decimals, RoundingStrategy::AwayFromZero),
                TradeSide::Sell => gross.round_dp_with_strategy(base.decimals, RoundingStrategy::ToZero),
            };

            settle_trade(tx, &user, &coin, &self.base_symbol, side, quantity, base_amount)?;
            Ok(Trade {
                user: user.id,
                side,
                symbol: coin.symbol,
                quantity,
                price,
                base_amount,
            })
        })?;
        info!(
            username = %username.trim(),
            side = ?trade.side,
            symbol = %trade.symbol,
            quantity = %trade.quantity,
            price = %trade.price,
            base_amount = %trade.base_amount,
            "trade executed"
        );
        Ok(trade)
    }
}

fn settle_trade(
    tx: &mut dyn LedgerTx,
    user: &User,
    coin: &Coin,
    base_symbol: &str,
    side: TradeSide,
    quantity: Decimal,
    base_amount: Decimal,
) -> Result<()> {
    match side {
        TradeSide::Buy => {
            tx.debit(user.id, base_symbol, base_amount)?;
            tx.credit(user.id, &coin.symbol, quantity)?;
        }
        TradeSide::Sell => {
            tx.debit(user.id, &coin.symbol, quantity)?;
            tx.credit(user.id, base_symbol, base_amount)?;
        }
    }
    Ok(())
}

fn find_user(tx: &dyn LedgerTx, username: &str) -> Result<User> {
    tx.user_by_name(username)
        .ok_or_else(|| PitbossError::UserNotFound(username.trim().to_string()))
}

fn find_coin(tx: &dyn LedgerTx, symbol: &str) -> Result<Coin> {
    tx.coin(symbol)
        .ok_or_else(|| PitbossError::CoinNotFound(symbol.to_string()))
}
