//! Wallet balances.
//!
//! Tracks one balance per (user, coin). All mutations are atomic: either
//! the full operation succeeds or the balance is unchanged. A balance never
//! goes below zero.

use std::collections::HashMap;

use pitboss_types::{PitbossError, Result, Symbol, UserId, WalletEntry};
use rust_decimal::Decimal;

/// Per-(user, coin) balances.
#[derive(Debug, Clone, Default)]
pub struct WalletBook {
    balances: HashMap<(UserId, Symbol), Decimal>,
}

impl WalletBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to a wallet, creating it if needed. Returns the new balance.
    ///
    /// # Errors
    /// Returns `InvalidAmount` if `amount` is negative or the balance would
    /// overflow.
    pub fn credit(&mut self, user: UserId, symbol: &str, amount: Decimal) -> Result<Decimal> {
        if amount < Decimal::ZERO {
            return Err(PitbossError::InvalidAmount {
                reason: format!("cannot credit negative {symbol} amount {amount}"),
            });
        }
        let entry = self.balances.entry((user, symbol.to_string())).or_default();
        *entry = entry.checked_add(amount).ok_or_else(|| PitbossError::InvalidAmount {
            reason: format!("{symbol} balance overflow crediting {amount}"),
        })?;
        Ok(*entry)
    }

    /// Remove `amount` from a wallet. Returns the new balance.
    ///
    /// # Errors
    /// Returns `InvalidAmount` if `amount` is negative, or
    /// `InsufficientBalance` if the wallet holds less than `amount`.
    pub fn debit(&mut self, user: UserId, symbol: &str, amount: Decimal) -> Result<Decimal> {
        if amount < Decimal::ZERO {
            return Err(PitbossError::InvalidAmount {
                reason: format!("cannot debit negative {symbol} amount {amount}"),
            });
        }
        let available = self.balance(user, symbol);
        if available < amount {
            return Err(PitbossError::InsufficientBalance {
                symbol: symbol.to_string(),
                needed: amount,
                available,
            });
        }
        let entry = self.balances.entry((user, symbol.to_string())).or_default();
        *entry -= amount;
        Ok(*entry)
    }

    /// Balance of a (user, coin) pair. Missing wallets read as zero.
    #[must_use]
    pub fn balance(&self, user: UserId, symbol: &str) -> Decimal {
        self.balances
            .get(&(user, symbol.to_string()))
            .copied()
            .unwrap_or_default()
    }

    /// Circulating supply: sum of every wallet of `symbol`.
    #[must_use]
    pub fn total_supply(&self, symbol: &str) -> Decimal {
        self.balances
            .iter()
            .filter(|((_, s), _)| s == symbol)
            .fold(Decimal::ZERO, |acc, (_, balance)| acc.saturating_add(*balance))
    }

    /// Every wallet of `symbol`, in no particular order.
    #[must_use]
    pub fn holders(&self, symbol: &str) -> Vec<WalletEntry> {
        self.balances
            .iter()
            .filter(|((_, s), _)| s == symbol)
            .map(|((user, s), balance)| WalletEntry {
                user: *user,
                symbol: s.clone(),
                balance: *balance,
            })
            .collect()
    }

    /// All of one user's wallets, sorted by symbol.
    #[must_use]
    pub fn wallets_of(&self, user: UserId) -> Vec<(Symbol, Decimal)> {
        let mut out: Vec<(Symbol, Decimal)> = self
            .balances
            .iter()
            .filter(|((u, _), _)| *u == user)
            .map(|((_, s), balance)| (s.clone(), *balance))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}
