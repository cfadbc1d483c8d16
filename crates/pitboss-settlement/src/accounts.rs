//! User registration and base-currency grants.

use std::sync::Arc;

use pitboss_ledger::LedgerStore;
use pitboss_types::{PitbossError, Result, User};
use rust_decimal::Decimal;
use tracing::info;

use crate::settings::Settings;

/// Registers users.
#[derive(Debug)]
pub struct Accounts<S> {
    store: Arc<S>,
    settings: Settings,
}

impl<S> Clone for Accounts<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            settings: self.settings.clone(),
        }
    }
}

impl<S: LedgerStore> Accounts<S> {
    #[must_use]
    pub fn new(store: Arc<S>, settings: Settings) -> Self {
        Self { store, settings }
    }

    /// Register a new user.
    ///
    /// # Errors
    /// - `InvalidInput` for a blank name
    /// - `DuplicateUser` if the name is taken case-insensitively
    pub fn register_user(&self, username: &str) -> Result<User> {
        let user = new_user(username)?;
        let row = user.clone();
        self.store.transaction(|tx| tx.insert_user(row))?;
        info!(user = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Look a user up, registering them on first sight.
    ///
    /// # Errors
    /// `InvalidInput` for a blank name.
    pub fn ensure_user(&self, username: &str) -> Result<User> {
        let fresh = new_user(username)?;
        self.store.transaction(|tx| {
            if let Some(existing) = tx.user_by_name(username) {
                return Ok(existing);
            }
            tx.insert_user(fresh.clone())?;
            info!(user = %fresh.id, username = %fresh.username, "user registered");
            Ok(fresh)
        })
    }

    /// Credit base currency to a user, e.g. a starting allowance.
    ///
    /// # Errors
    /// - `UserNotFound` for an unknown user
    /// - `InvalidAmount` for a zero grant
    pub fn grant_base(&self, username: &str, amount: u64) -> Result<Decimal> {
        if amount == 0 {
            return Err(PitbossError::InvalidAmount {
                reason: "grant must be greater than zero".to_string(),
            });
        }
        let symbol = &self.settings.base_symbol;
        let balance = self.store.transaction(|tx| {
            let user = tx
                .user_by_name(username)
                .ok_or_else(|| PitbossError::UserNotFound(username.trim().to_string()))?;
            tx.credit(user.id, symbol, Decimal::from(amount))
        })?;
        info!(username = %username.trim(), symbol = %symbol, amount, "base currency granted");
        Ok(balance)
    }
}

fn new_user(username: &str) -> Result<User> {
    if username.trim().is_empty() {
        return Err(PitbossError::InvalidInput {
            reason: "username required".to_string(),
        });
    }
    Ok(User::new(username))
}
