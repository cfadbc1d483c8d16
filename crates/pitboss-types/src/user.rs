//! Community members known to the ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// A registered user. Usernames are unique case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            username: username.into().trim().to_string(),
            created_at: Utc::now(),
        }
    }

    /// Case-insensitive lookup key.
    #[must_use]
    pub fn key(&self) -> String {
        username_key(&self.username)
    }
}

/// Normalize a username for case-insensitive comparison.
#[must_use]
pub fn username_key(name: &str) -> String {
    name.trim().to_lowercase()
}
