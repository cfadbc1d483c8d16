//! Globally unique identifiers used throughout Pitboss.
//!
//! Entity IDs use UUIDv7 so that they sort by creation time, which the
//! ledger relies on for "latest match" and history ordering.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// UserId
// ---------------------------------------------------------------------------

/// Unique identifier for a community member (player and/or bettor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// MatchId
// ---------------------------------------------------------------------------

/// Unique identifier for a head-to-head match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct MatchId(pub Uuid);

impl MatchId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for MatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "match:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// BetId
// ---------------------------------------------------------------------------

/// Unique identifier for a bet row. Stable across replacements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct BetId(pub Uuid);

impl BetId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for BetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bet:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ChannelId
// ---------------------------------------------------------------------------

/// A stream channel. Each channel runs at most one open match at a time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ChannelId(pub String);

impl ChannelId {
    /// Build a channel id, trimming surrounding whitespace.
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Coin symbols (e.g., "DSC", "GPC").
pub type Symbol = String;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_id_uniqueness_and_ordering() {
        let a = MatchId::new();
        let b = MatchId::new();
        assert_ne!(a, b);
        assert!(a < b);
    }

    #[test]
    fn channel_id_trims() {
        let ch = ChannelId::new("  main-stage ");
        assert_eq!(ch.as_str(), "main-stage");
        assert_eq!(ChannelId::from("x"), ChannelId::new("x"));
    }

    #[test]
    fn display_prefixes() {
        let m = MatchId::new();
        assert!(format!("{m}").starts_with("match:"));
        let b = BetId::new();
        assert!(format!("{b}").starts_with("bet:"));
    }

    #[test]
    fn ids_serialize_as_plain_uuid() {
        let uid = UserId::new();
        let json = serde_json::to_string(&uid).unwrap();
        assert_eq!(json, format!("\"{}\"", uid.0));
    }
}
