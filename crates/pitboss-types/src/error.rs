//! Error types for the Pitboss wagering engine.
//!
//! All errors use the `PB_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by class:
//! - 1xx: Validation (malformed or out-of-range input)
//! - 2xx: Not found (missing entity, or not in the required state)
//! - 3xx: Conflict (duplicate bet, lost transition race, re-settlement)
//! - 7xx: Infrastructure (store, reference feed)
//! - 8xx: Invariant violations
//! - 9xx: General / internal errors

use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{ChannelId, MatchId, MatchState};

/// Coarse error class surfaced to adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    /// Retryable by the caller at the operation boundary.
    Infrastructure,
    /// A broken invariant. Never expected in a correct build.
    Fatal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "VALIDATION"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Infrastructure => write!(f, "INFRASTRUCTURE"),
            Self::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Central error enum for all Pitboss operations.
#[derive(Debug, Error)]
pub enum PitbossError {
    // =================================================================
    // Validation (1xx)
    // =================================================================
    /// Players missing, blank, or identical.
    #[error("PB_ERR_100: Invalid players: {reason}")]
    InvalidPlayers { reason: String },

    /// A score outside its allowed range.
    #[error("PB_ERR_101: Invalid {field}: {value} (allowed 0..={max})")]
    InvalidScore {
        field: &'static str,
        value: u32,
        max: u32,
    },

    /// A stake or exchange quantity that is zero, negative or unrepresentable.
    #[error("PB_ERR_102: Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// A side choice other than 1 or 2.
    #[error("PB_ERR_103: Invalid side choice: {0} (expected 1 or 2)")]
    InvalidSide(u8),

    /// The wallet cannot cover the debit.
    #[error("PB_ERR_104: Insufficient {symbol} balance: need {needed}, have {available}")]
    InsufficientBalance {
        symbol: String,
        needed: Decimal,
        available: Decimal,
    },

    /// Any other malformed input.
    #[error("PB_ERR_105: Invalid input: {reason}")]
    InvalidInput { reason: String },

    // =================================================================
    // Not found (2xx)
    // =================================================================
    /// No user with this (case-insensitive) username.
    #[error("PB_ERR_200: User not found: {0}")]
    UserNotFound(String),

    /// The channel has no match in the required state.
    #[error("PB_ERR_201: No {state} match on channel {channel}")]
    NoMatchInState { channel: ChannelId, state: MatchState },

    /// No match with this id.
    #[error("PB_ERR_202: Match not found: {0}")]
    MatchNotFound(MatchId),

    /// The bettor has no refundable bet on this match.
    #[error("PB_ERR_203: No bet by {bettor} on {match_id}")]
    BetNotFound { match_id: MatchId, bettor: String },

    /// The coin is not configured.
    #[error("PB_ERR_204: Coin not found: {0}")]
    CoinNotFound(String),

    /// The channel has no OPEN or LOCKED match.
    #[error("PB_ERR_205: No active match on channel {0}")]
    NoActiveMatch(ChannelId),

    // =================================================================
    // Conflict (3xx)
    // =================================================================
    /// A bet already exists and `replace` was not requested.
    #[error("PB_ERR_300: Bet already exists for {bettor} on {match_id}; use replace")]
    BetExists { match_id: MatchId, bettor: String },

    /// The match was not in the expected state (lost race or wrong phase).
    #[error("PB_ERR_301: {match_id} is {actual}, expected {expected}")]
    StateConflict {
        match_id: MatchId,
        expected: MatchState,
        actual: MatchState,
    },

    /// The match has already been settled.
    #[error("PB_ERR_302: Match already settled: {0}")]
    AlreadySettled(MatchId),

    /// A user with this username already exists.
    #[error("PB_ERR_303: Username already taken: {0}")]
    DuplicateUser(String),

    // =================================================================
    // Infrastructure (7xx)
    // =================================================================
    /// The reference price feed could not be read.
    #[error("PB_ERR_700: Reference feed unavailable: {reason}")]
    FeedUnavailable { reason: String },

    /// The reference price feed did not answer in time.
    #[error("PB_ERR_701: Reference feed timed out after {timeout_ms}ms")]
    FeedTimeout { timeout_ms: u64 },

    /// The ledger store failed.
    #[error("PB_ERR_702: Ledger store unavailable: {0}")]
    StoreUnavailable(String),

    // =================================================================
    // Invariants (8xx)
    // =================================================================
    /// Internal bookkeeping contradicts itself. Critical safety alert.
    #[error("PB_ERR_800: Invariant violation: {reason}")]
    InvariantViolation { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("PB_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("PB_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("PB_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// I/O error (disk, network).
    #[error("PB_ERR_903: I/O error: {0}")]
    Io(String),
}

impl PitbossError {
    /// The class adapters use to pick a response.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPlayers { .. }
            | Self::InvalidScore { .. }
            | Self::InvalidAmount { .. }
            | Self::InvalidSide(_)
            | Self::InsufficientBalance { .. }
            | Self::InvalidInput { .. }
            | Self::Configuration(_) => ErrorKind::Validation,
            Self::UserNotFound(_)
            | Self::NoMatchInState { .. }
            | Self::MatchNotFound(_)
            | Self::BetNotFound { .. }
            | Self::CoinNotFound(_)
            | Self::NoActiveMatch(_) => ErrorKind::NotFound,
            Self::BetExists { .. }
            | Self::StateConflict { .. }
            | Self::AlreadySettled(_)
            | Self::DuplicateUser(_) => ErrorKind::Conflict,
            Self::FeedUnavailable { .. }
            | Self::FeedTimeout { .. }
            | Self::StoreUnavailable(_)
            | Self::Serialization(_)
            | Self::Io(_) => ErrorKind::Infrastructure,
            Self::InvariantViolation { .. } | Self::Internal(_) => ErrorKind::Fatal,
        }
    }

    /// Whether the caller may retry the same operation unchanged.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Infrastructure
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, PitbossError>;

// Conversion from std::io::Error
impl From<std::io::Error> for PitbossError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<toml::de::Error> for PitbossError {
    fn from(err: toml::de::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}

impl From<serde_json::Error> for PitbossError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = PitbossError::MatchNotFound(MatchId::new());
        let msg = format!("{err}");
        assert!(msg.starts_with("PB_ERR_202"), "Got: {msg}");
    }

    #[test]
    fn insufficient_balance_display() {
        let err = PitbossError::InsufficientBalance {
            symbol: "DSC".into(),
            needed: Decimal::new(100, 0),
            available: Decimal::new(50, 0),
        };
        let msg = format!("{err}");
        assert!(msg.contains("PB_ERR_104"));
        assert!(msg.contains("DSC"));
        assert!(msg.contains("100"));
        assert!(msg.contains("50"));
    }

    #[test]
    fn state_conflict_display() {
        let err = PitbossError::StateConflict {
            match_id: MatchId::new(),
            expected: MatchState::Locked,
            actual: MatchState::Settled,
        };
        let msg = format!("{err}");
        assert!(msg.contains("PB_ERR_301"));
        assert!(msg.contains("LOCKED"));
        assert!(msg.contains("SETTLED"));
    }

    #[test]
    fn kinds_follow_code_groups() {
        assert_eq!(PitbossError::InvalidSide(4).kind(), ErrorKind::Validation);
        assert_eq!(
            PitbossError::UserNotFound("ghost".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            PitbossError::AlreadySettled(MatchId::new()).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            PitbossError::FeedTimeout { timeout_ms: 5 }.kind(),
            ErrorKind::Infrastructure
        );
        assert_eq!(
            PitbossError::InvariantViolation { reason: "x".into() }.kind(),
            ErrorKind::Fatal
        );
        assert!(PitbossError::StoreUnavailable("down".into()).is_retryable());
        assert!(!PitbossError::InvalidSide(0).is_retryable());
    }

    #[test]
    fn all_errors_have_pb_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(PitbossError::InvalidSide(0)),
            Box::new(PitbossError::CoinNotFound("XYZ".into())),
            Box::new(PitbossError::DuplicateUser("a".into())),
            Box::new(PitbossError::Internal("test".into())),
            Box::new(PitbossError::FeedUnavailable {
                reason: "offline".into(),
            }),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("PB_ERR_"),
                "Error missing PB_ERR_ prefix: {msg}"
            );
        }
    }
}
