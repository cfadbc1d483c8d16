//! # pitboss-settlement
//!
//! **Match lifecycle, wagers, and settlement** for Pitboss.
//!
//! ## Architecture
//!
//! Controllers are stateless handles over a shared [`LedgerStore`]. Every
//! mutating operation is one ledger transaction:
//! 1. [`MatchController`]: OPEN → LOCKED → SETTLED per channel, one open
//!    match per channel, score tracking, direct result recording
//! 2. [`WagerController`]: place / replace / refund bets on an open match,
//!    with stakes escrowed out of the bettor's base wallet
//! 3. **settle**: the atomic pari-mutuel settlement shared by both
//!    settlement entry points
//! 4. [`PoolAudit`]: post-settlement checks on the receipt
//! 5. [`Queries`]: read models (snapshot, leaderboards, stats, history)
//!
//! ## Settlement flow
//!
//! ```text
//! CAS LOCKED→SETTLED → partition pending bets → payouts (engine + bonus)
//!     → bets SETTLED, winners credited → Elo + deltas → receipt
//! ```
//!
//! [`LedgerStore`]: pitboss_ledger::LedgerStore

pub mod accounts;
pub mod audit;
pub mod bonus;
pub mod escrow;
pub mod lifecycle;
pub mod queries;
pub mod settings;
pub mod settle;
pub mod telemetry;
pub mod wager;

pub use accounts::Accounts;
pub use audit::PoolAudit;
pub use bonus::{BonusPolicy, NoBonus, StreakBonus};
pub use lifecycle::{MatchController, RecordOutcome};
pub use queries::Queries;
pub use settings::Settings;
pub use telemetry::init_logging;
pub use wager::WagerController;
