//! # pitboss-engine
//!
//! **Pure settlement math for Pitboss.**
//!
//! The engine is the compute plane. It takes ledger rows and configuration
//! and returns numbers. It has:
//!
//! - **Zero side effects**: no store access, no wallet writes, no clocks
//! - **Exact money arithmetic**: payouts and prices use `rust_decimal`
//! - **Deterministic output**: same bets and result → same payouts
//!
//! Ratings are the exception to decimal-only arithmetic: Elo is not money
//! and is computed in `f64`, then rounded to stored integers.

pub mod payout;
pub mod pool;
pub mod pricing;
pub mod rating;

pub use payout::{Bonus, payout, payout_with};
pub use pool::{PoolSplit, partition, side_totals};
pub use pricing::{computed_multiplier, next_multiplier, resolve_price};
pub use rating::{EloOutcome, expected_score, rate_match, update_elo};
