//! # pitboss-ledger
//!
//! **Persistence boundary for Pitboss.**
//!
//! The ledger is the single source of truth for users, matches, bets,
//! ratings, coins and wallet balances. Controllers never hold state of their
//! own; every mutation goes through [`LedgerStore::transaction`].
//!
//! ## Transaction model
//!
//! ```text
//! store.transaction(|tx| {
//!     tx.transition_match(id, LOCKED, SETTLED)?;   // compare-and-set
//!     tx.update_bet(..)?; tx.credit(..)?;           // writes
//!     Ok(receipt)
//! })                                                // commit on Ok, discard on Err
//! ```
//!
//! - **WalletBook**: per-(user, coin) balances, never negative
//! - **MemoryLedger**: serializable in-process store over `parking_lot`

pub mod memory;
pub mod store;
pub mod wallet;

pub use memory::MemoryLedger;
pub use store::{LedgerStore, LedgerTx, LedgerView};
pub use wallet::WalletBook;
