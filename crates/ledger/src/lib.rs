//! Capped-supply fungible asset ledger.
//!
//! Every successful transfer mints a block reward to the miner supplied by the
//! execution context, clamped so that total supply never exceeds the cap.
//!
//! # Key Types
//!
//! - [`Ledger`]: balances, allowances, supply and cap
//! - [`LedgerError`]: categorical validation failures

pub mod error;
pub mod ledger;

pub use error::{LedgerError, LedgerResult};
pub use ledger::{Ledger, TOKEN_NAME, TOKEN_SYMBOL};
