//! Token faucet for the Neutron ledger
//!
//! The faucet is an ordinary ledger account that hands out a fixed allowance with:
//! - A per-address cooldown (locktime)
//! - Owner-only replenishment, reconfiguration and withdrawal

pub mod error;
pub mod faucet;

pub use error::{FaucetError, FaucetResult};
pub use faucet::{Faucet, RequesterState};
