//! Shared building blocks for the Neutron ledger and faucet.
//!
//! - [`types`]: addresses, scaled amounts and the per-call [`CallContext`]
//! - [`access`]: the owner check shared by every owner-restricted operation
//! - [`events`]: the append-only event log components write to
//! - [`config`] / [`utils`]: configuration and logging plumbing

pub mod access;
pub mod config;
pub mod error;
pub mod events;
pub mod types;
pub mod utils;

pub use access::Ownable;
pub use error::{ArithmeticOverflow, NotOwner};
pub use events::{Event, EventLog};
pub use types::{Address, Amount, CallContext, Timestamp, DECIMALS, SCALE};
