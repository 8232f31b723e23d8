//! Persistence and execution context for the Neutron ledger and faucet.
//!
//! [`StateStore`] keeps the two state records and the event log in sled.
//! [`Runtime`] applies operations all-or-nothing and commits them atomically.

pub mod error;
pub mod runtime;
pub mod store;

pub use error::{RuntimeError, RuntimeResult, StorageError, StorageResult};
pub use runtime::Runtime;
pub use store::StateStore;
