//! Ledger errors

use neutron_common::{Address, Amount, ArithmeticOverflow, NotOwner};
use thiserror::Error;

/// Error during ledger operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: Amount, need: Amount },

    #[error("Insufficient allowance: have {have}, need {need}")]
    InsufficientAllowance { have: Amount, need: Amount },

    #[error("Transfer from the zero address")]
    TransferFromZeroAddress,

    #[error("Transfer to the zero address")]
    TransferToZeroAddress,

    #[error("Transfer to block miner address {0}")]
    TransferToMinerAddress(Address),

    #[error(transparent)]
    NotOwner(#[from] NotOwner),

    #[error("Invalid cap: {0}")]
    InvalidCap(String),

    #[error(transparent)]
    ArithmeticOverflow(#[from] ArithmeticOverflow),

    #[error("Ledger invariant violated: {0}")]
    InvariantViolated(String),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
