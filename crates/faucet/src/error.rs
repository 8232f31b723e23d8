//! Error types for the faucet

use neutron_common::{Address, Amount, ArithmeticOverflow, NotOwner, Timestamp};
use neutron_ledger::LedgerError;
use thiserror::Error;

/// Faucet errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FaucetError {
    #[error("Request must not originate from the zero address")]
    ZeroAddressCaller,

    #[error("Locktime not expired: next request allowed at {next_access}, now {now}")]
    LocktimeNotExpired { next_access: Timestamp, now: Timestamp },

    #[error("Insufficient faucet balance: have {have}, need {need}")]
    InsufficientFaucetBalance { have: Amount, need: Amount },

    #[error("Faucet is empty")]
    FaucetEmpty,

    #[error("Faucet draws from ledger {expected}, got {got}")]
    LedgerMismatch { expected: Address, got: Address },

    #[error(transparent)]
    NotOwner(#[from] NotOwner),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    ArithmeticOverflow(#[from] ArithmeticOverflow),
}

pub type FaucetResult<T> = Result<T, FaucetError>;
