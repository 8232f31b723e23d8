use neutron_faucet::FaucetError;
use neutron_ledger::LedgerError;
use thiserror::Error;

/// Storage specific errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Transaction aborted: {0}")]
    TransactionFailed(String),

    #[error("Corrupt record {key}: {reason}")]
    Corruption { key: String, reason: String },
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Errors surfaced by the execution context
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("{0} has not been deployed")]
    NotDeployed(&'static str),

    #[error("{0} is already deployed")]
    AlreadyDeployed(&'static str),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Faucet(#[from] FaucetError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
