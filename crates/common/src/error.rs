use crate::types::Address;
use thiserror::Error;

/// Raised by the shared owner check when the caller is not the stored owner
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Caller {caller} is not the owner {owner}")]
pub struct NotOwner {
    pub caller: Address,
    pub owner: Address,
}

/// An addition, subtraction or multiplication left the representable range
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[error("Arithmetic overflow")]
pub struct ArithmeticOverflow;

/// Error returned when parsing an address from text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressParseError {
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    #[error("Invalid address length: expected 20 bytes, got {0}")]
    InvalidLength(usize),
}
