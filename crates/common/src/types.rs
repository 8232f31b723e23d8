use crate::error::{AddressParseError, ArithmeticOverflow};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

pub const ADDRESS_LENGTH: usize = 20;

/// Number of decimal places carried by every scaled amount
pub const DECIMALS: u8 = 18;

/// Fixed decimal factor between human units and scaled units (10^18)
pub const SCALE: Amount = 1_000_000_000_000_000_000;

/// Quantity of the asset in scaled units
pub type Amount = u128;

/// Seconds since the Unix epoch, supplied by the execution context
pub type Timestamp = u64;

// --- NewTypes ---

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Address(pub [u8; ADDRESS_LENGTH]);

impl Address {
    /// The null address. Mints originate from it and burns are sent to it.
    pub const ZERO: Address = Address([0u8; ADDRESS_LENGTH]);

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    pub fn from_slice(bytes: &[u8]) -> Self {
        let mut arr = [0u8; ADDRESS_LENGTH];
        let len = bytes.len().min(ADDRESS_LENGTH);
        arr[..len].copy_from_slice(&bytes[..len]);
        Address(arr)
    }

    /// Derive a deterministic account address for a component created by `creator`.
    ///
    /// The address is the first 20 bytes of `sha256(creator || label)`.
    pub fn derive(creator: &Address, label: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(creator.0);
        hasher.update(label);
        let digest = hasher.finalize();
        Address::from_slice(&digest[..ADDRESS_LENGTH])
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes =
            hex::decode(stripped).map_err(|e| AddressParseError::InvalidHex(e.to_string()))?;
        if bytes.len() != ADDRESS_LENGTH {
            return Err(AddressParseError::InvalidLength(bytes.len()));
        }
        Ok(Address::from_slice(&bytes))
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Convert a human quantity into scaled units.
pub fn scale(human: Amount) -> Result<Amount, ArithmeticOverflow> {
    human.checked_mul(SCALE).ok_or(ArithmeticOverflow)
}

/// Render a scaled amount as a human decimal string, trimming trailing zeros.
pub fn format_units(amount: Amount) -> String {
    let whole = amount / SCALE;
    let frac = amount % SCALE;
    if frac == 0 {
        return whole.to_string();
    }
    let digits = format!("{:0width$}", frac, width = DECIMALS as usize);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

/// Per-call facts supplied by the execution context.
///
/// Nothing in the ledger or faucet reads identity, time or the miner from ambient
/// state; all three arrive here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// Account invoking the operation
    pub caller: Address,
    /// Account credited with the block reward for this call
    pub miner: Address,
    /// Current block/wall-clock time in seconds
    pub now: Timestamp,
}

impl CallContext {
    pub fn new(caller: Address, miner: Address, now: Timestamp) -> Self {
        Self { caller, miner, now }
    }

    /// Same call, re-issued with a different caller (a component acting on its own account).
    pub fn with_caller(&self, caller: Address) -> Self {
        Self { caller, ..*self }
    }
}
