//! Owner-only access control shared by the ledger and the faucet.

use crate::error::NotOwner;
use crate::types::Address;
use serde::{Deserialize, Serialize};

/// Records the single account allowed to call restricted operations.
///
/// The owner is fixed when the component is created and has no setter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownable {
    owner: Address,
}

impl Ownable {
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn is_owner(&self, caller: &Address) -> bool {
        self.owner == *caller
    }

    /// Fail with [`NotOwner`] unless `caller` is the stored owner.
    pub fn ensure_owner(&self, caller: &Address) -> Result<(), NotOwner> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            Err(NotOwner {
                caller: *caller,
                owner: self.owner,
            })
        }
    }
}
