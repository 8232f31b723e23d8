//! Append-only event log written by the ledger and the faucet.

use crate::types::{Address, Amount, Timestamp};
use serde::{Deserialize, Serialize};

/// Observable record of a state change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Balance moved between accounts. `from` is zero for mints, `to` is zero for burns.
    Transfer {
        from: Address,
        to: Address,
        amount: Amount,
    },
    /// Block reward minted to the miner of a transfer
    RewardMinted { miner: Address, amount: Amount },
    /// Spending allowance granted
    Approval {
        owner: Address,
        spender: Address,
        amount: Amount,
    },
    /// Owner changed the per-transfer block reward
    RewardChanged { reward: Amount },
    /// Owner topped up the faucet
    TokensAdded { amount: Amount },
    /// Owner changed the faucet allowance
    AllowanceChanged { amount: Amount },
    /// Owner changed the faucet cooldown
    LocktimeChanged { locktime: Timestamp },
    /// Owner drained the faucet
    Withdrawal { to: Address, amount: Amount },
}

/// Append-only sequence of events.
///
/// Entries are never removed or rewritten; sequence numbers are positions in the log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    entries: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        self.entries.push(event);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&Event> {
        self.entries.last()
    }

    /// Events appended at or after sequence number `seq`
    pub fn since(&self, seq: usize) -> &[Event] {
        self.entries.get(seq..).unwrap_or(&[])
    }
}

impl From<Vec<Event>> for EventLog {
    fn from(entries: Vec<Event>) -> Self {
        Self { entries }
    }
}

impl Extend<Event> for EventLog {
    fn extend<T: IntoIterator<Item = Event>>(&mut self, iter: T) {
        self.entries.extend(iter);
    }
}
