use crate::error::{StorageError, StorageResult};
use neutron_common::{Event, EventLog};
use neutron_faucet::Faucet;
use neutron_ledger::Ledger;
use serde::de::DeserializeOwned;
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::{Db, Transactional, Tree};
use std::path::Path;
use tracing::{debug, info};

const LEDGER_KEY: &[u8] = b"ledger";
const FAUCET_KEY: &[u8] = b"faucet";

/// Sled-backed store for the ledger record, the faucet record and the event log.
///
/// Trees:
/// - `state`: `ledger` / `faucet` -> bincode record
/// - `events`: big-endian sequence number -> bincode [`Event`]
pub struct StateStore {
    db: Db,
    state: Tree,
    events: Tree,
}

impl StateStore {
    /// Create or open the store at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        info!("Opening state database at: {}", path.as_ref().display());
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Create a store from an existing sled::Db
    pub fn from_db(db: Db) -> StorageResult<Self> {
        let state = db.open_tree("state")?;
        let events = db.open_tree("events")?;
        Ok(Self { db, state, events })
    }

    pub fn load_ledger(&self) -> StorageResult<Option<Ledger>> {
        let ledger: Option<Ledger> = self.load_record(LEDGER_KEY)?;
        if let Some(ledger) = &ledger {
            ledger
                .verify_invariants()
                .map_err(|e| StorageError::Corruption {
                    key: "ledger".to_string(),
                    reason: e.to_string(),
                })?;
        }
        Ok(ledger)
    }

    pub fn load_faucet(&self) -> StorageResult<Option<Faucet>> {
        self.load_record(FAUCET_KEY)
    }

    /// Read back the whole event log in sequence order
    pub fn load_events(&self) -> StorageResult<EventLog> {
        let mut log = EventLog::new();
        for (expected, item) in self.events.iter().enumerate() {
            let (key, value) = item?;
            let seq = decode_seq(&key)?;
            if seq != expected as u64 {
                return Err(StorageError::Corruption {
                    key: format!("event {}", seq),
                    reason: format!("expected sequence {}", expected),
                });
            }
            let event: Event = bincode::deserialize(&value)?;
            log.push(event);
        }
        Ok(log)
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Write the state records and append `new_events` in one atomic transaction.
    ///
    /// `first_seq` is the sequence number of the first new event; it must equal the
    /// number of events already stored.
    pub fn commit(
        &self,
        ledger: Option<&Ledger>,
        faucet: Option<&Faucet>,
        first_seq: usize,
        new_events: &[Event],
    ) -> StorageResult<()> {
        let ledger_bytes = ledger.map(bincode::serialize).transpose()?;
        let faucet_bytes = faucet.map(bincode::serialize).transpose()?;
        let encoded_events = new_events
            .iter()
            .enumerate()
            .map(|(i, event)| -> StorageResult<(Vec<u8>, Vec<u8>)> {
                let seq = (first_seq + i) as u64;
                Ok((seq.to_be_bytes().to_vec(), bincode::serialize(event)?))
            })
            .collect::<StorageResult<Vec<_>>>()?;

        (&self.state, &self.events)
            .transaction(|(state, events)| {
                if let Some(bytes) = &ledger_bytes {
                    state.insert(LEDGER_KEY, bytes.as_slice())?;
                }
                if let Some(bytes) = &faucet_bytes {
                    state.insert(FAUCET_KEY, bytes.as_slice())?;
                }
                for (key, value) in &encoded_events {
                    events.insert(key.as_slice(), value.as_slice())?;
                }
                Ok::<(), ConflictableTransactionError<()>>(())
            })
            .map_err(|e| match e {
                TransactionError::Abort(()) => {
                    StorageError::TransactionFailed("commit aborted".to_string())
                }
                TransactionError::Storage(err) => StorageError::Database(err),
            })?;

        self.db.flush()?;
        debug!(
            "Committed state with {} new events starting at {}",
            new_events.len(),
            first_seq
        );
        Ok(())
    }

    fn load_record<T: DeserializeOwned>(&self, key: &[u8]) -> StorageResult<Option<T>> {
        match self.state.get(key)? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }
}

fn decode_seq(key: &[u8]) -> StorageResult<u64> {
    let bytes: [u8; 8] = key.try_into().map_err(|_| StorageError::Corruption {
        key: format!("{:?}", key),
        reason: "event key is not a u64".to_string(),
    })?;
    Ok(u64::from_be_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use neutron_common::{Address, CallContext};
    use tempfile::TempDir;

    fn deploy() -> (Ledger, Faucet, EventLog) {
        let ctx = CallContext::new(Address([1; 20]), Address([9; 20]), 0);
        let mut events = EventLog::new();
        let ledger = Ledger::new(&ctx, 1_000, 1, &mut events).unwrap();
        let faucet = Faucet::new(&ctx, 10, &ledger);
        (ledger, faucet, events)
    }

    #[test]
    fn test_empty_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = StateStore::open(temp_dir.path()).unwrap();

        assert!(store.load_ledger().unwrap().is_none());
        assert!(store.load_faucet().unwrap().is_none());
        assert!(store.load_events().unwrap().is_empty());
    }

    #[test]
    fn test_commit_and_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let (ledger, faucet, events) = deploy();

        {
            let store = StateStore::open(temp_dir.path()).unwrap();
            store
                .commit(Some(&ledger), Some(&faucet), 0, events.since(0))
                .unwrap();
        }

        let store = StateStore::open(temp_dir.path()).unwrap();
        assert_eq!(store.load_ledger().unwrap(), Some(ledger));
        assert_eq!(store.load_faucet().unwrap(), Some(faucet));
        assert_eq!(store.load_events().unwrap(), events);
    }

    #[test]
    fn test_events_append_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let store = StateStore::open(temp_dir.path()).unwrap();
        let (ledger, _, _) = deploy();

        let first = [Event::TokensAdded { amount: 1 }];
        let second = [
            Event::TokensAdded { amount: 2 },
            Event::TokensAdded { amount: 3 },
        ];
        store.commit(Some(&ledger), None, 0, &first).unwrap();
        store.commit(Some(&ledger), None, 1, &second).unwrap();

        let log = store.load_events().unwrap();
        assert_eq!(store.event_count(), 3);
        assert_eq!(log.since(1), &second);
    }

    #[test]
    fn test_sequence_gap_detected() {
        let temp_dir = TempDir::new().unwrap();
        let store = StateStore::open(temp_dir.path()).unwrap();

        store
            .commit(None, None, 5, &[Event::TokensAdded { amount: 1 }])
            .unwrap();
        assert!(matches!(
            store.load_events(),
            Err(StorageError::Corruption { .. })
        ));
    }
}
