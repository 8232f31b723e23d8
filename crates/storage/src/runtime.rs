//! Sequential execution context for ledger and faucet operations

use crate::error::{RuntimeError, RuntimeResult};
use crate::store::StateStore;
use neutron_common::{Address, Amount, CallContext, Event, EventLog, Timestamp};
use neutron_faucet::{Faucet, RequesterState};
use neutron_ledger::Ledger;
use tracing::{info, warn};

/// Owns the ledger, the optional faucet and the event log, and applies one
/// operation at a time.
///
/// Every operation runs against working copies; only when it succeeds (and, with a
/// store attached, the commit succeeds) do the copies replace the live state.
pub struct Runtime {
    ledger: Option<Ledger>,
    faucet: Option<Faucet>,
    events: EventLog,
    store: Option<StateStore>,
}

/// Working copies handed to an operation
struct Working<'a> {
    ledger: Option<Ledger>,
    faucet: Option<Faucet>,
    events: &'a mut EventLog,
}

impl<'a> Working<'a> {
    fn ledger(&mut self) -> RuntimeResult<&mut Ledger> {
        self.ledger.as_mut().ok_or(RuntimeError::NotDeployed("ledger"))
    }

    fn parts(&mut self) -> RuntimeResult<(&mut Ledger, &mut Faucet, &mut EventLog)> {
        let ledger = self.ledger.as_mut().ok_or(RuntimeError::NotDeployed("ledger"))?;
        let faucet = self.faucet.as_mut().ok_or(RuntimeError::NotDeployed("faucet"))?;
        Ok((ledger, faucet, &mut *self.events))
    }
}

impl Runtime {
    /// Runtime without persistence
    pub fn in_memory() -> Self {
        Self {
            ledger: None,
            faucet: None,
            events: EventLog::new(),
            store: None,
        }
    }

    /// Runtime restored from, and committing to, `store`
    pub fn with_store(store: StateStore) -> RuntimeResult<Self> {
        let ledger = store.load_ledger()?;
        let faucet = store.load_faucet()?;
        let events = store.load_events()?;
        info!(
            "Restored state: ledger={}, faucet={}, events={}",
            ledger.is_some(),
            faucet.is_some(),
            events.len()
        );
        Ok(Self {
            ledger,
            faucet,
            events,
            store: Some(store),
        })
    }

    // --- Reads ---

    pub fn ledger(&self) -> RuntimeResult<&Ledger> {
        self.ledger.as_ref().ok_or(RuntimeError::NotDeployed("ledger"))
    }

    pub fn faucet(&self) -> RuntimeResult<&Faucet> {
        self.faucet.as_ref().ok_or(RuntimeError::NotDeployed("faucet"))
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn balance_of(&self, addr: &Address) -> RuntimeResult<Amount> {
        Ok(self.ledger()?.balance_of(addr))
    }

    pub fn total_supply(&self) -> RuntimeResult<Amount> {
        Ok(self.ledger()?.total_supply())
    }

    pub fn faucet_balance(&self) -> RuntimeResult<Amount> {
        Ok(self.faucet()?.balance(self.ledger()?)?)
    }

    pub fn requester_state(&self, addr: &Address, now: Timestamp) -> RuntimeResult<RequesterState> {
        Ok(self.faucet()?.status(addr, now))
    }

    // --- Deployment ---

    pub fn deploy_token(
        &mut self,
        ctx: &CallContext,
        cap: Amount,
        reward_rate: Amount,
    ) -> RuntimeResult<Address> {
        if self.ledger.is_some() {
            return Err(RuntimeError::AlreadyDeployed("ledger"));
        }
        self.execute("deploy_token", |w| {
            let ledger = Ledger::new(ctx, cap, reward_rate, w.events)?;
            let address = ledger.address();
            w.ledger = Some(ledger);
            Ok(address)
        })
    }

    pub fn deploy_faucet(
        &mut self,
        ctx: &CallContext,
        amount_allowed: Amount,
        locktime: Option<Timestamp>,
    ) -> RuntimeResult<Address> {
        if self.faucet.is_some() {
            return Err(RuntimeError::AlreadyDeployed("faucet"));
        }
        self.execute("deploy_faucet", |w| {
            let mut faucet = Faucet::new(ctx, amount_allowed, w.ledger()?);
            if let Some(locktime) = locktime {
                faucet = faucet.with_locktime(locktime);
            }
            let address = faucet.address();
            w.faucet = Some(faucet);
            Ok(address)
        })
    }

    // --- Ledger operations ---

    pub fn transfer(&mut self, ctx: &CallContext, to: Address, amount: Amount) -> RuntimeResult<()> {
        self.execute("transfer", |w| {
            let events = &mut *w.events;
            let ledger = w.ledger.as_mut().ok_or(RuntimeError::NotDeployed("ledger"))?;
            Ok(ledger.transfer(ctx, to, amount, events)?)
        })
    }

    pub fn burn(&mut self, ctx: &CallContext, amount: Amount) -> RuntimeResult<()> {
        self.execute("burn", |w| {
            let events = &mut *w.events;
            let ledger = w.ledger.as_mut().ok_or(RuntimeError::NotDeployed("ledger"))?;
            Ok(ledger.burn(ctx, amount, events)?)
        })
    }

    pub fn set_reward(&mut self, ctx: &CallContext, new_rate: Amount) -> RuntimeResult<()> {
        self.execute("set_reward", |w| {
            let events = &mut *w.events;
            let ledger = w.ledger.as_mut().ok_or(RuntimeError::NotDeployed("ledger"))?;
            Ok(ledger.set_reward(ctx, new_rate, events)?)
        })
    }

    pub fn approve(&mut self, ctx: &CallContext, spender: Address, amount: Amount) -> RuntimeResult<()> {
        self.execute("approve", |w| {
            let events = &mut *w.events;
            let ledger = w.ledger.as_mut().ok_or(RuntimeError::NotDeployed("ledger"))?;
            Ok(ledger.approve(ctx, spender, amount, events)?)
        })
    }

    pub fn transfer_from(
        &mut self,
        ctx: &CallContext,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> RuntimeResult<()> {
        self.execute("transfer_from", |w| {
            let events = &mut *w.events;
            let ledger = w.ledger.as_mut().ok_or(RuntimeError::NotDeployed("ledger"))?;
            Ok(ledger.transfer_from(ctx, from, to, amount, events)?)
        })
    }

    pub fn burn_from(&mut self, ctx: &CallContext, from: Address, amount: Amount) -> RuntimeResult<()> {
        self.execute("burn_from", |w| {
            let events = &mut *w.events;
            let ledger = w.ledger.as_mut().ok_or(RuntimeError::NotDeployed("ledger"))?;
            Ok(ledger.burn_from(ctx, from, amount, events)?)
        })
    }

    // --- Faucet operations ---

    pub fn request_tokens(&mut self, ctx: &CallContext) -> RuntimeResult<()> {
        self.execute("request_tokens", |w| {
            let (ledger, faucet, events) = w.parts()?;
            Ok(faucet.request_tokens(ledger, ctx, events)?)
        })
    }

    pub fn add_tokens(&mut self, ctx: &CallContext, amount: Amount) -> RuntimeResult<()> {
        self.execute("add_tokens", |w| {
            let (ledger, faucet, events) = w.parts()?;
            Ok(faucet.add_tokens(ledger, ctx, amount, events)?)
        })
    }

    pub fn change_allowed_amount(&mut self, ctx: &CallContext, new_amount: Amount) -> RuntimeResult<()> {
        self.execute("change_allowed_amount", |w| {
            let (_, faucet, events) = w.parts()?;
            Ok(faucet.change_allowed_amount(ctx, new_amount, events)?)
        })
    }

    pub fn set_locktime(&mut self, ctx: &CallContext, new_locktime: Timestamp) -> RuntimeResult<()> {
        self.execute("set_locktime", |w| {
            let (_, faucet, events) = w.parts()?;
            Ok(faucet.set_locktime(ctx, new_locktime, events)?)
        })
    }

    pub fn withdraw_all_tokens(&mut self, ctx: &CallContext) -> RuntimeResult<Amount> {
        self.execute("withdraw_all_tokens", |w| {
            let (ledger, faucet, events) = w.parts()?;
            Ok(faucet.withdraw_all_tokens(ledger, ctx, events)?)
        })
    }

    /// Run `op` against working copies, then commit and swap them in.
    ///
    /// On any failure the live ledger, faucet, event log and store are left as they
    /// were.
    fn execute<T, F>(&mut self, name: &str, op: F) -> RuntimeResult<T>
    where
        F: FnOnce(&mut Working<'_>) -> RuntimeResult<T>,
    {
        let first_seq = self.events.len();
        let mut pending = EventLog::new();
        let mut working = Working {
            ledger: self.ledger.clone(),
            faucet: self.faucet.clone(),
            events: &mut pending,
        };

        let output = match op(&mut working) {
            Ok(output) => output,
            Err(err) => {
                warn!("{} rejected: {}", name, err);
                return Err(err);
            }
        };
        let Working { ledger, faucet, .. } = working;
        let new_events: Vec<Event> = pending.iter().cloned().collect();

        if let Some(store) = &self.store {
            store.commit(ledger.as_ref(), faucet.as_ref(), first_seq, &new_events)?;
        }

        self.ledger = ledger;
        self.faucet = faucet;
        self.events.extend(new_events);
        info!("{} applied", name);
        Ok(output)
    }
}
