//! Faucet core logic

use super::error::{FaucetError, FaucetResult};
use neutron_common::config::DEFAULT_LOCKTIME;
use neutron_common::{Address, Amount, ArithmeticOverflow, CallContext, Event, EventLog, Ownable, Timestamp};
use neutron_ledger::Ledger;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Per-requester state derived from `next_access_time`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequesterState {
    /// A request would pass the cooldown check
    Eligible,
    /// Requests are refused until `until`
    Cooling { until: Timestamp },
}

/// Faucet handing out `amount_allowed` from its own ledger account.
///
/// The faucet keeps no balance of its own; it reads and moves funds through the
/// ledger it was deployed against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faucet {
    address: Address,
    token: Address,
    access: Ownable,
    amount_allowed: Amount,
    locktime: Timestamp,
    next_access_time: BTreeMap<Address, Timestamp>,
}

impl Faucet {
    /// Deploy a faucet owned by `ctx.caller`, drawing from `ledger`.
    pub fn new(ctx: &CallContext, amount_allowed: Amount, ledger: &Ledger) -> Self {
        let token = ledger.address();
        let mut label = b"neutron-faucet".to_vec();
        label.extend_from_slice(&token.0);
        label.extend_from_slice(&ctx.now.to_be_bytes());
        label.extend_from_slice(&amount_allowed.to_be_bytes());

        let faucet = Self {
            address: Address::derive(&ctx.caller, &label),
            token,
            access: Ownable::new(ctx.caller),
            amount_allowed,
            locktime: DEFAULT_LOCKTIME,
            next_access_time: BTreeMap::new(),
        };

        info!(
            "Faucet {} deployed: owner={}, token={}, amount_allowed={}",
            faucet.address, ctx.caller, token, amount_allowed
        );
        faucet
    }

    /// Set the initial cooldown at construction time
    pub fn with_locktime(mut self, locktime: Timestamp) -> Self {
        self.locktime = locktime;
        self
    }

    // --- Reads ---

    /// The faucet's own ledger account
    pub fn address(&self) -> Address {
        self.address
    }

    /// Address of the ledger this faucet draws from
    pub fn token(&self) -> Address {
        self.token
    }

    pub fn owner(&self) -> Address {
        self.access.owner()
    }

    pub fn amount_allowed(&self) -> Amount {
        self.amount_allowed
    }

    pub fn locktime(&self) -> Timestamp {
        self.locktime
    }

    /// Earliest time `addr` may request again; 0 for addresses that never requested
    pub fn next_access_time(&self, addr: &Address) -> Timestamp {
        self.next_access_time.get(addr).copied().unwrap_or(0)
    }

    pub fn status(&self, addr: &Address, now: Timestamp) -> RequesterState {
        let until = self.next_access_time(addr);
        if now < until {
            RequesterState::Cooling { until }
        } else {
            RequesterState::Eligible
        }
    }

    /// Faucet balance as recorded by the ledger
    pub fn balance(&self, ledger: &Ledger) -> FaucetResult<Amount> {
        self.ensure_ledger(ledger)?;
        Ok(ledger.balance_of(&self.address))
    }

    // --- Operations ---

    /// Hand `amount_allowed` to `ctx.caller` and start its cooldown.
    pub fn request_tokens(
        &mut self,
        ledger: &mut Ledger,
        ctx: &CallContext,
        events: &mut EventLog,
    ) -> FaucetResult<()> {
        self.ensure_ledger(ledger)?;
        let requester = ctx.caller;

        if requester.is_zero() {
            return Err(FaucetError::ZeroAddressCaller);
        }

        let next_access = self.next_access_time(&requester);
        if ctx.now < next_access {
            warn!("Address {} requested too soon, next access at {}", requester, next_access);
            return Err(FaucetError::LocktimeNotExpired {
                next_access,
                now: ctx.now,
            });
        }

        let have = ledger.balance_of(&self.address);
        if have < self.amount_allowed {
            return Err(FaucetError::InsufficientFaucetBalance {
                have,
                need: self.amount_allowed,
            });
        }

        let until = ctx
            .now
            .checked_add(self.locktime)
            .ok_or(ArithmeticOverflow)?;

        ledger.transfer(
            &ctx.with_caller(self.address),
            requester,
            self.amount_allowed,
            events,
        )?;
        self.next_access_time.insert(requester, until);

        info!(
            "Dispensed {} to {}, next access at {}",
            self.amount_allowed, requester, until
        );
        Ok(())
    }

    /// Owner-only. Move `amount` from the owner's ledger balance into the faucet.
    pub fn add_tokens(
        &mut self,
        ledger: &mut Ledger,
        ctx: &CallContext,
        amount: Amount,
        events: &mut EventLog,
    ) -> FaucetResult<()> {
        self.ensure_ledger(ledger)?;
        self.access.ensure_owner(&ctx.caller)?;

        ledger.transfer(ctx, self.address, amount, events)?;
        events.push(Event::TokensAdded { amount });

        info!("Faucet replenished with {}", amount);
        Ok(())
    }

    /// Owner-only.
    pub fn change_allowed_amount(
        &mut self,
        ctx: &CallContext,
        new_amount: Amount,
        events: &mut EventLog,
    ) -> FaucetResult<()> {
        self.access.ensure_owner(&ctx.caller)?;
        self.amount_allowed = new_amount;
        events.push(Event::AllowanceChanged { amount: new_amount });
        debug!("Faucet allowance set to {}", new_amount);
        Ok(())
    }

    /// Owner-only. Existing cooldowns keep the expiry they were given.
    pub fn set_locktime(
        &mut self,
        ctx: &CallContext,
        new_locktime: Timestamp,
        events: &mut EventLog,
    ) -> FaucetResult<()> {
        self.access.ensure_owner(&ctx.caller)?;
        self.locktime = new_locktime;
        events.push(Event::LocktimeChanged {
            locktime: new_locktime,
        });
        debug!("Faucet locktime set to {}s", new_locktime);
        Ok(())
    }

    /// Owner-only. Send the entire faucet balance back to the owner.
    pub fn withdraw_all_tokens(
        &mut self,
        ledger: &mut Ledger,
        ctx: &CallContext,
        events: &mut EventLog,
    ) -> FaucetResult<Amount> {
        self.ensure_ledger(ledger)?;
        self.access.ensure_owner(&ctx.caller)?;

        let amount = ledger.balance_of(&self.address);
        if amount == 0 {
            return Err(FaucetError::FaucetEmpty);
        }

        let owner = self.owner();
        ledger.transfer(&ctx.with_caller(self.address), owner, amount, events)?;
        events.push(Event::Withdrawal { to: owner, amount });

        info!("Withdrew {} from faucet to {}", amount, owner);
        Ok(amount)
    }

    fn ensure_ledger(&self, ledger: &Ledger) -> FaucetResult<()> {
        if ledger.address() == self.token {
            Ok(())
        } else {
            Err(FaucetError::LedgerMismatch {
                expected: self.token,
                got: ledger.address(),
            })
        }
    }
}
