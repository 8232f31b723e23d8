//! Ledger state and operations

use crate::error::{LedgerError, LedgerResult};
use neutron_common::types::scale;
use neutron_common::{
    Address, Amount, ArithmeticOverflow, CallContext, Event, EventLog, Ownable, DECIMALS,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

pub const TOKEN_NAME: &str = "NeutronToken";
pub const TOKEN_SYMBOL: &str = "NTRO";

/// Capped-supply ledger.
///
/// Invariants held after every operation, successful or not:
/// `total_supply <= cap`, `total_supply == Σ balances`, and the owner never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    address: Address,
    access: Ownable,
    cap: Amount,
    total_supply: Amount,
    block_reward: Amount,
    balances: BTreeMap<Address, Amount>,
    allowances: BTreeMap<Address, BTreeMap<Address, Amount>>,
}

/// Balance and supply changes computed up front, applied only after every check passed.
#[derive(Debug, Default)]
struct Plan {
    balances: Vec<(Address, Amount)>,
    total_supply: Option<Amount>,
    events: Vec<Event>,
}

impl Plan {
    fn balance(&self, ledger: &Ledger, addr: &Address) -> Amount {
        self.balances
            .iter()
            .rev()
            .find(|(staged, _)| staged == addr)
            .map(|(_, value)| *value)
            .unwrap_or_else(|| ledger.balance_of(addr))
    }

    fn debit(&mut self, ledger: &Ledger, addr: Address, amount: Amount) -> LedgerResult<()> {
        let have = self.balance(ledger, &addr);
        let next = have
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance { have, need: amount })?;
        self.balances.push((addr, next));
        Ok(())
    }

    fn credit(&mut self, ledger: &Ledger, addr: Address, amount: Amount) -> LedgerResult<()> {
        let next = self
            .balance(ledger, &addr)
            .checked_add(amount)
            .ok_or(ArithmeticOverflow)?;
        self.balances.push((addr, next));
        Ok(())
    }
}

impl Ledger {
    /// Deploy a ledger owned by `ctx.caller`.
    ///
    /// `cap` and `reward_rate` are human units; both are stored scaled. Half of the cap
    /// is minted to the owner. The ledger address is derived from the owner, the
    /// deployment time and both parameters.
    pub fn new(
        ctx: &CallContext,
        cap: Amount,
        reward_rate: Amount,
        events: &mut EventLog,
    ) -> LedgerResult<Self> {
        if cap == 0 {
            return Err(LedgerError::InvalidCap("cap must be greater than zero".to_string()));
        }

        let scaled_cap = scale(cap)?;
        let initial = scale(cap / 2)?;
        if initial > scaled_cap {
            return Err(LedgerError::InvalidCap(format!(
                "initial supply {} exceeds cap {}",
                initial, scaled_cap
            )));
        }
        let block_reward = scale(reward_rate)?;

        let owner = ctx.caller;
        let mut label = b"neutron-ledger".to_vec();
        label.extend_from_slice(&ctx.now.to_be_bytes());
        label.extend_from_slice(&cap.to_be_bytes());
        label.extend_from_slice(&reward_rate.to_be_bytes());

        let mut balances = BTreeMap::new();
        balances.insert(owner, initial);

        let ledger = Self {
            address: Address::derive(&owner, &label),
            access: Ownable::new(owner),
            cap: scaled_cap,
            total_supply: initial,
            block_reward,
            balances,
            allowances: BTreeMap::new(),
        };

        events.push(Event::Transfer {
            from: Address::ZERO,
            to: owner,
            amount: initial,
        });

        info!(
            "Ledger {} deployed: owner={}, cap={}, block_reward={}",
            ledger.address, owner, scaled_cap, block_reward
        );
        Ok(ledger)
    }

    // --- Reads ---

    pub fn name(&self) -> &'static str {
        TOKEN_NAME
    }

    pub fn symbol(&self) -> &'static str {
        TOKEN_SYMBOL
    }

    pub fn decimals(&self) -> u8 {
        DECIMALS
    }

    /// The ledger's own address, by which a faucet refers to it
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.access.owner()
    }

    pub fn cap(&self) -> Amount {
        self.cap
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    pub fn block_reward(&self) -> Amount {
        self.block_reward
    }

    pub fn balance_of(&self, addr: &Address) -> Amount {
        self.balances.get(addr).copied().unwrap_or(0)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or(0)
    }

    /// Number of accounts ever referenced, including zeroed ones
    pub fn account_count(&self) -> usize {
        self.balances.len()
    }

    // --- Operations ---

    /// Move `amount` from `ctx.caller` to `to`, then mint the block reward to `ctx.miner`.
    pub fn transfer(
        &mut self,
        ctx: &CallContext,
        to: Address,
        amount: Amount,
        events: &mut EventLog,
    ) -> LedgerResult<()> {
        let plan = self.plan_transfer(ctx.caller, to, amount, ctx.miner)?;
        self.apply(plan, events);
        Ok(())
    }

    /// Destroy `amount` from `ctx.caller`'s balance. The cap is untouched.
    pub fn burn(
        &mut self,
        ctx: &CallContext,
        amount: Amount,
        events: &mut EventLog,
    ) -> LedgerResult<()> {
        let plan = self.plan_burn(ctx.caller, amount)?;
        self.apply(plan, events);
        Ok(())
    }

    /// Owner-only. `new_rate` is in human units.
    pub fn set_reward(
        &mut self,
        ctx: &CallContext,
        new_rate: Amount,
        events: &mut EventLog,
    ) -> LedgerResult<()> {
        self.access.ensure_owner(&ctx.caller)?;
        let reward = scale(new_rate)?;

        self.block_reward = reward;
        events.push(Event::RewardChanged { reward });
        info!("Block reward set to {}", reward);
        Ok(())
    }

    /// Let `spender` move up to `amount` of `ctx.caller`'s balance.
    pub fn approve(
        &mut self,
        ctx: &CallContext,
        spender: Address,
        amount: Amount,
        events: &mut EventLog,
    ) -> LedgerResult<()> {
        self.allowances
            .entry(ctx.caller)
            .or_default()
            .insert(spender, amount);
        events.push(Event::Approval {
            owner: ctx.caller,
            spender,
            amount,
        });
        Ok(())
    }

    /// Spend `ctx.caller`'s allowance over `from` to transfer to `to`.
    ///
    /// Behaves like [`Ledger::transfer`] otherwise, block reward included. An
    /// allowance of `Amount::MAX` is never decremented.
    pub fn transfer_from(
        &mut self,
        ctx: &CallContext,
        from: Address,
        to: Address,
        amount: Amount,
        events: &mut EventLog,
    ) -> LedgerResult<()> {
        let remaining = self.check_allowance(&from, &ctx.caller, amount)?;
        let plan = self.plan_transfer(from, to, amount, ctx.miner)?;
        self.apply(plan, events);
        self.spend_allowance(from, ctx.caller, remaining);
        Ok(())
    }

    /// Spend `ctx.caller`'s allowance over `from` to burn.
    pub fn burn_from(
        &mut self,
        ctx: &CallContext,
        from: Address,
        amount: Amount,
        events: &mut EventLog,
    ) -> LedgerResult<()> {
        let remaining = self.check_allowance(&from, &ctx.caller, amount)?;
        let plan = self.plan_burn(from, amount)?;
        self.apply(plan, events);
        self.spend_allowance(from, ctx.caller, remaining);
        Ok(())
    }

    /// Re-derive the supply from balances and check it against the cap.
    pub fn verify_invariants(&self) -> LedgerResult<()> {
        let sum = self
            .balances
            .values()
            .try_fold(0 as Amount, |acc, v| acc.checked_add(*v))
            .ok_or(ArithmeticOverflow)?;

        if sum != self.total_supply {
            return Err(LedgerError::InvariantViolated(format!(
                "sum of balances {} != total supply {}",
                sum, self.total_supply
            )));
        }
        if self.total_supply > self.cap {
            return Err(LedgerError::InvariantViolated(format!(
                "total supply {} exceeds cap {}",
                self.total_supply, self.cap
            )));
        }
        Ok(())
    }

    // --- Internals ---

    /// Reward actually mintable right now: the configured reward, clamped to the
    /// headroom left under the cap.
    fn mintable_reward(&self) -> Amount {
        self.block_reward
            .min(self.cap.saturating_sub(self.total_supply))
    }

    fn plan_transfer(
        &self,
        from: Address,
        to: Address,
        amount: Amount,
        miner: Address,
    ) -> LedgerResult<Plan> {
        if from.is_zero() {
            return Err(LedgerError::TransferFromZeroAddress);
        }
        if to.is_zero() {
            return Err(LedgerError::TransferToZeroAddress);
        }
        let have = self.balance_of(&from);
        if have < amount {
            return Err(LedgerError::InsufficientBalance { have, need: amount });
        }
        if to == miner {
            return Err(LedgerError::TransferToMinerAddress(to));
        }

        let mut plan = Plan::default();
        plan.debit(self, from, amount)?;
        plan.credit(self, to, amount)?;
        plan.events.push(Event::Transfer { from, to, amount });

        let reward = self.mintable_reward();
        if reward > 0 {
            plan.credit(self, miner, reward)?;
            plan.total_supply = Some(
                self.total_supply
                    .checked_add(reward)
                    .ok_or(ArithmeticOverflow)?,
            );
            plan.events.push(Event::RewardMinted { miner, amount: reward });
        } else {
            debug!("Supply at cap, no block reward minted");
        }

        Ok(plan)
    }

    fn plan_burn(&self, from: Address, amount: Amount) -> LedgerResult<Plan> {
        let mut plan = Plan::default();
        plan.debit(self, from, amount)?;
        plan.total_supply = Some(
            self.total_supply
                .checked_sub(amount)
                .ok_or(ArithmeticOverflow)?,
        );
        plan.events.push(Event::Transfer {
            from,
            to: Address::ZERO,
            amount,
        });
        Ok(plan)
    }

    fn apply(&mut self, plan: Plan, events: &mut EventLog) {
        for (addr, value) in plan.balances {
            self.balances.insert(addr, value);
        }
        if let Some(total_supply) = plan.total_supply {
            self.total_supply = total_supply;
        }
        for event in plan.events {
            debug!(?event, "ledger event");
            events.push(event);
        }
    }

    /// Allowance left after spending `amount`, or `InsufficientAllowance`.
    fn check_allowance(
        &self,
        owner: &Address,
        spender: &Address,
        amount: Amount,
    ) -> LedgerResult<Amount> {
        let have = self.allowance(owner, spender);
        if have == Amount::MAX {
            return Ok(have);
        }
        have.checked_sub(amount)
            .ok_or(LedgerError::InsufficientAllowance { have, need: amount })
    }

    fn spend_allowance(&mut self, owner: Address, spender: Address, remaining: Amount) {
        self.allowances
            .entry(owner)
            .or_default()
            .insert(spender, remaining);
    }
}
