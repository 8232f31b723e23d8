//! End-to-end faucet scenarios against a live ledger

use neutron_common::{Address, Amount, CallContext, Event, EventLog, Timestamp};
use neutron_faucet::{Faucet, FaucetError, RequesterState};
use neutron_ledger::Ledger;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const T0: Timestamp = 1_700_000_000;

fn addr(n: u8) -> Address {
    Address([n; 20])
}

struct Setup {
    ledger: Ledger,
    faucet: Faucet,
    events: EventLog,
    owner: Address,
    miner: Address,
}

impl Setup {
    fn new(amount_allowed: Amount) -> Self {
        let owner = addr(1);
        let miner = addr(0xc0);
        let mut events = EventLog::new();
        let ctx = CallContext::new(owner, miner, T0);
        let ledger = Ledger::new(&ctx, 10_000_000, 50, &mut events).unwrap();
        let faucet = Faucet::new(&ctx, amount_allowed, &ledger);
        Self {
            ledger,
            faucet,
            events,
            owner,
            miner,
        }
    }

    fn ctx(&self, caller: Address, now: Timestamp) -> CallContext {
        CallContext::new(caller, self.miner, now)
    }

    fn request(&mut self, caller: Address, now: Timestamp) -> Result<(), FaucetError> {
        let ctx = self.ctx(caller, now);
        self.faucet
            .request_tokens(&mut self.ledger, &ctx, &mut self.events)
    }

    fn add(&mut self, amount: Amount) -> Result<(), FaucetError> {
        let ctx = self.ctx(self.owner, T0);
        self.faucet
            .add_tokens(&mut self.ledger, &ctx, amount, &mut self.events)
    }
}

#[test]
fn test_drained_faucet_refuses_everyone_until_replenished() {
    let mut s = Setup::new(1000);
    s.add(1000).unwrap();

    s.request(addr(2), T0).unwrap();
    assert_eq!(s.faucet.balance(&s.ledger).unwrap(), 0);

    for user in 3..6 {
        assert_eq!(
            s.request(addr(user), T0),
            Err(FaucetError::InsufficientFaucetBalance { have: 0, need: 1000 })
        );
    }

    s.add(1000).unwrap();
    s.request(addr(3), T0).unwrap();
    assert_eq!(s.ledger.balance_of(&addr(3)), 1000);
    s.ledger.verify_invariants().unwrap();
}

#[test]
fn test_lowered_allowance_serves_again() {
    let mut s = Setup::new(1000);
    s.add(1000).unwrap();
    s.request(addr(2), T0).unwrap();
    s.add(150).unwrap();

    let owner = s.ctx(s.owner, T0);
    s.faucet
        .change_allowed_amount(&owner, 100, &mut s.events)
        .unwrap();

    s.request(addr(3), T0).unwrap();
    assert_eq!(s.ledger.balance_of(&addr(3)), 100);
    assert_eq!(s.faucet.balance(&s.ledger).unwrap(), 50);
}

#[test]
fn test_withdraw_returns_exact_balance() {
    let mut s = Setup::new(1000);
    s.add(1000).unwrap();
    let owner_before = s.ledger.balance_of(&s.owner);

    let owner = s.ctx(s.owner, T0);
    s.faucet
        .withdraw_all_tokens(&mut s.ledger, &owner, &mut s.events)
        .unwrap();

    assert_eq!(s.faucet.balance(&s.ledger).unwrap(), 0);
    assert_eq!(s.ledger.balance_of(&s.owner), owner_before + 1000);
    assert_eq!(
        s.events.last(),
        Some(&Event::Withdrawal {
            to: s.owner,
            amount: 1000
        })
    );
}

#[test]
fn test_add_tokens_logs_transfer_then_event() {
    let mut s = Setup::new(1000);
    let logged = s.events.len();
    s.add(1000).unwrap();

    let new_events = s.events.since(logged);
    assert_eq!(
        new_events.first(),
        Some(&Event::Transfer {
            from: s.owner,
            to: s.faucet.address(),
            amount: 1000
        })
    );
    assert_eq!(new_events.last(), Some(&Event::TokensAdded { amount: 1000 }));
}

#[test]
fn test_shorter_locktime_applies_to_new_requests_only() {
    let mut s = Setup::new(10);
    s.add(100).unwrap();
    s.request(addr(2), T0).unwrap();

    let owner = s.ctx(s.owner, T0);
    s.faucet.set_locktime(&owner, 2, &mut s.events).unwrap();

    assert!(matches!(
        s.request(addr(2), T0 + 2),
        Err(FaucetError::LocktimeNotExpired { .. })
    ));
    s.request(addr(3), T0).unwrap();
    assert_eq!(s.faucet.status(&addr(3), T0 + 2), RequesterState::Eligible);
}

#[test]
fn test_cooldown_property_random_times() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut s = Setup::new(1);
    s.add(1_000_000).unwrap();
    let owner = s.ctx(s.owner, T0);
    s.faucet.set_locktime(&owner, 3_600, &mut s.events).unwrap();

    for user in 2..30u8 {
        let t0 = T0 + rng.gen_range(0..100_000);
        s.request(addr(user), t0).unwrap();

        let early = t0 + rng.gen_range(0..3_600);
        assert_eq!(
            s.request(addr(user), early),
            Err(FaucetError::LocktimeNotExpired {
                next_access: t0 + 3_600,
                now: early
            })
        );

        let late = t0 + 3_600 + rng.gen_range(0..10);
        s.request(addr(user), late).unwrap();
        assert_eq!(s.ledger.balance_of(&addr(user)), 2);
    }
    s.ledger.verify_invariants().unwrap();
}
