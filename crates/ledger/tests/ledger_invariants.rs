//! Randomized operation sequences against the ledger's supply invariants

use neutron_common::{Address, Amount, CallContext, EventLog, SCALE};
use neutron_ledger::Ledger;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ACCOUNTS: u8 = 6;

fn addr(n: u8) -> Address {
    Address([n; 20])
}

fn random_amount(rng: &mut StdRng, ledger: &Ledger, from: &Address) -> Amount {
    let balance = ledger.balance_of(from);
    match rng.gen_range(0..4) {
        // Overdraw on purpose now and then
        0 => balance.saturating_add(rng.gen_range(1..1_000)),
        1 => balance,
        _ if balance == 0 => 0,
        _ => rng.gen_range(0..=balance),
    }
}

fn run_sequence(seed: u64, cap: Amount, reward: Amount, steps: usize) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut events = EventLog::new();
    let owner = addr(1);
    let mut ledger = Ledger::new(&CallContext::new(owner, addr(0), 0), cap, reward, &mut events)
        .expect("deploy");

    for step in 0..steps {
        let caller = addr(rng.gen_range(1..=ACCOUNTS));
        let miner = addr(rng.gen_range(1..=ACCOUNTS));
        let ctx = CallContext::new(caller, miner, step as u64);
        let op = rng.gen_range(0..5);

        let from = addr(rng.gen_range(1..=ACCOUNTS));
        if op == 4 {
            let amount = rng.gen_range(0..=ledger.balance_of(&from));
            ledger
                .approve(&ctx.with_caller(from), caller, amount, &mut events)
                .expect("approve never fails");
        }

        let before = ledger.clone();
        let logged = events.len();

        let result = match op {
            0 | 1 => {
                let to = addr(rng.gen_range(1..=ACCOUNTS));
                let amount = random_amount(&mut rng, &ledger, &caller);
                ledger.transfer(&ctx, to, amount, &mut events)
            }
            2 => {
                let amount = random_amount(&mut rng, &ledger, &caller);
                ledger.burn(&ctx, amount, &mut events)
            }
            3 => {
                let rate = rng.gen_range(0..10);
                ledger.set_reward(&ctx, rate, &mut events)
            }
            _ => {
                let amount = random_amount(&mut rng, &ledger, &from);
                ledger.transfer_from(&ctx, from, caller, amount, &mut events)
            }
        };

        ledger
            .verify_invariants()
            .unwrap_or_else(|e| panic!("seed {} step {}: {}", seed, step, e));
        assert!(ledger.total_supply() <= ledger.cap());
        assert_eq!(ledger.owner(), owner);

        if result.is_err() {
            assert_eq!(ledger, before, "seed {} step {}", seed, step);
            assert_eq!(events.len(), logged);
        }
    }
}

#[test]
fn test_random_sequences_hold_invariants() {
    for seed in 0..20 {
        run_sequence(seed, 1_000_000, 100, 300);
    }
}

#[test]
fn test_random_sequences_near_cap() {
    // Reward larger than headroom, so clamping is exercised constantly
    for seed in 100..110 {
        run_sequence(seed, 10, 3, 200);
    }
}

#[test]
fn test_failed_operations_leave_state_unchanged() {
    let mut events = EventLog::new();
    let owner = addr(1);
    let miner = addr(9);
    let ctx = CallContext::new(owner, miner, 0);
    let mut ledger = Ledger::new(&ctx, 1_000_000, 100, &mut events).unwrap();
    let snapshot = ledger.clone();
    let logged = events.len();

    let stranger = ctx.with_caller(addr(2));
    assert!(ledger.transfer(&stranger, addr(3), 1, &mut events).is_err());
    assert!(ledger.transfer(&ctx, miner, 1, &mut events).is_err());
    assert!(ledger.burn(&stranger, 1, &mut events).is_err());
    assert!(ledger.set_reward(&stranger, 1, &mut events).is_err());
    assert!(ledger
        .transfer_from(&stranger, owner, addr(3), 1, &mut events)
        .is_err());
    assert!(ledger
        .transfer(&ctx, addr(3), 500_000 * SCALE + 1, &mut events)
        .is_err());

    assert_eq!(ledger, snapshot);
    assert_eq!(events.len(), logged);
}

#[test]
fn test_reads_do_not_mutate() {
    let mut events = EventLog::new();
    let ledger = Ledger::new(&CallContext::new(addr(1), addr(9), 0), 100, 1, &mut events).unwrap();
    let snapshot = ledger.clone();

    for n in 0..ACCOUNTS {
        let _ = ledger.balance_of(&addr(n));
    }
    let _ = ledger.total_supply();
    let _ = ledger.allowance(&addr(1), &addr(2));

    assert_eq!(ledger, snapshot);
    assert_eq!(ledger.account_count(), 1);
}
