//! Transfer Tests
//!
//! Two concurrent transfers between the same accounts must converge to the
//! same balances however they interleave, and every commit must preserve
//! the total.

use crate::*;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Barrier;
use std::thread;

/// Value of `r` as of commit `id`, reconstructed from its retained history
fn value_at(r: &Ref<i64>, id: u64) -> Option<i64> {
    r.history().into_iter().find(|v| v.id <= id).map(|v| v.value)
}

#[test]
fn test_two_transfers_converge() {
    let stm = create_stm();
    let a = stm.new_ref(1500i64);
    let b = stm.new_ref(200i64);

    assert_eq!(a.get().unwrap(), 1500);
    assert_eq!(b.get().unwrap(), 200);

    thread::scope(|s| {
        s.spawn(|| transfer(&stm, &a, &b, 1000, 10).unwrap());
        s.spawn(|| transfer(&stm, &b, &a, 100, 0).unwrap());
    });

    assert_eq!(a.get().unwrap(), 600);
    assert_eq!(b.get().unwrap(), 1100);
    assert_eq!(stm.current_version(), 2);

    // total holds at every commit
    for id in 0..=stm.current_version() {
        let total = value_at(&a, id).unwrap() + value_at(&b, id).unwrap();
        assert_eq!(total, 1700, "total broken at commit {}", id);
    }
}

#[test]
fn test_slow_transfer_is_retried() {
    let stm = create_stm();
    let a = stm.new_ref(1500i64);
    let b = stm.new_ref(200i64);
    let slow_read = Barrier::new(2);
    let fast_committed = Barrier::new(2);

    let (slow_attempts, fast_attempts) = thread::scope(|s| {
        let slow = s.spawn(|| {
            let mut first = true;
            stm.transact(|| {
                let from = a.get()?;
                let to = b.get()?;
                if first {
                    // hold the stale snapshot until the fast transfer lands
                    first = false;
                    slow_read.wait();
                    fast_committed.wait();
                }
                a.set(from - 1000)?;
                b.set(to + 1000)?;
                Ok(())
            })
            .unwrap()
            .attempts
        });
        let fast = s.spawn(|| {
            slow_read.wait();
            let attempts = transfer(&stm, &b, &a, 100, 0).unwrap();
            fast_committed.wait();
            attempts
        });
        (slow.join().unwrap(), fast.join().unwrap())
    });

    assert_eq!(fast_attempts, 1);
    assert_eq!(slow_attempts, 2, "slow transfer should have lost the race");
    assert_eq!(a.get().unwrap(), 600);
    assert_eq!(b.get().unwrap(), 1100);
    assert_eq!(stm.metrics().conflicts, 1);
}

#[test]
fn test_random_transfers_preserve_total() {
    let stm = create_stm();
    let accounts: Vec<_> = (0..5).map(|_| stm.new_ref(1000i64)).collect();
    let done = AtomicBool::new(false);

    const WORKERS: usize = 4;
    const TRANSFERS: usize = 40;
    const TOTAL: i64 = 5000;

    thread::scope(|s| {
        let workers: Vec<_> = (0..WORKERS)
            .map(|_| {
                let (stm, accounts) = (&stm, &accounts);
                s.spawn(move || {
                    let mut rng = rand::thread_rng();
                    for _ in 0..TRANSFERS {
                        let from = rng.gen_range(0..accounts.len());
                        let to = (from + rng.gen_range(1..accounts.len())) % accounts.len();
                        let amount = rng.gen_range(1..=50);
                        let delay = rng.gen_range(0..3);
                        transfer(stm, &accounts[from], &accounts[to], amount, delay).unwrap();
                    }
                })
            })
            .collect();

        let auditor = s.spawn(|| {
            let mut audits = 0;
            loop {
                let total = stm
                    .atomically(|| accounts.iter().map(|r| r.get()).sum::<StmResult<i64>>())
                    .unwrap();
                assert_eq!(total, TOTAL, "auditor saw an inconsistent snapshot");
                audits += 1;
                if done.load(Ordering::SeqCst) {
                    return audits;
                }
            }
        });

        for w in workers {
            w.join().unwrap();
        }
        done.store(true, Ordering::SeqCst);
        assert!(auditor.join().unwrap() > 0);
    });

    let total: i64 = accounts.iter().map(|r| r.get().unwrap()).sum();
    assert_eq!(total, TOTAL);
    assert_eq!(stm.current_version(), (WORKERS * TRANSFERS) as u64);
    assert_eq!(stm.metrics().committed, (WORKERS * TRANSFERS) as u64);
}
