//! Nested Transaction Tests
//!
//! A transaction started while one is active on the same thread joins it.

use crate::*;
use mvstm::StmError;

fn deposit(stm: &Stm, account: &Ref<i64>, amount: i64) -> StmResult<i64> {
    stm.atomically(|| account.update(|b| b + amount))
}

#[test]
fn test_nested_call_shares_snapshot_and_buffer() {
    let stm = create_stm();
    let r = stm.new_ref(1);

    let outer = stm
        .transact(|| {
            r.set(2)?;
            let inner = stm.transact(|| {
                // sees the outer pending write
                let seen = r.get()?;
                r.set(seen + 1)?;
                Ok(seen)
            })?;
            assert!(inner.joined);
            assert_eq!(inner.commit_version, None);
            assert_eq!(inner.attempts, 0);

            // inner write is visible to the outer body
            Ok((inner.value, r.get()?))
        })
        .unwrap();

    assert_eq!(outer.value, (2, 3));
    assert_eq!(outer.commit_version, Some(1));
    assert_eq!(stm.current_version(), 1);
    assert_eq!(r.get().unwrap(), 3);
}

#[test]
fn test_nested_calls_commit_once() {
    let stm = create_stm();
    let a = stm.new_ref(0i64);
    let b = stm.new_ref(0i64);

    stm.atomically(|| {
        deposit(&stm, &a, 10)?;
        deposit(&stm, &b, 20)?;
        deposit(&stm, &a, 5)
    })
    .unwrap();

    assert_eq!(a.get().unwrap(), 15);
    assert_eq!(b.get().unwrap(), 20);
    // one commit for the whole call tree
    assert_eq!(stm.current_version(), 1);
    assert_eq!(a.history_len(), 2);
}

#[test]
fn test_inner_error_restarts_outer() {
    let stm = create_stm();
    let r = stm.new_ref(0);
    let mut outer_attempts = 0;

    stm.atomically(|| {
        outer_attempts += 1;
        r.set(100)?;
        let attempt = outer_attempts;
        stm.atomically(|| {
            if attempt == 1 {
                return Err(StmError::aborted("inner failure"));
            }
            Ok(())
        })?;
        r.update(|n| n + 1)
    })
    .unwrap();

    assert_eq!(outer_attempts, 2);
    assert_eq!(r.get().unwrap(), 101);
    assert_eq!(stm.current_version(), 1);
}

#[test]
fn test_nested_call_on_other_engine_fails() {
    let stm = create_stm();
    let other = create_stm();
    let mut result = None;

    stm.atomically(|| {
        result = Some(other.atomically(|| Ok(())));
        Ok(())
    })
    .unwrap();

    assert!(matches!(
        result,
        Some(Err(StmError::EngineMismatch { .. }))
    ));
}

#[test]
fn test_foreign_ref_error_ends_transaction() {
    let stm = create_stm();
    let other = create_stm();
    let foreign = other.new_ref(1);
    let ours = stm.new_ref(0);

    let outcome = stm.transact(|| {
        ours.set(5)?;
        foreign.get()
    });

    assert!(matches!(outcome, Err(StmError::EngineMismatch { .. })));
    let metrics = stm.metrics();
    assert_eq!(metrics.aborted, 1);
    assert_eq!(metrics.committed, 0);
    // the attempt's write was discarded with it
    assert_eq!(ours.get().unwrap(), 0);
    assert_eq!(stm.current_version(), 0);
    // the thread is free for the next transaction
    assert_eq!(stm.atomically(|| ours.update(|n| n + 1)).unwrap(), 1);
}
