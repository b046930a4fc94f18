//! History Retention Tests
//!
//! References keep a bounded number of versions; a transaction whose
//! snapshot falls off the retained history is retried.

use crate::*;
use mvstm::{StmError, DEFAULT_HISTORY_DEPTH};
use std::thread;

#[test]
fn test_history_bounded_by_default_depth() {
    let stm = create_stm();
    let r = stm.new_ref(0);

    for i in 1..=25 {
        stm.atomically(|| r.set(i)).unwrap();
    }

    assert_eq!(DEFAULT_HISTORY_DEPTH, 10);
    assert_eq!(r.history_len(), 10);
    let ids: Vec<_> = r.history().iter().map(|v| v.id).collect();
    assert_eq!(ids, (16..=25).rev().collect::<Vec<_>>());
}

#[test]
fn test_history_versions_carry_commit_values() {
    let stm = create_stm();
    let r = stm.new_ref("seed");

    stm.atomically(|| r.set("one")).unwrap();
    stm.atomically(|| r.set("two")).unwrap();

    let history = r.history();
    assert_eq!(history.len(), 3);
    assert_eq!((history[0].id, history[0].value), (2, "two"));
    assert_eq!((history[1].id, history[1].value), (1, "one"));
    assert_eq!((history[2].id, history[2].value), (0, "seed"));
}

#[test]
fn test_custom_depth() {
    let stm = Stm::builder().history_depth(3).build().unwrap();
    let r = stm.new_ref(0);

    for i in 1..=10 {
        stm.atomically(|| r.set(i)).unwrap();
    }
    assert_eq!(r.history_len(), 3);
    assert_eq!(r.recent().value, 10);
}

#[test]
fn test_zero_depth_rejected() {
    let err = Stm::builder().history_depth(0).build().unwrap_err();
    assert!(matches!(err, StmError::InvalidConfig(_)));
}

#[test]
fn test_history_gap_retries_with_fresh_snapshot() {
    init_tracing();
    let stm = Stm::builder().history_depth(1).build().unwrap();
    let a = stm.new_ref(0);
    let b = stm.new_ref(0);
    let mut errors = Vec::new();
    let mut attempts = 0;

    let outcome = stm
        .transact(|| {
            attempts += 1;
            let x = a.get()?;
            if attempts == 1 {
                // b moves past our snapshot and its only retained version is too new
                thread::scope(|s| {
                    s.spawn(|| stm.atomically(|| b.set(7)).unwrap());
                });
            }
            match b.get() {
                Ok(y) => Ok(x + y),
                Err(e) => {
                    errors.push(e.clone());
                    Err(e)
                }
            }
        })
        .unwrap();

    assert_eq!(outcome.attempts, 2);
    assert_eq!(outcome.value, 7);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].is_history_gap());
    assert_eq!(stm.metrics().aborted, 1);
    assert_eq!(stm.metrics().conflicts, 0);
}

#[test]
fn test_ref_created_inside_transaction() {
    let stm = create_stm();
    let existing = stm.new_ref(0);
    stm.atomically(|| existing.set(1)).unwrap();

    let created = stm
        .atomically(|| {
            let fresh = stm.new_ref(0);
            // writing first makes the read served from our own buffer
            fresh.set(5)?;
            let v = fresh.get()?;
            Ok((fresh, v))
        })
        .unwrap();

    assert_eq!(created.1, 5);
    assert_eq!(created.0.get().unwrap(), 5);
}
