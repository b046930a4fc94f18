//! Per-thread active transaction slot
//!
//! Each OS thread is one execution context and owns at most one active
//! [`Transaction`]. Reference reads and writes consult this slot to decide
//! between the transactional and the plain path; the driver consults it to
//! decide between starting an attempt and joining one.
//!
//! The slot is only borrowed for the duration of a single read or write,
//! never across user code, so transaction bodies can freely call back into
//! references.

use crate::transaction::Transaction;
use mvstm_core::{CommitId, EngineId};
use std::cell::RefCell;
use std::marker::PhantomData;

thread_local! {
    static ACTIVE: RefCell<Option<Transaction>> = const { RefCell::new(None) };
}

/// True if this thread is inside a transaction attempt
pub fn is_active() -> bool {
    ACTIVE.with(|slot| slot.borrow().is_some())
}

/// Engine of this thread's active transaction
pub fn active_engine() -> Option<EngineId> {
    ACTIVE.with(|slot| slot.borrow().as_ref().map(Transaction::engine))
}

/// Snapshot id of this thread's active transaction
pub fn active_snapshot() -> Option<CommitId> {
    ACTIVE.with(|slot| slot.borrow().as_ref().map(Transaction::snapshot))
}

/// Run `f` against this thread's active transaction
///
/// Returns `None` without calling `f` when no transaction is active.
pub fn with_active<R>(f: impl FnOnce(&mut Transaction) -> R) -> Option<R> {
    ACTIVE.with(|slot| slot.borrow_mut().as_mut().map(f))
}

/// Scoped activation of a transaction on the current thread
///
/// Dropping the guard clears the slot, so an unwinding transaction body never
/// leaves a stale transaction behind.
pub(crate) struct ActivationGuard {
    // Slot is thread-local; the guard must be dropped on the thread that made it.
    _not_send: PhantomData<*const ()>,
}

impl ActivationGuard {
    pub(crate) fn activate(txn: Transaction) -> Self {
        ACTIVE.with(|slot| {
            let previous = slot.borrow_mut().replace(txn);
            debug_assert!(previous.is_none(), "transaction already active on this thread");
        });
        Self {
            _not_send: PhantomData,
        }
    }

    /// Deactivate and hand the transaction back
    pub(crate) fn finish(self) -> Option<Transaction> {
        ACTIVE.with(|slot| slot.borrow_mut().take())
    }
}

impl Drop for ActivationGuard {
    fn drop(&mut self) {
        // Thread-local may already be gone during thread teardown.
        let _ = ACTIVE.try_with(|slot| {
            if let Ok(mut slot) = slot.try_borrow_mut() {
                slot.take();
            }
        });
    }
}
