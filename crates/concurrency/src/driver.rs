//! Retry driver
//!
//! Runs a transaction body until one attempt commits.
//!
//! ```text
//! Idle ──> Running(txn) ──> Committed
//!   ^           │
//!   └───────────┘  conflict or error: discard txn, start over
//! ```
//!
//! Retry is immediate and unbounded, and makes no distinction between a
//! commit conflict and an error returned by the body. Misuse errors (see
//! [`StmError::is_retryable`]) would fail every attempt the same way, so they
//! end the call after one attempt. A body called while
//! this thread already has an active transaction joins it: it runs once,
//! its result goes straight back to the caller, and the outer attempt
//! commits (or retries) everything.
//!
//! Panics are not retried. The activation guard clears the slot while
//! unwinding and the attempt's writes are dropped with it.

use crate::context::{self, ActivationGuard};
use crate::manager::TransactionManager;
use mvstm_core::{CommitId, StmError, StmResult};

/// Result of a finished transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutcome<R> {
    /// Value returned by the committed attempt
    pub value: R,
    /// Commit id, or `None` for read-only or joined calls
    pub commit_version: Option<CommitId>,
    /// Attempts made, including the successful one (0 when joined)
    pub attempts: u64,
    /// True if the call ran inside an already-active transaction
    pub joined: bool,
}

/// Run `work` atomically against `manager`
pub fn run<R, F>(manager: &TransactionManager, mut work: F) -> StmResult<TxOutcome<R>>
where
    F: FnMut() -> StmResult<R>,
{
    if let Some(engine) = context::active_engine() {
        if engine != manager.engine_id() {
            return Err(StmError::EngineMismatch {
                expected: engine,
                found: manager.engine_id(),
            });
        }
        let value = work()?;
        return Ok(TxOutcome {
            value,
            commit_version: None,
            attempts: 0,
            joined: true,
        });
    }

    let mut attempts = 0u64;
    loop {
        attempts += 1;
        let guard = ActivationGuard::activate(manager.begin());
        let result = work();
        let txn = guard
            .finish()
            .ok_or_else(|| StmError::Internal("active transaction vanished".to_string()))?;
        let snapshot = txn.snapshot();

        let err = match result {
            Ok(value) => match manager.commit(txn) {
                Ok(commit_version) => {
                    return Ok(TxOutcome {
                        value,
                        commit_version,
                        attempts,
                        joined: false,
                    })
                }
                Err(e) => e,
            },
            Err(e) => e,
        };

        manager.record_abort();
        if !err.is_retryable() {
            tracing::debug!(attempt = attempts, snapshot, error = %err, "transaction failed, not retrying");
            return Err(err);
        }
        if err.is_history_gap() {
            tracing::warn!(attempt = attempts, snapshot, error = %err, "read fell outside retained history, retrying");
        } else {
            tracing::debug!(attempt = attempts, snapshot, error = %err, "transaction aborted, retrying");
        }
    }
}
