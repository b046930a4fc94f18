//! Commit-time conflict detection (first-committer-wins)
//!
//! A transaction conflicts when any reference it wrote has a committed
//! version newer than its snapshot. Reads are not validated: a transaction
//! that only read stale data still commits, since its reads all come from one
//! consistent snapshot.
//!
//! Must be called under the manager's commit lock; the answer is only
//! meaningful until the next commit.

use crate::transaction::Transaction;
use mvstm_core::{StmError, StmResult};

/// Check every altered reference against the transaction's snapshot
///
/// Returns the first conflict found, in reference id order.
pub fn validate_write_set(txn: &Transaction) -> StmResult<()> {
    let snapshot = txn.snapshot();
    for target in txn.altered_targets() {
        let committed = target.latest_commit();
        if committed > snapshot {
            return Err(StmError::CommitConflict {
                ref_id: target.ref_id(),
                snapshot,
                committed,
            });
        }
    }
    Ok(())
}
