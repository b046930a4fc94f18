//! Error types for the transaction engine
//!
//! A single enum covers every failure the engine can raise. The retry driver
//! starts over on any retryable error raised inside a transaction body or
//! during commit, and hands the rest back to the caller. The variants stay
//! distinct so callers and logs can tell a write-write conflict from a
//! history gap.

use crate::types::{CommitId, EngineId, RefId};
use thiserror::Error;

/// All engine errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StmError {
    /// `set` was called with no active transaction
    #[error("cannot write {ref_id} outside a transaction")]
    WriteOutsideTransaction {
        /// Reference that was written
        ref_id: RefId,
    },

    /// No retained version of a reference is old enough for the snapshot
    ///
    /// Either the reference was created after the transaction started, or
    /// its history was trimmed below the snapshot id.
    #[error("no version of {ref_id} visible at snapshot {snapshot} (oldest retained: {oldest})")]
    NoVisibleVersion {
        /// Reference that was read
        ref_id: RefId,
        /// Snapshot id of the reading transaction
        snapshot: CommitId,
        /// Id of the oldest version still retained
        oldest: CommitId,
    },

    /// Another transaction committed to a written reference after our snapshot
    #[error("{ref_id} was committed at {committed}, after snapshot {snapshot}")]
    CommitConflict {
        /// First conflicting reference found during validation
        ref_id: RefId,
        /// Snapshot id of the failing transaction
        snapshot: CommitId,
        /// Commit id of the newer version
        committed: CommitId,
    },

    /// Transaction body gave up on this attempt
    #[error("transaction aborted: {0}")]
    Aborted(String),

    /// A reference or nested call belongs to a different engine
    #[error("expected {expected}, found {found}")]
    EngineMismatch {
        /// Engine of the active transaction
        expected: EngineId,
        /// Engine of the reference or call
        found: EngineId,
    },

    /// Rejected configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal error (bug or invariant violation)
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for engine operations
pub type StmResult<T> = std::result::Result<T, StmError>;

impl StmError {
    /// Create an [`StmError::Aborted`] from a message
    pub fn aborted(reason: impl Into<String>) -> Self {
        StmError::Aborted(reason.into())
    }

    /// Check if the driver retries this error when an attempt returns it
    ///
    /// Misuse errors are not retried: a fresh snapshot cannot fix a write
    /// with no transaction, a reference from another engine, or a rejected
    /// configuration. The driver returns them to the caller after one attempt.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            StmError::WriteOutsideTransaction { .. }
                | StmError::EngineMismatch { .. }
                | StmError::InvalidConfig(_)
        )
    }

    /// Check if this is a write-write conflict detected at commit
    pub fn is_conflict(&self) -> bool {
        matches!(self, StmError::CommitConflict { .. })
    }

    /// Check if this is a read that fell off the retained history
    pub fn is_history_gap(&self) -> bool {
        matches!(self, StmError::NoVisibleVersion { .. })
    }
}
