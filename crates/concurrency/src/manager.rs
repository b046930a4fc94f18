//! Transaction manager for coordinating commit operations
//!
//! Owns the engine-wide state every transaction shares:
//! 1. The global commit counter (snapshot source, version allocator)
//! 2. The commit lock (serializes validate → install → publish)
//! 3. Configuration and metrics
//!
//! ## Commit Sequence
//!
//! ```text
//! 1. Read-only transaction? Succeed, counter untouched
//! 2. Acquire commit lock
//! 3. validate_write_set() - any altered ref newer than snapshot?
//! 4. IF conflict: release lock, return CommitConflict (nothing mutated)
//! 5. Pair buffered values with their cells (type-checked, still no mutation)
//! 6. commit_version = counter + 1
//! 7. Prepend commit_version to every altered ref
//! 8. Publish counter = commit_version
//! 9. Release lock, return Ok(Some(commit_version))
//! ```
//!
//! The counter is published only after every version is installed: a
//! transaction that starts with snapshot N must find commit N's versions in
//! every reference it reads.

use crate::cell::VersionedCell;
use crate::transaction::Transaction;
use crate::validation::validate_write_set;
use mvstm_core::{CommitId, EngineId, StmConfig, StmError, StmResult};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Manages transaction lifecycle and atomic commits
///
/// Per engine, the commit counter advances by exactly one per writing commit.
/// All references written by one transaction get the same commit version.
///
/// # Thread Safety
///
/// The commit operation is serialized via an internal lock to prevent TOCTOU
/// (time-of-check-to-time-of-use) races between validation and install.
/// Per-reference locks alone are not enough: one commit touches several
/// references and must appear atomic across all of them.
pub struct TransactionManager {
    engine: EngineId,

    /// Global commit counter
    ///
    /// Monotonically increasing. Only written under `commit_lock`.
    version: AtomicU64,

    /// Commit serialization lock
    ///
    /// Without it two transactions writing the same reference could both
    /// validate against the same head and then both install (lost update).
    commit_lock: Mutex<()>,

    config: StmConfig,

    committed: AtomicU64,
    read_only: AtomicU64,
    conflicts: AtomicU64,
    aborted: AtomicU64,
}

/// Point-in-time transaction counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransactionMetrics {
    /// Commits that wrote at least one reference
    pub committed: u64,
    /// Commits that only read
    pub read_only: u64,
    /// Attempts rejected by write-set validation
    pub conflicts: u64,
    /// Attempts discarded for any reason, conflicts included
    pub aborted: u64,
    /// Current commit counter
    pub current_version: CommitId,
}

impl TransactionMetrics {
    /// Fraction of finished attempts that committed (0.0 - 1.0)
    pub fn commit_rate(&self) -> f64 {
        let done = self.committed + self.read_only;
        let total = done + self.aborted;
        if total == 0 {
            return 1.0;
        }
        done as f64 / total as f64
    }
}

impl TransactionManager {
    /// Create a manager with a validated configuration
    pub fn new(config: StmConfig) -> StmResult<Self> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    fn with_config(config: StmConfig) -> Self {
        TransactionManager {
            engine: EngineId::next(),
            version: AtomicU64::new(0),
            commit_lock: Mutex::new(()),
            config,
            committed: AtomicU64::new(0),
            read_only: AtomicU64::new(0),
            conflicts: AtomicU64::new(0),
            aborted: AtomicU64::new(0),
        }
    }

    /// Identity of this engine
    pub fn engine_id(&self) -> EngineId {
        self.engine
    }

    /// Active configuration
    pub fn config(&self) -> &StmConfig {
        &self.config
    }

    /// Get current commit counter
    pub fn current_version(&self) -> CommitId {
        self.version.load(Ordering::SeqCst)
    }

    /// Create a cell seeded at the current commit counter
    pub fn new_cell<T>(&self, value: T) -> Arc<VersionedCell<T>>
    where
        T: Clone + Send + Sync + 'static,
    {
        Arc::new(VersionedCell::new(
            self.engine,
            self.current_version(),
            value,
            self.config.history_depth,
        ))
    }

    /// Start a transaction snapshotted at the current commit counter
    pub fn begin(&self) -> Transaction {
        let txn = Transaction::new(self.engine, self.current_version());
        tracing::trace!(snapshot = txn.snapshot(), engine = %self.engine, "begin transaction");
        txn
    }

    /// Commit a transaction atomically
    ///
    /// # Returns
    /// - `Ok(None)` for a read-only transaction (no counter advance)
    /// - `Ok(Some(commit_version))` after publishing the writes
    /// - `Err(CommitConflict)` if validation fails; nothing was mutated
    pub fn commit(&self, txn: Transaction) -> StmResult<Option<CommitId>> {
        if txn.engine() != self.engine {
            return Err(StmError::EngineMismatch {
                expected: self.engine,
                found: txn.engine(),
            });
        }

        if txn.is_read_only() {
            self.read_only.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(snapshot = txn.snapshot(), "read-only commit");
            return Ok(None);
        }

        let _commit_guard = self.commit_lock.lock();

        if let Err(e) = validate_write_set(&txn) {
            if e.is_conflict() {
                self.conflicts.fetch_add(1, Ordering::Relaxed);
            }
            return Err(e);
        }

        let snapshot = txn.snapshot();
        let writes = txn.into_writes()?;

        let commit_version = self.version.load(Ordering::SeqCst) + 1;
        for write in writes {
            tracing::trace!(ref_id = %write.ref_id, commit_version, "installing version");
            write.install(commit_version);
        }
        self.version.store(commit_version, Ordering::SeqCst);
        self.committed.fetch_add(1, Ordering::Relaxed);

        tracing::trace!(snapshot, commit_version, "transaction committed");
        Ok(Some(commit_version))
    }

    /// Count a discarded attempt
    pub fn record_abort(&self) {
        self.aborted.fetch_add(1, Ordering::Relaxed);
    }

    /// Get transaction counters
    pub fn metrics(&self) -> TransactionMetrics {
        TransactionMetrics {
            committed: self.committed.load(Ordering::Relaxed),
            read_only: self.read_only.load(Ordering::Relaxed),
            conflicts: self.conflicts.load(Ordering::Relaxed),
            aborted: self.aborted.load(Ordering::Relaxed),
            current_version: self.current_version(),
        }
    }
}

impl Default for TransactionManager {
    fn default() -> Self {
        Self::with_config(StmConfig::default())
    }
}

impl std::fmt::Debug for TransactionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionManager")
            .field("engine", &self.engine)
            .field("version", &self.current_version())
            .field("config", &self.config)
            .finish()
    }
}
