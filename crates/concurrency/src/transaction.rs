//! One transaction attempt
//!
//! A [`Transaction`] captures the engine's commit counter at start (its
//! snapshot) and buffers every value it reads or writes. Nothing reaches the
//! shared cells until the manager commits it.
//!
//! ## Read path
//!
//! 1. Buffered value for the reference? Return it (read-your-writes and
//!    repeatable read within the attempt).
//! 2. Otherwise take the newest committed version with `id <= snapshot`,
//!    buffer it, return it.
//! 3. No such version: [`StmError::NoVisibleVersion`].
//!
//! ## Write path
//!
//! Overwrite the buffer entry and mark the reference altered.

use crate::cell::{CommitTarget, StagedWrite, VersionedCell};
use mvstm_core::{CommitId, EngineId, RefId, StmError, StmResult};
use rustc_hash::FxHashMap;
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Buffered reads and writes of one attempt
pub struct Transaction {
    engine: EngineId,
    snapshot: CommitId,
    /// Every value read or written, keyed by reference
    values: FxHashMap<RefId, Box<dyn Any + Send>>,
    /// References written; ordered so validation walks them deterministically
    altered: BTreeMap<RefId, Arc<dyn CommitTarget>>,
}

/// A buffered write bound to the cell it goes to
pub(crate) struct PendingWrite {
    pub(crate) ref_id: RefId,
    staged: StagedWrite,
}

impl PendingWrite {
    /// Install the value as commit `id`
    pub(crate) fn install(self, id: CommitId) {
        (self.staged)(id)
    }
}

impl Transaction {
    pub(crate) fn new(engine: EngineId, snapshot: CommitId) -> Self {
        Self {
            engine,
            snapshot,
            values: FxHashMap::default(),
            altered: BTreeMap::new(),
        }
    }

    /// Commit counter value captured when the attempt started
    pub fn snapshot(&self) -> CommitId {
        self.snapshot
    }

    /// Engine this transaction belongs to
    pub fn engine(&self) -> EngineId {
        self.engine
    }

    /// True if nothing has been written
    pub fn is_read_only(&self) -> bool {
        self.altered.is_empty()
    }

    /// Number of references with a buffered value
    pub fn buffered_len(&self) -> usize {
        self.values.len()
    }

    /// References written so far, in id order
    pub fn altered_refs(&self) -> impl Iterator<Item = RefId> + '_ {
        self.altered.keys().copied()
    }

    /// Read `cell` as of this transaction's snapshot
    pub fn read<T>(&mut self, cell: &Arc<VersionedCell<T>>) -> StmResult<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.check_engine(cell.engine())?;
        let ref_id = cell.id();

        if let Some(buffered) = self.values.get(&ref_id) {
            return buffered.downcast_ref::<T>().cloned().ok_or_else(|| {
                StmError::Internal(format!("buffered value for {} has the wrong type", ref_id))
            });
        }

        match cell.visible_at(self.snapshot) {
            Ok(value) => {
                self.values.insert(ref_id, Box::new(value.clone()));
                Ok(value)
            }
            Err(oldest) => Err(StmError::NoVisibleVersion {
                ref_id,
                snapshot: self.snapshot,
                oldest,
            }),
        }
    }

    /// Buffer `value` as the new value of `cell`
    pub fn write<T>(&mut self, cell: &Arc<VersionedCell<T>>, value: T) -> StmResult<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.check_engine(cell.engine())?;
        let ref_id = cell.id();

        self.values.insert(ref_id, Box::new(value.clone()));
        self.altered
            .entry(ref_id)
            .or_insert_with(|| Arc::clone(cell) as Arc<dyn CommitTarget>);
        Ok(value)
    }

    pub(crate) fn altered_targets(&self) -> impl Iterator<Item = &Arc<dyn CommitTarget>> {
        self.altered.values()
    }

    /// Bind every altered reference to its buffered value
    ///
    /// Fails without side effects if any pairing is missing or mistyped.
    /// Staging never touches a cell, so the commit path installs nothing
    /// unless every write staged.
    pub(crate) fn into_writes(mut self) -> StmResult<Vec<PendingWrite>> {
        let mut writes = Vec::with_capacity(self.altered.len());
        for (ref_id, target) in std::mem::take(&mut self.altered) {
            let value = self.values.remove(&ref_id).ok_or_else(|| {
                StmError::Internal(format!("no buffered value for altered {}", ref_id))
            })?;
            let staged = target.stage(value).map_err(|_| {
                StmError::Internal(format!("buffered value for {} has the wrong type", ref_id))
            })?;
            writes.push(PendingWrite { ref_id, staged });
        }
        Ok(writes)
    }

    fn check_engine(&self, found: EngineId) -> StmResult<()> {
        if found != self.engine {
            return Err(StmError::EngineMismatch {
                expected: self.engine,
                found,
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("engine", &self.engine)
            .field("snapshot", &self.snapshot)
            .field("buffered", &self.values.len())
            .field("altered", &self.altered.keys().collect::<Vec<_>>())
            .finish()
    }
}
