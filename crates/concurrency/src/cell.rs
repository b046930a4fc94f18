//! Shared, versioned storage behind every transactional reference
//!
//! A [`VersionedCell`] owns one reference's [`VersionHistory`] behind a
//! `parking_lot::RwLock`. Readers take the read lock just long enough to pick
//! a version; only the commit path, already serialized by the manager's
//! commit lock, takes the write lock.

use mvstm_core::{CommitId, EngineId, RefId, Version, VersionHistory};
use parking_lot::RwLock;
use std::any::Any;
use std::sync::Arc;

/// Versioned storage for one reference
pub struct VersionedCell<T> {
    id: RefId,
    engine: EngineId,
    history: RwLock<VersionHistory<T>>,
}

impl<T> VersionedCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a cell seeded with `value` as of commit `seed`
    pub fn new(engine: EngineId, seed: CommitId, value: T, depth: usize) -> Self {
        Self {
            id: RefId::next(),
            engine,
            history: RwLock::new(VersionHistory::new(Version::new(seed, value), depth)),
        }
    }

    /// Identity of this cell
    pub fn id(&self) -> RefId {
        self.id
    }

    /// Engine that created this cell
    pub fn engine(&self) -> EngineId {
        self.engine
    }

    /// Most recently committed version
    pub fn recent(&self) -> Version<T> {
        self.history.read().recent().clone()
    }

    /// Value of the newest version with `id <= snapshot`
    ///
    /// On failure returns the id of the oldest retained version.
    pub fn visible_at(&self, snapshot: CommitId) -> Result<T, CommitId> {
        let history = self.history.read();
        match history.visible_at(snapshot) {
            Some(version) => Ok(version.value.clone()),
            None => Err(history.oldest().id),
        }
    }

    /// Copy of every retained version, newest first
    pub fn history(&self) -> Vec<Version<T>> {
        self.history.read().iter().cloned().collect()
    }

    /// Number of retained versions
    pub fn history_len(&self) -> usize {
        self.history.read().len()
    }

    /// Prepend `value` as commit `id`
    ///
    /// Only the commit path calls this, with the commit lock held.
    pub(crate) fn install(&self, id: CommitId, value: T) {
        self.history.write().push(Version::new(id, value));
    }
}

/// A typed write ready to be installed at a commit id
pub(crate) type StagedWrite = Box<dyn FnOnce(CommitId) + Send>;

/// Type-erased view of a cell used by the commit path
///
/// A transaction writes cells of many value types; it keeps each written cell
/// as an `Arc<dyn CommitTarget>` next to a boxed value. Staging recovers the
/// value's type without touching the cell, so a commit can stage every write
/// before installing any of them.
pub(crate) trait CommitTarget: Send + Sync {
    fn ref_id(&self) -> RefId;

    /// Id of the newest committed version right now
    fn latest_commit(&self) -> CommitId;

    /// Bind `value` to this cell, or hand it back if it has the wrong type
    fn stage(self: Arc<Self>, value: Box<dyn Any + Send>) -> Result<StagedWrite, Box<dyn Any + Send>>;
}

impl<T> CommitTarget for VersionedCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn ref_id(&self) -> RefId {
        self.id
    }

    fn latest_commit(&self) -> CommitId {
        self.history.read().recent().id
    }

    fn stage(self: Arc<Self>, value: Box<dyn Any + Send>) -> Result<StagedWrite, Box<dyn Any + Send>> {
        let value = value.downcast::<T>()?;
        Ok(Box::new(move |id| self.install(id, *value)))
    }
}
