//! Transactional references.

use mvstm_concurrency::{context, VersionedCell};
use mvstm_core::{RefId, StmError, StmResult, Version};
use std::sync::Arc;

/// A shared, versioned cell updated only through transactions.
///
/// Reads are context-sensitive: outside a transaction [`get`](Self::get)
/// returns the latest committed value; inside one it returns the value as of
/// the transaction's snapshot (or the transaction's own pending write).
/// Writes are only allowed inside a transaction and stay private to it until
/// commit.
///
/// Handles are cheap to clone and all clones name the same reference.
pub struct Ref<T> {
    cell: Arc<VersionedCell<T>>,
}

impl<T> Ref<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn from_cell(cell: Arc<VersionedCell<T>>) -> Self {
        Self { cell }
    }

    /// Read the value visible in the current context.
    ///
    /// # Errors
    ///
    /// Inside a transaction: [`StmError::NoVisibleVersion`] if no retained
    /// version is as old as the snapshot, [`StmError::EngineMismatch`] if this
    /// reference belongs to a different engine. Never fails outside one.
    pub fn get(&self) -> StmResult<T> {
        match context::with_active(|txn| txn.read(&self.cell)) {
            Some(result) => result,
            None => Ok(self.cell.recent().value),
        }
    }

    /// Buffer `value` as this reference's new value; returns it.
    ///
    /// # Errors
    ///
    /// [`StmError::WriteOutsideTransaction`] when no transaction is active.
    pub fn set(&self, value: T) -> StmResult<T> {
        context::with_active(|txn| txn.write(&self.cell, value)).unwrap_or_else(|| {
            Err(StmError::WriteOutsideTransaction {
                ref_id: self.cell.id(),
            })
        })
    }

    /// Read, apply `f`, and write the result back; returns the new value.
    pub fn update<F>(&self, f: F) -> StmResult<T>
    where
        F: FnOnce(T) -> T,
    {
        let current = self.get()?;
        self.set(f(current))
    }

    /// The most recently committed version, ignoring any transaction.
    pub fn recent(&self) -> Version<T> {
        self.cell.recent()
    }

    /// Every retained version, newest first.
    pub fn history(&self) -> Vec<Version<T>> {
        self.cell.history()
    }

    /// Number of retained versions.
    pub fn history_len(&self) -> usize {
        self.cell.history_len()
    }

    /// Identity of this reference.
    pub fn id(&self) -> RefId {
        self.cell.id()
    }

    /// True if both handles name the same reference.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T> std::fmt::Debug for Ref<T>
where
    T: Clone + Send + Sync + std::fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ref")
            .field("id", &self.cell.id())
            .field("recent", &self.cell.recent())
            .finish()
    }
}
