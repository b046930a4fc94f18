//! Committed versions and bounded per-reference history
//!
//! Every transactional reference keeps a short list of the values it held,
//! newest first, each tagged with the commit that produced it. Readers pick
//! the newest version no later than their snapshot; the commit path prepends
//! and trims.
//!
//! ## Invariants
//!
//! - The history is never empty: the head always exists.
//! - Ids strictly decrease moving away from the head.
//! - At most `depth` versions are retained.

use crate::types::CommitId;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A value as of one commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version<T> {
    /// Commit that produced this value
    pub id: CommitId,
    /// The committed value
    pub value: T,
}

impl<T> Version<T> {
    /// Create a version
    pub fn new(id: CommitId, value: T) -> Self {
        Self { id, value }
    }
}

/// Bounded, newest-first version list
///
/// The head is stored outside the deque so that "history is non-empty" is
/// encoded in the type rather than checked at runtime.
#[derive(Debug, Clone)]
pub struct VersionHistory<T> {
    head: Version<T>,
    /// Older versions, newest first
    older: VecDeque<Version<T>>,
    depth: usize,
}

impl<T> VersionHistory<T> {
    /// Create a history holding only `seed`
    ///
    /// A `depth` of zero is treated as one: the head is always retained.
    pub fn new(seed: Version<T>, depth: usize) -> Self {
        let depth = depth.max(1);
        Self {
            head: seed,
            older: VecDeque::with_capacity(depth - 1),
            depth,
        }
    }

    /// Most recently committed version
    #[inline]
    pub fn recent(&self) -> &Version<T> {
        &self.head
    }

    /// Oldest retained version
    pub fn oldest(&self) -> &Version<T> {
        self.older.back().unwrap_or(&self.head)
    }

    /// Newest version with `id <= snapshot`
    ///
    /// Returns `None` when every retained version is newer than `snapshot`,
    /// i.e. the version a reader needs has been trimmed away (or the
    /// reference did not exist yet at that snapshot).
    pub fn visible_at(&self, snapshot: CommitId) -> Option<&Version<T>> {
        self.iter().find(|v| v.id <= snapshot)
    }

    /// Prepend a newly committed version, dropping the oldest beyond `depth`
    pub fn push(&mut self, version: Version<T>) {
        debug_assert!(
            version.id > self.head.id,
            "commit ids must increase: {} after {}",
            version.id,
            self.head.id
        );
        let previous = std::mem::replace(&mut self.head, version);
        if self.depth > 1 {
            self.older.push_front(previous);
            self.older.truncate(self.depth - 1);
        }
    }

    /// Number of retained versions
    pub fn len(&self) -> usize {
        1 + self.older.len()
    }

    /// Always false; present for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Maximum number of retained versions
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Iterate newest to oldest
    pub fn iter(&self) -> impl Iterator<Item = &Version<T>> {
        std::iter::once(&self.head).chain(self.older.iter())
    }
}
