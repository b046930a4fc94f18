//! Identifier types shared by every layer
//!
//! - [`CommitId`]: position in an engine's total commit order
//! - [`RefId`]: process-unique identity of a transactional reference
//! - [`EngineId`]: process-unique identity of an STM engine

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Commit counter value
///
/// A transaction's snapshot id and a version's commit id are both `CommitId`s
/// drawn from the same engine counter.
pub type CommitId = u64;

static NEXT_REF_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_ENGINE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a transactional reference
///
/// Transactions key their buffers by `RefId`, so two handles cloned from the
/// same reference share one identity while two references holding equal
/// values never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RefId(u64);

impl RefId {
    /// Allocate a fresh, never-before-used id
    ///
    /// # Examples
    ///
    /// ```
    /// use mvstm_core::types::RefId;
    ///
    /// let a = RefId::next();
    /// let b = RefId::next();
    /// assert_ne!(a, b);
    /// ```
    pub fn next() -> Self {
        RefId(NEXT_REF_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RefId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ref#{}", self.0)
    }
}

/// Identity of an STM engine
///
/// References and transactions remember which engine created them; mixing
/// engines inside one transaction is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EngineId(u64);

impl EngineId {
    /// Allocate a fresh engine id
    pub fn next() -> Self {
        EngineId(NEXT_ENGINE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for EngineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "engine#{}", self.0)
    }
}
