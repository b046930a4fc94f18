//! # mvstm
//!
//! Multi-version software transactional memory for in-process shared state.
//!
//! Shared values live in [`Ref`]s. Updates are grouped into transactions that
//! apply all their writes together or not at all, and each transaction reads
//! from one consistent snapshot regardless of concurrent writers. Conflicts
//! are detected optimistically at commit time and the losing transaction is
//! re-run from scratch.
//!
//! ## Quick Start
//!
//! ```
//! use mvstm::prelude::*;
//!
//! let stm = Stm::new();
//! let from = stm.new_ref(1500);
//! let to = stm.new_ref(200);
//!
//! stm.atomically(|| {
//!     let f = from.get()?;
//!     let t = to.get()?;
//!     from.set(f - 1000)?;
//!     to.set(t + 1000)
//! })
//! .unwrap();
//!
//! assert_eq!(from.get().unwrap(), 500);
//! assert_eq!(to.get().unwrap(), 1200);
//! ```
//!
//! ## Model
//!
//! - Each engine ([`Stm`]) keeps a commit counter advanced once per writing
//!   commit. A transaction's snapshot is the counter value when it starts.
//! - Each reference keeps its last few committed versions (10 by default,
//!   see [`StmBuilder::history_depth`]).
//! - A commit fails if any reference it wrote was committed to after its
//!   snapshot (first committer wins). The attempt is discarded and re-run.
//! - The active transaction is tracked per thread. Calling
//!   [`Stm::atomically`] inside a transaction joins it instead of starting a
//!   second one.

#![warn(missing_docs)]

mod reference;
mod stm;

pub mod prelude;

// Re-export main entry points
pub use reference::Ref;
pub use stm::{atomically, global, new_ref, transact, Stm, StmBuilder};

// Re-export engine types
pub use mvstm_concurrency::{TransactionMetrics, TxOutcome};
pub use mvstm_core::{
    CommitId, EngineId, RefId, StmConfig, StmError, StmResult, Version, DEFAULT_HISTORY_DEPTH,
};
