//! Concurrency layer for mvstm
//!
//! This crate implements multi-version optimistic concurrency control with:
//! - VersionedCell: bounded per-reference version history
//! - Transaction: snapshot id plus buffered reads and writes
//! - Thread-local active-transaction context
//! - Conflict detection at commit time (first-committer-wins)
//! - TransactionManager: commit counter, commit lock, metrics
//! - Retry driver with nested-call pass-through

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cell;
pub mod context;
pub mod driver;
pub mod manager;
pub mod transaction;
pub mod validation;

pub use cell::VersionedCell;
pub use driver::{run, TxOutcome};
pub use manager::{TransactionManager, TransactionMetrics};
pub use transaction::Transaction;
pub use validation::validate_write_set;
