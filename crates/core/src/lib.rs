//! Core types for mvstm
//!
//! This crate defines the leaf data model shared by the engine:
//! - [`Version`] / [`VersionHistory`]: bounded, newest-first committed values
//! - [`StmError`]: every failure the engine raises
//! - [`StmConfig`]: engine tunables
//! - Identifier types in [`types`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod types;
pub mod version;

pub use config::{StmConfig, DEFAULT_HISTORY_DEPTH};
pub use error::{StmError, StmResult};
pub use types::{CommitId, EngineId, RefId};
pub use version::{Version, VersionHistory};
