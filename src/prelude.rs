//! Convenient imports for mvstm.
//!
//! ```
//! use mvstm::prelude::*;
//!
//! let counter = new_ref(0);
//! atomically(|| counter.update(|n| n + 1)).unwrap();
//! ```

// Main entry points
pub use crate::reference::Ref;
pub use crate::stm::{atomically, new_ref, Stm, StmBuilder};

// Error handling
pub use mvstm_core::{StmError, StmResult};

// Core types
pub use mvstm_concurrency::TxOutcome;
pub use mvstm_core::{CommitId, StmConfig, Version};
