//! Engine configuration

use crate::error::{StmError, StmResult};
use serde::{Deserialize, Serialize};

/// Default number of versions retained per reference
pub const DEFAULT_HISTORY_DEPTH: usize = 10;

/// Tunables for one STM engine
///
/// Deserializes from any serde format; missing fields take their defaults.
///
/// ```
/// use mvstm_core::StmConfig;
///
/// let config = StmConfig::default().with_history_depth(4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StmConfig {
    /// Maximum versions retained per reference
    ///
    /// Transactions whose snapshot is older than every retained version of a
    /// reference they read cannot see it and are retried.
    pub history_depth: usize,
}

impl StmConfig {
    /// Set the history depth
    pub fn with_history_depth(mut self, depth: usize) -> Self {
        self.history_depth = depth;
        self
    }

    /// Reject configurations the engine cannot honor
    pub fn validate(&self) -> StmResult<()> {
        if self.history_depth == 0 {
            return Err(StmError::InvalidConfig(
                "history_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for StmConfig {
    fn default() -> Self {
        Self {
            history_depth: DEFAULT_HISTORY_DEPTH,
        }
    }
}
