//! Engine entry point for mvstm.
//!
//! This module provides the `Stm` struct, which owns a commit counter and
//! commit lock, creates references, and runs transactions against them.

use crate::reference::Ref;
use mvstm_concurrency::{driver, TransactionManager, TransactionMetrics, TxOutcome};
use mvstm_core::{CommitId, EngineId, StmConfig, StmResult};
use once_cell::sync::Lazy;
use std::sync::Arc;

/// An STM engine.
///
/// Every reference belongs to the engine that created it; transactions on one
/// engine never see another engine's references. Cloning an `Stm` yields a
/// handle to the same engine.
///
/// # Example
///
/// ```
/// use mvstm::Stm;
///
/// let stm = Stm::new();
/// let balance = stm.new_ref(100);
///
/// stm.atomically(|| {
///     let current = balance.get()?;
///     balance.set(current - 30)
/// })
/// .unwrap();
///
/// assert_eq!(balance.get().unwrap(), 70);
/// ```
#[derive(Clone)]
pub struct Stm {
    inner: Arc<TransactionManager>,
}

impl Stm {
    /// Create an engine with default settings.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(TransactionManager::default()),
        }
    }

    /// Create a builder for engine configuration.
    ///
    /// # Example
    ///
    /// ```
    /// let stm = mvstm::Stm::builder().history_depth(4).build().unwrap();
    /// assert_eq!(stm.config().history_depth, 4);
    /// ```
    pub fn builder() -> StmBuilder {
        StmBuilder::new()
    }

    /// Create a reference seeded with `value` at the current commit counter.
    ///
    /// A reference created inside a transaction body may be newer than that
    /// transaction's snapshot; reading it before writing it then fails the
    /// attempt, which is retried.
    pub fn new_ref<T>(&self, value: T) -> Ref<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        Ref::from_cell(self.inner.new_cell(value))
    }

    /// Run `work` atomically and return its value.
    ///
    /// At the top level this only returns after an attempt commits: errors
    /// returned by `work` and commit conflicts both discard the attempt and
    /// run `work` again with a fresh snapshot, with no limit and no delay.
    /// `work` must therefore be safe to run repeatedly.
    ///
    /// Inside another transaction on the same thread, `work` joins it and
    /// runs exactly once; its error, if any, is returned so `?` hands it to
    /// the outer attempt.
    pub fn atomically<R, F>(&self, work: F) -> StmResult<R>
    where
        F: FnMut() -> StmResult<R>,
    {
        self.transact(work).map(|outcome| outcome.value)
    }

    /// Like [`atomically`](Self::atomically), also reporting commit id and
    /// attempt count.
    pub fn transact<R, F>(&self, work: F) -> StmResult<TxOutcome<R>>
    where
        F: FnMut() -> StmResult<R>,
    {
        driver::run(&self.inner, work)
    }

    /// Get the current commit counter.
    pub fn current_version(&self) -> CommitId {
        self.inner.current_version()
    }

    /// Get the engine's identity.
    pub fn engine_id(&self) -> EngineId {
        self.inner.engine_id()
    }

    /// Get the active configuration.
    pub fn config(&self) -> &StmConfig {
        self.inner.config()
    }

    /// Get transaction metrics.
    pub fn metrics(&self) -> TransactionMetrics {
        self.inner.metrics()
    }
}

impl Default for Stm {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Stm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Stm").field(&self.inner).finish()
    }
}

/// Builder for engine configuration.
///
/// # Example
///
/// ```
/// use mvstm::{Stm, StmConfig};
///
/// let stm = Stm::builder()
///     .config(StmConfig::default().with_history_depth(32))
///     .build()
///     .unwrap();
/// assert_eq!(stm.config().history_depth, 32);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StmBuilder {
    config: StmConfig,
}

impl StmBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: StmConfig) -> Self {
        self.config = config;
        self
    }

    /// Set how many versions each reference retains (default 10).
    ///
    /// Long-running transactions need enough history to still find a version
    /// at their snapshot; too little makes them retry.
    pub fn history_depth(mut self, depth: usize) -> Self {
        self.config.history_depth = depth;
        self
    }

    /// Validate the configuration and create the engine.
    pub fn build(self) -> StmResult<Stm> {
        let manager = TransactionManager::new(self.config)?;
        tracing::debug!(
            engine = %manager.engine_id(),
            history_depth = manager.config().history_depth,
            "engine created"
        );
        Ok(Stm {
            inner: Arc::new(manager),
        })
    }
}

static DEFAULT_STM: Lazy<Stm> = Lazy::new(Stm::new);

/// The process-wide default engine.
pub fn global() -> &'static Stm {
    &DEFAULT_STM
}

/// Create a reference on the default engine.
pub fn new_ref<T>(value: T) -> Ref<T>
where
    T: Clone + Send + Sync + 'static,
{
    DEFAULT_STM.new_ref(value)
}

/// Run `work` atomically on the default engine.
///
/// ```
/// let counter = mvstm::new_ref(0u64);
/// mvstm::atomically(|| counter.update(|n| n + 1)).unwrap();
/// assert_eq!(counter.get().unwrap(), 1);
/// ```
pub fn atomically<R, F>(work: F) -> StmResult<R>
where
    F: FnMut() -> StmResult<R>,
{
    DEFAULT_STM.atomically(work)
}

/// Run `work` atomically on the default engine, reporting the outcome.
pub fn transact<R, F>(work: F) -> StmResult<TxOutcome<R>>
where
    F: FnMut() -> StmResult<R>,
{
    DEFAULT_STM.transact(work)
}
