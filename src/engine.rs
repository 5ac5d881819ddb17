//! The shared numeric engine: one buffer pool plus one executor.

use crate::calculus::pool::BufferPool;
use crate::config::Config;
use crate::parallel::Executor;
use std::sync::Arc;

/// Handle bundling the buffer pool and the worker executor.
///
/// Cloning is cheap; clones share the same pool. Networks, trainers and the
/// matrix algebra all receive an `Engine` instead of reaching for global
/// state.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    pool: Arc<BufferPool>,
    executor: Executor,
}

impl Engine {
    /// Builds an engine from configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            pool: Arc::new(BufferPool::new(&config.pool)),
            executor: Executor::new(&config.executor),
        }
    }

    /// Builds an engine from existing parts.
    pub fn from_parts(pool: Arc<BufferPool>, executor: Executor) -> Self {
        Self { pool, executor }
    }

    /// An engine that runs everything on the calling thread.
    pub fn sequential() -> Self {
        Self::from_parts(Arc::default(), Executor::sequential())
    }

    /// The buffer pool.
    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }

    /// A shared handle to the buffer pool.
    pub fn pool_handle(&self) -> Arc<BufferPool> {
        Arc::clone(&self.pool)
    }

    /// The worker executor.
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// The same pool with a different executor.
    pub fn with_executor(&self, executor: Executor) -> Self {
        Self::from_parts(self.pool_handle(), executor)
    }
}
