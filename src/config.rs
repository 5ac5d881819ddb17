//! Configuration for the Neurite engine.

use crate::error::Result;
use crate::initializers::Initializer;
use crate::sampling::{Sampler, Source};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration for the Neurite engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Worker-pool configuration.
    pub executor: ExecutorConfig,

    /// Buffer pool configuration.
    pub pool: PoolConfig,

    /// SOM training configuration.
    pub training: TrainingConfig,
}

impl Config {
    /// Loads configuration from a JSON file.
    ///
    /// Missing sections and fields fall back to their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }
}

/// Worker-pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Upper bound on concurrent workers per parallel call.
    /// Default: 0 (use `2 * available_parallelism - 1`).
    pub parallelism: usize,

    /// Capacity of the bounded work queue between the dispatcher and workers.
    /// Default: 0 (one slot per worker).
    pub queue_depth: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            parallelism: 0,
            queue_depth: 0,
        }
    }
}

impl ExecutorConfig {
    /// Returns the effective target parallelism.
    pub fn target_parallelism(&self) -> usize {
        if self.parallelism > 0 {
            return self.parallelism;
        }
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        (cores * 2).saturating_sub(1).max(1)
    }
}

/// Buffer pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum number of idle buffers kept per element type.
    /// Default: 256.
    pub max_cached: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { max_cached: 256 }
    }
}

/// SOM training configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of epochs (full passes over the sample source).
    /// Default: 10.
    pub epochs: usize,

    /// Random seed for [`TrainingConfig::initializer`] and
    /// [`TrainingConfig::shuffled`].
    /// Default: None (seeded from entropy).
    pub seed: Option<u64>,

    /// Log progress every `log_every` epochs.
    /// Default: 1.
    pub log_every: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 10,
            seed: None,
            log_every: 1,
        }
    }
}

impl TrainingConfig {
    /// Uniform `[0, 1)` weight initializer seeded from `seed`.
    pub fn initializer(&self) -> Initializer {
        Initializer::unit(self.seed)
    }

    /// Shuffled sampler over `source` seeded from `seed`.
    pub fn shuffled<E: 'static, S: Source<E>>(&self, source: S) -> Sampler<E, S> {
        Sampler::shuffled(source, self.seed)
    }
}
