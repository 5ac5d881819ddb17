//! # Neurite - Concurrent Numeric Engine
//!
//! Neurite is a generic numeric engine for small neural networks: pooled
//! real-valued vectors and matrices, a bounded worker pool for
//! fine-grained data parallelism, and two consumers built on top of them,
//! a feed-forward Multi-Layer Perceptron (MLP) and a Self-Organizing Map
//! (SOM).
//!
//! ## Overview
//!
//! Every network receives an [`Engine`]: a shared [`BufferPool`] handing out
//! zeroed scratch buffers per element type, plus an [`Executor`] that fans
//! independent units of work (one neuron, one matrix row) out to workers and
//! waits for all of them. Each unit writes a disjoint destination, so results
//! are identical whatever the worker count.
//!
//! ## Key Features
//!
//! - **Generic reals**: everything works over `f32` and `f64` ([`Real`])
//! - **Matrix algebra**: products, determinants, cofactors, inverses and
//!   Gaussian elimination
//! - **MLP** forward activation with named, parameterized activations
//! - **SOM** with linear, rectangular and hexagonal topologies, pluggable
//!   neighborhoods, schedules and sample sources
//! - **Cancellation** of any parallel call through a [`CancelToken`]
//! - **JSON model files** for both network kinds
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use neurite::som::{Identity, Som, Trainer};
//! use neurite::learning::Constant;
//! use neurite::sampling::{Sampler, SliceSource};
//! use neurite::{CancelToken, Engine};
//!
//! let mut som: Som<f64> = Som::new(4, vec![2], Engine::default())?;
//! som.init()?;
//!
//! let samples = SliceSource::new(vec![vec![1.0, 0.0, 1.0, 0.0], vec![0.0, 1.0, 1.0, 0.0]]);
//! let mut trainer = Trainer::new(Sampler::systematic(samples), Constant(0.6), Identity);
//! trainer.train(&mut som, 10, &CancelToken::new())?;
//!
//! let bmu = som.best_matching_unit(&[1.0, 0.0, 1.0, 0.0], &CancelToken::new())?;
//! ```
//!
//! ## Architecture
//!
//! - [`calculus`] - Vectors, matrices, the buffer pool and algebra
//! - [`parallel`] - The bounded executor and cancellation
//! - [`activation`], [`metrics`], [`initializers`], [`learning`] - Named
//!   building blocks
//! - [`mlp`] - Multi-layer perceptron
//! - [`som`] - Self-Organizing Map and its trainer
//! - [`sampling`] - Sample sources and selection strategies
//! - [`codecs`] - Model persistence

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::needless_return)]

pub mod activation;
pub mod calculus;
pub mod codecs;
pub mod config;
pub mod engine;
pub mod error;
pub mod initializers;
pub mod learning;
pub mod metrics;
pub mod mlp;
pub mod parallel;
pub mod sampling;
pub mod som;

// Re-export commonly used types
pub use activation::Activation;
pub use calculus::{BufferPool, Matrix, PoolStats, Real, Vector};
pub use codecs::{MlpModel, SomModel};
pub use config::{Config, ExecutorConfig, PoolConfig, TrainingConfig};
pub use engine::Engine;
pub use error::{NeuriteError, Result};
pub use initializers::{Distribution, Initialize, Initializer};
pub use metrics::Metric;
pub use mlp::{LayerSpec, Mlp};
pub use parallel::{CancelToken, Executor};
pub use som::{Som, Topology, Trainer};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
