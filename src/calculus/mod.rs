//! Numeric containers, the buffer pool and matrix algebra.
//!
//! - **Numbers** (num.rs): the [`Real`] bound over `f32` and `f64`
//! - **Pool** (pool.rs): type-sharded, reusable scratch buffers
//! - **Vectors** (vector.rs) and **matrices** (matrix.rs) with in-place
//!   operation pipelines
//! - **Algebra** (algebra.rs): products, determinants, inverses and
//!   elimination, run through an [`Engine`](crate::Engine)

mod algebra;
pub mod matrix;
pub mod num;
pub mod pool;
pub mod vector;

pub use matrix::Matrix;
pub use num::{round, Real};
pub use pool::{BufferPool, PoolStats, Shard};
pub use vector::Vector;
