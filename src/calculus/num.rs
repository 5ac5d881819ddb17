//! Real scalar types supported by the containers.

use super::pool::{BufferPool, Shard};
use num_traits::Float;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{Debug, Display};
use std::iter::Sum;

/// A real scalar type usable in vectors, matrices and networks.
///
/// Implemented for `f32` and `f64`. Each type owns one shard of the
/// [`BufferPool`].
pub trait Real:
    Float + Sum + Debug + Display + Default + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Magnitude below which a value counts as zero (determinant checks).
    const ZERO_TOLERANCE: Self;

    /// Converts an `f64` into this type.
    fn of(value: f64) -> Self;

    /// Widens this value to `f64`.
    fn as_f64(self) -> f64;

    /// Returns the pool shard holding buffers of this type.
    fn shard(pool: &BufferPool) -> &Shard<Self>;

    /// Returns true when `|self| < ZERO_TOLERANCE`.
    #[inline]
    fn is_near_zero(self) -> bool {
        self.abs() < Self::ZERO_TOLERANCE
    }
}

impl Real for f32 {
    const ZERO_TOLERANCE: Self = 1e-14;

    #[inline]
    fn of(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn as_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn shard(pool: &BufferPool) -> &Shard<Self> {
        &pool.f32
    }
}

impl Real for f64 {
    const ZERO_TOLERANCE: Self = 1e-29;

    #[inline]
    fn of(value: f64) -> Self {
        value
    }

    #[inline]
    fn as_f64(self) -> f64 {
        self
    }

    #[inline]
    fn shard(pool: &BufferPool) -> &Shard<Self> {
        &pool.f64
    }
}

/// Rounds `value` to `precision` decimal places.
pub fn round<T: Real>(value: T, precision: i32) -> T {
    let ratio = 10f64.powi(precision);
    T::of((value.as_f64() * ratio).round() / ratio)
}
