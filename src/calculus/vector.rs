//! One-dimensional real containers and reusable vector operations.

use super::num::Real;
use super::pool::BufferPool;
use crate::metrics::Metric;
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

/// An in-place operation over a vector's elements.
pub type VectorOp<'a, T> = &'a dyn Fn(&mut [T]);

/// An owned sequence of real values.
///
/// The length only changes through [`Vector::resize`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vector<T>(Vec<T>);

impl<T: Real> Vector<T> {
    /// Wraps an existing buffer.
    pub fn wrap(data: Vec<T>) -> Self {
        Self(data)
    }

    /// A vector of `size` zeros backed by a pooled buffer.
    pub fn zeros(pool: &BufferPool, size: usize) -> Self {
        Self(pool.acquire(size))
    }

    /// A pooled copy of `values`.
    pub fn copy_of(pool: &BufferPool, values: &[T]) -> Self {
        Self(pool.copy_of(values))
    }

    /// Number of elements.
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Grows or shrinks the vector, filling new slots with zeros.
    pub fn resize(&mut self, size: usize) {
        self.0.resize(size, T::zero());
    }

    /// Runs `ops` in order over the elements.
    pub fn apply(&mut self, ops: &[VectorOp<'_, T>]) -> &mut Self {
        for op in ops {
            op(&mut self.0);
        }
        self
    }

    /// Unwraps the backing buffer.
    pub fn into_inner(self) -> Vec<T> {
        self.0
    }

    /// Returns the backing buffer to `pool`.
    pub fn recycle(self, pool: &BufferPool) {
        pool.release(self.0);
    }
}

impl<T> Deref for Vector<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

impl<T> DerefMut for Vector<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.0
    }
}

impl<T> From<Vec<T>> for Vector<T> {
    fn from(data: Vec<T>) -> Self {
        Self(data)
    }
}

fn check_sizes<T>(a: &[T], b: &[T]) {
    assert_eq!(a.len(), b.len(), "unmatched size of vectors");
}

/// Sum of the pairwise products of `a` and `b`.
///
/// # Panics
/// When the lengths differ.
pub fn dot_product<T: Real>(a: &[T], b: &[T]) -> T {
    check_sizes(a, b);
    a.iter().zip(b).map(|(&x, &y)| x * y).sum()
}

/// `a + b` into a pooled vector.
pub fn add<T: Real>(pool: &BufferPool, a: &[T], b: &[T]) -> Vector<T> {
    let mut result = Vector::copy_of(pool, a);
    result.apply(&[&ops::add(b)]);
    result
}

/// `a - b` into a pooled vector.
pub fn subtract<T: Real>(pool: &BufferPool, a: &[T], b: &[T]) -> Vector<T> {
    let mut result = Vector::copy_of(pool, a);
    result.apply(&[&ops::subtract(b)]);
    result
}

/// `v * c` into a pooled vector.
pub fn multiply<T: Real>(pool: &BufferPool, v: &[T], c: T) -> Vector<T> {
    let mut result = Vector::copy_of(pool, v);
    result.apply(&[&ops::multiply(c)]);
    result
}

/// Distance of `v` from the origin under `metric`.
pub fn length<T: Real>(pool: &BufferPool, v: &[T], metric: Metric) -> T {
    let origin = pool.acquire(v.len());
    let length = metric.distance(&origin, v);
    pool.release(origin);
    length
}

/// `v` scaled to unit length under `metric`.
pub fn normalize<T: Real>(pool: &BufferPool, v: &[T], metric: Metric) -> Vector<T> {
    let mut result = Vector::copy_of(pool, v);
    result.apply(&[&ops::normalize(metric)]);
    result
}

/// A pooled copy of `v` without the element at `index`.
///
/// # Panics
/// When `index` is out of bounds.
pub fn exclude<T: Real>(pool: &BufferPool, v: &[T], index: usize) -> Vector<T> {
    assert!(index < v.len(), "index {index} out of bounds for length {}", v.len());
    let mut result = pool.acquire(v.len() - 1);
    result[..index].copy_from_slice(&v[..index]);
    result[index..].copy_from_slice(&v[index + 1..]);
    Vector(result)
}

/// Reusable in-place vector operations for [`Vector::apply`].
pub mod ops {
    use super::*;

    /// Adds `other` elementwise.
    pub fn add<T: Real>(other: &[T]) -> impl Fn(&mut [T]) + '_ {
        move |v| {
            check_sizes(v, other);
            v.iter_mut().zip(other).for_each(|(x, &y)| *x = *x + y);
        }
    }

    /// Subtracts `other` elementwise.
    pub fn subtract<T: Real>(other: &[T]) -> impl Fn(&mut [T]) + '_ {
        move |v| {
            check_sizes(v, other);
            v.iter_mut().zip(other).for_each(|(x, &y)| *x = *x - y);
        }
    }

    /// Overwrites the target with `a - b`.
    pub fn difference<'a, T: Real>(a: &'a [T], b: &'a [T]) -> impl Fn(&mut [T]) + 'a {
        move |v| {
            check_sizes(a, b);
            check_sizes(v, a);
            for ((x, &p), &q) in v.iter_mut().zip(a).zip(b) {
                *x = p - q;
            }
        }
    }

    /// Scales every element by `c`.
    pub fn multiply<T: Real>(c: T) -> impl Fn(&mut [T]) {
        move |v| v.iter_mut().for_each(|x| *x = *x * c)
    }

    /// Scales the target to unit length under `metric`.
    ///
    /// A zero-length vector is left as is.
    pub fn normalize<T: Real>(metric: Metric) -> impl Fn(&mut [T]) {
        move |v| {
            let origin = vec![T::zero(); v.len()];
            let length = metric.distance(&origin, v);
            if length == T::zero() {
                return;
            }
            v.iter_mut().for_each(|x| *x = *x / length);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_product() {
        assert_eq!(dot_product(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]), 32.0);
        assert_eq!(dot_product::<f32>(&[], &[]), 0.0);
    }

    #[test]
    #[should_panic(expected = "unmatched size of vectors")]
    fn test_dot_product_unmatched() {
        dot_product(&[1.0, 2.0], &[1.0]);
    }

    #[test]
    fn test_arithmetic() {
        let pool = BufferPool::default();
        let a = [1.0, 2.0, 3.0];
        let b = [0.5, 0.5, 0.5];
        assert_eq!(*add(&pool, &a, &b), [1.5, 2.5, 3.5]);
        assert_eq!(*subtract(&pool, &a, &b), [0.5, 1.5, 2.5]);
        assert_eq!(*multiply(&pool, &a, 2.0), [2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_length_and_normalize() {
        let pool = BufferPool::default();
        let v = [3.0, 4.0];
        assert!((length(&pool, &v, Metric::Euclidean) - 5.0f64).abs() < 1e-12);
        assert!((length(&pool, &v, Metric::Manhattan) - 7.0f64).abs() < 1e-12);

        let unit = normalize(&pool, &v, Metric::Euclidean);
        assert!((unit[0] - 0.6).abs() < 1e-12);
        assert!((unit[1] - 0.8).abs() < 1e-12);

        let zero = normalize(&pool, &[0.0f64, 0.0], Metric::Euclidean);
        assert_eq!(*zero, [0.0, 0.0]);
    }

    #[test]
    fn test_exclude() {
        let pool = BufferPool::default();
        assert_eq!(*exclude(&pool, &[1.0, 2.0, 3.0], 1), [1.0, 3.0]);
        assert!(exclude(&pool, &[1.0f32], 0).is_empty());
    }

    #[test]
    fn test_apply_runs_in_order() {
        let mut v = Vector::wrap(vec![1.0, 2.0]);
        v.apply(&[&ops::add(&[1.0, 1.0]), &ops::multiply(3.0)]);
        assert_eq!(*v, [6.0, 9.0]);

        v.apply(&[&ops::difference(&[1.0, 1.0], &[0.5, 0.25])]);
        assert_eq!(*v, [0.5, 0.75]);
    }

    #[test]
    fn test_resize() {
        let mut v = Vector::wrap(vec![1.0f64]);
        v.resize(3);
        assert_eq!(v.size(), 3);
        assert_eq!(*v, [1.0, 0.0, 0.0]);
        v.resize(0);
        assert!(v.is_empty());
    }
}
