//! Neuron representation for the Self-Organizing Map.

use super::topology::Point;
use crate::calculus::vector::ops;
use crate::calculus::Real;
use crate::metrics::Metric;
use std::ops::Range;

/// A neuron in the Self-Organizing Map.
///
/// Each neuron has a fixed coordinate in topology space and a view into the
/// map's flat weight vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Neuron {
    point: Point,
    weights: Range<usize>,
}

impl Neuron {
    /// Creates a neuron at `point` owning `weights` of the flat vector.
    pub fn new(point: Point, weights: Range<usize>) -> Self {
        Self { point, weights }
    }

    /// Topological coordinate.
    #[inline]
    pub fn point(&self) -> &Point {
        &self.point
    }

    /// Position of this neuron's weights in the flat vector.
    #[inline]
    pub fn weight_range(&self) -> Range<usize> {
        self.weights.clone()
    }

    /// This neuron's weights within `all`.
    #[inline]
    pub fn weights<'a, T>(&self, all: &'a [T]) -> &'a [T] {
        &all[self.weights.clone()]
    }

    /// Distance between this neuron's weights and `input`.
    pub fn distance<T: Real>(&self, metric: Metric, all: &[T], input: &[T]) -> T {
        metric.distance(self.weights(all), input)
    }
}

/// Moves `weights` toward `input` by `influence`: `w += influence * (x - w)`.
///
/// `delta` is scratch space of the same length.
pub fn pull_towards<T: Real>(weights: &mut [T], input: &[T], influence: T, delta: &mut [T]) {
    ops::difference(input, weights)(&mut *delta);
    ops::multiply(influence)(&mut *delta);
    ops::add(delta)(weights);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_view() {
        let all = [1.0, 2.0, 3.0, 4.0];
        let neuron = Neuron::new(Point::from([1.0]), 2..4);
        assert_eq!(neuron.weights(&all), &[3.0, 4.0]);
        assert_eq!(neuron.point().coords(), &[1.0]);
    }

    #[test]
    fn test_distance() {
        let all = [1.0, 0.0, 0.0];
        let neuron = Neuron::new(Point::from([0.0]), 0..3);
        let dist = neuron.distance(Metric::Euclidean, &all, &[0.0, 1.0, 0.0]);
        assert!((dist - std::f64::consts::SQRT_2).abs() < 1e-10);
    }

    #[test]
    fn test_pull_towards() {
        let mut weights = [0.0f64; 3];
        let mut delta = [0.0f64; 3];
        pull_towards(&mut weights, &[1.0, 1.0, 1.0], 0.5, &mut delta);
        assert!((weights[0] - 0.5).abs() < 1e-10);

        pull_towards(&mut weights, &[1.0, 1.0, 1.0], 1.0, &mut delta);
        assert!(weights.iter().all(|&w| (w - 1.0).abs() < 1e-10));
    }
}
