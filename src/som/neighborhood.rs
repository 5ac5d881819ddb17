//! Neighborhood functions: how strongly a neuron follows the BMU.

use super::topology::Point;
use crate::learning::Schedule;
use crate::metrics::Metric;

/// Rate in `[0, 1]` at which `neighbor` is pulled along with `bmu`.
///
/// Called concurrently from update workers.
pub trait Neighborhood: Send + Sync {
    /// Rate for `neighbor` when `bmu` won at `epoch`.
    fn rate(&self, bmu: &Point, neighbor: &Point, epoch: usize) -> f64;
}

impl<F> Neighborhood for F
where
    F: Fn(&Point, &Point, usize) -> f64 + Send + Sync,
{
    fn rate(&self, bmu: &Point, neighbor: &Point, epoch: usize) -> f64 {
        self(bmu, neighbor, epoch)
    }
}

/// Only the BMU itself learns.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Neighborhood for Identity {
    fn rate(&self, bmu: &Point, neighbor: &Point, _epoch: usize) -> f64 {
        if bmu == neighbor {
            1.0
        } else {
            0.0
        }
    }
}

/// `exp(-d² / 2r²)` with `d` the topological distance and `r` the radius
/// at the current epoch.
///
/// A radius of zero or less collapses to [`Identity`].
#[derive(Debug, Clone, Copy)]
pub struct Gaussian<R> {
    metric: Metric,
    radius: R,
}

impl<R: Schedule> Gaussian<R> {
    /// Gaussian falloff under `metric` with a radius schedule.
    pub fn new(metric: Metric, radius: R) -> Self {
        Self { metric, radius }
    }
}

impl<R: Schedule> Neighborhood for Gaussian<R> {
    fn rate(&self, bmu: &Point, neighbor: &Point, epoch: usize) -> f64 {
        let r = self.radius.at(epoch);
        if r <= 0.0 {
            return Identity.rate(bmu, neighbor, epoch);
        }
        let d = self.metric.distance(bmu.coords(), neighbor.coords());
        (-d * d / (2.0 * r * r)).exp()
    }
}

/// Full rate within the radius, nothing outside.
#[derive(Debug, Clone, Copy)]
pub struct Bubble<R> {
    metric: Metric,
    radius: R,
}

impl<R: Schedule> Bubble<R> {
    /// Hard cut-off at the scheduled radius under `metric`.
    pub fn new(metric: Metric, radius: R) -> Self {
        Self { metric, radius }
    }
}

impl<R: Schedule> Neighborhood for Bubble<R> {
    fn rate(&self, bmu: &Point, neighbor: &Point, epoch: usize) -> f64 {
        let d = self.metric.distance(bmu.coords(), neighbor.coords());
        if d.abs() <= self.radius.at(epoch) {
            1.0
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learning::{Constant, ExponentialDecay};

    #[test]
    fn test_identity() {
        let a = Point::from([1.0, 2.0]);
        let b = Point::from([1.0, 3.0]);
        assert_eq!(Identity.rate(&a, &a, 1), 1.0);
        assert_eq!(Identity.rate(&a, &b, 1), 0.0);
    }

    #[test]
    fn test_gaussian() {
        let gaussian = Gaussian::new(Metric::Euclidean, Constant(2.0));
        let origin = Point::from([0.0, 0.0]);
        assert!((gaussian.rate(&origin, &origin, 1) - 1.0).abs() < 1e-10);

        let near = gaussian.rate(&origin, &Point::from([1.0, 0.0]), 1);
        let far = gaussian.rate(&origin, &Point::from([3.0, 4.0]), 1);
        assert!(far < near);
        assert!((far - (-25.0f64 / 8.0).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_gaussian_shrinks_with_radius() {
        let gaussian = Gaussian::new(Metric::Euclidean, ExponentialDecay::new(4.0, 1.0, 10));
        let origin = Point::from([0.0]);
        let neighbor = Point::from([2.0]);
        assert!(gaussian.rate(&origin, &neighbor, 1) > gaussian.rate(&origin, &neighbor, 10));
    }

    #[test]
    fn test_gaussian_zero_radius() {
        let gaussian = Gaussian::new(Metric::Euclidean, Constant(0.0));
        let origin = Point::from([0.0]);
        assert_eq!(gaussian.rate(&origin, &origin, 1), 1.0);
        assert_eq!(gaussian.rate(&origin, &Point::from([1.0]), 1), 0.0);
    }

    #[test]
    fn test_bubble() {
        let bubble = Bubble::new(Metric::Manhattan, Constant(1.0));
        let origin = Point::from([0.0, 0.0]);
        assert_eq!(bubble.rate(&origin, &Point::from([1.0, 0.0]), 1), 1.0);
        assert_eq!(bubble.rate(&origin, &Point::from([1.0, 1.0]), 1), 0.0);
    }

    #[test]
    fn test_closure() {
        let flat = |_: &Point, _: &Point, _: usize| 0.25;
        assert_eq!(flat.rate(&Point::from([0.0]), &Point::from([5.0]), 3), 0.25);
    }
}
