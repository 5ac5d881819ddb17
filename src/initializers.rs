//! Weight initializers.

use crate::calculus::Real;
use crate::error::{NeuriteError, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution as _, StandardNormal};
use serde::{Deserialize, Serialize};

/// Fills a weight buffer.
///
/// Implemented by [`Initializer`] and by any `FnMut(&mut [T])` closure.
pub trait Initialize<T> {
    /// Overwrites every element of `weights`.
    fn initialize(&mut self, weights: &mut [T]);
}

impl<T, F> Initialize<T> for F
where
    F: FnMut(&mut [T]),
{
    fn initialize(&mut self, weights: &mut [T]) {
        self(weights)
    }
}

/// Random distributions available to [`Initializer`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "distribution", rename_all = "snake_case")]
pub enum Distribution {
    /// Uniform over `[0, 1)`.
    Unit,
    /// Standard normal.
    Normal,
    /// Uniform over `[-1, 1)`.
    Uniform,
    /// Normal with standard deviation `sqrt(2 / (input + output))`.
    GlorotNormal {
        /// Fan-in.
        input: usize,
        /// Fan-out.
        output: usize,
    },
    /// Uniform over `±sqrt(6 / (input + output))`.
    GlorotUniform {
        /// Fan-in.
        input: usize,
        /// Fan-out.
        output: usize,
    },
    /// Normal with standard deviation `sqrt(2 / input)`.
    HeNormal {
        /// Fan-in.
        input: usize,
    },
    /// Uniform over `±sqrt(6 / input)`.
    HeUniform {
        /// Fan-in.
        input: usize,
    },
}

impl Distribution {
    /// Registered name of the distribution.
    pub fn name(&self) -> &'static str {
        match self {
            Distribution::Unit => "unit",
            Distribution::Normal => "normal",
            Distribution::Uniform => "uniform",
            Distribution::GlorotNormal { .. } => "glorot_normal",
            Distribution::GlorotUniform { .. } => "glorot_uniform",
            Distribution::HeNormal { .. } => "he_normal",
            Distribution::HeUniform { .. } => "he_uniform",
        }
    }

    fn fan(&self) -> Option<usize> {
        match *self {
            Distribution::GlorotNormal { input, output }
            | Distribution::GlorotUniform { input, output } => Some(input + output),
            Distribution::HeNormal { input } | Distribution::HeUniform { input } => Some(input),
            _ => None,
        }
    }
}

/// Generator seeded from `seed`, or from entropy when unset.
pub(crate) fn seeded_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// A seedable random initializer.
#[derive(Debug, Clone)]
pub struct Initializer {
    distribution: Distribution,
    rng: ChaCha8Rng,
}

impl Initializer {
    /// Creates an initializer drawing from `distribution`.
    ///
    /// With `seed` set the sequence is reproducible; otherwise the generator
    /// is seeded from entropy. Fan-based distributions reject a zero fan.
    pub fn new(distribution: Distribution, seed: Option<u64>) -> Result<Self> {
        if distribution.fan() == Some(0) {
            return Err(NeuriteError::invalid(format!(
                "{} initializer needs a positive fan",
                distribution.name()
            )));
        }
        Ok(Self {
            distribution,
            rng: seeded_rng(seed),
        })
    }

    /// Uniform `[0, 1)` initializer.
    pub fn unit(seed: Option<u64>) -> Self {
        Self {
            distribution: Distribution::Unit,
            rng: seeded_rng(seed),
        }
    }

    /// The distribution drawn from.
    pub fn distribution(&self) -> Distribution {
        self.distribution
    }

    fn sample(&mut self) -> f64 {
        let rng = &mut self.rng;
        let normal = |rng: &mut ChaCha8Rng| -> f64 { StandardNormal.sample(rng) };
        match self.distribution {
            Distribution::Unit => rng.gen::<f64>(),
            Distribution::Normal => normal(rng),
            Distribution::Uniform => rng.gen_range(-1.0..1.0),
            Distribution::GlorotNormal { input, output } => {
                normal(rng) * (2.0 / (input + output) as f64).sqrt()
            }
            Distribution::GlorotUniform { input, output } => {
                rng.gen_range(-1.0..1.0) * (6.0 / (input + output) as f64).sqrt()
            }
            Distribution::HeNormal { input } => normal(rng) * (2.0 / input as f64).sqrt(),
            Distribution::HeUniform { input } => {
                rng.gen_range(-1.0..1.0) * (6.0 / input as f64).sqrt()
            }
        }
    }
}

impl<T: Real> Initialize<T> for Initializer {
    fn initialize(&mut self, weights: &mut [T]) {
        for weight in weights {
            *weight = T::of(self.sample());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(initializer: &mut Initializer, size: usize) -> Vec<f64> {
        let mut weights = vec![0.0; size];
        initializer.initialize(&mut weights);
        weights
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = Initializer::new(Distribution::Normal, Some(42)).unwrap();
        let mut b = Initializer::new(Distribution::Normal, Some(42)).unwrap();
        assert_eq!(fill(&mut a, 16), fill(&mut b, 16));

        let mut c = Initializer::new(Distribution::Normal, Some(43)).unwrap();
        assert_ne!(fill(&mut a, 16), fill(&mut c, 16));
    }

    #[test]
    fn test_ranges() {
        let mut unit = Initializer::unit(Some(1));
        assert!(fill(&mut unit, 1000).iter().all(|&x| (0.0..1.0).contains(&x)));

        let mut uniform = Initializer::new(Distribution::Uniform, Some(1)).unwrap();
        let values = fill(&mut uniform, 1000);
        assert!(values.iter().all(|&x| (-1.0..1.0).contains(&x)));
        assert!(values.iter().any(|&x| x < 0.0));

        let mut glorot =
            Initializer::new(Distribution::GlorotUniform { input: 4, output: 2 }, Some(1)).unwrap();
        let limit = 1.0f64;
        assert!(fill(&mut glorot, 1000).iter().all(|&x| x.abs() <= limit));

        let mut he = Initializer::new(Distribution::HeUniform { input: 24 }, Some(1)).unwrap();
        assert!(fill(&mut he, 1000).iter().all(|&x| x.abs() <= 0.5));
    }

    #[test]
    fn test_normal_spread() {
        let mut he = Initializer::new(Distribution::HeNormal { input: 8 }, Some(7)).unwrap();
        let values = fill(&mut he, 20_000);
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / values.len() as f64;
        assert!(mean.abs() < 0.02);
        assert!((variance.sqrt() - 0.5).abs() < 0.02);
    }

    #[test]
    fn test_zero_fan_rejected() {
        assert!(Initializer::new(Distribution::HeNormal { input: 0 }, None).is_err());
        assert!(Initializer::new(
            Distribution::GlorotNormal {
                input: 0,
                output: 0
            },
            None
        )
        .is_err());
    }

    #[test]
    fn test_closure_initializer() {
        let mut counter = 0.0;
        let mut sequence = |weights: &mut [f32]| {
            for w in weights.iter_mut() {
                counter += 1.0;
                *w = counter;
            }
        };
        let mut weights = [0.0f32; 3];
        sequence.initialize(&mut weights[..]);
        assert_eq!(weights, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_f32_fill() {
        let mut unit = Initializer::unit(Some(3));
        let mut weights = vec![0.0f32; 8];
        unit.initialize(&mut weights);
        assert!(weights.iter().all(|&x| (0.0..1.0).contains(&x)));
    }
}
