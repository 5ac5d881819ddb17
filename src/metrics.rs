//! Distance metrics, addressable by name.

use crate::calculus::Real;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A distance function between two equally sized vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Square root of the summed squared differences.
    #[default]
    Euclidean,
    /// Sum of absolute differences.
    Manhattan,
    /// Plain sum of the signed differences `x - y`.
    Sum,
}

static REGISTRY: Lazy<HashMap<&'static str, Metric>> = Lazy::new(|| {
    [Metric::Euclidean, Metric::Manhattan, Metric::Sum]
        .into_iter()
        .map(|metric| (metric.name(), metric))
        .collect()
});

impl Metric {
    /// Looks a metric up by its registered name.
    pub fn get(name: &str) -> Option<Metric> {
        REGISTRY.get(name).copied()
    }

    /// Every registered name.
    pub fn names() -> impl Iterator<Item = &'static str> {
        REGISTRY.keys().copied()
    }

    /// The registered name.
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Euclidean => "euclidean",
            Metric::Manhattan => "manhattan",
            Metric::Sum => "sum",
        }
    }

    /// Distance between `x` and `y`.
    ///
    /// # Panics
    /// When the lengths differ.
    pub fn distance<T: Real>(&self, x: &[T], y: &[T]) -> T {
        assert_eq!(x.len(), y.len(), "unmatched size of vectors");
        let differences = x.iter().zip(y).map(|(&a, &b)| a - b);
        match self {
            Metric::Euclidean => differences.map(|d| d * d).sum::<T>().sqrt(),
            Metric::Manhattan => differences.map(|d| d.abs()).sum(),
            Metric::Sum => differences.sum(),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
