//! Activation functions, addressable by a parameterized name.
//!
//! Names follow `base[@p1[@p2]]`, e.g. `linear@2@0.5` or `rectifier@0.01`.

use crate::calculus::Real;
use crate::error::NeuriteError;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Separator between the base name and its parameters.
pub const SEPARATOR: char = '@';

/// A neuron activation function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activation {
    /// `a * x + b`. Defaults: `a = 1`, `b = 0`.
    Linear {
        /// Slope.
        a: f64,
        /// Offset.
        b: f64,
    },
    /// The logistic function `1 / (1 + e^-x)`, increasing in `x`.
    ///
    /// Weights trained under the mirrored form `1 / (1 + e^x)` give
    /// `1 - y` here; negate them (bias included) to carry such a model over.
    Sigmoid,
    /// `max(0, x) + a * min(0, x)`. Default: `a = 0`.
    Rectifier {
        /// Slope for negative inputs.
        a: f64,
    },
    /// Hyperbolic tangent.
    Tanh,
}

type Factory = fn(&[f64]) -> Activation;

static REGISTRY: Lazy<HashMap<&'static str, Factory>> = Lazy::new(|| {
    let mut registry: HashMap<&'static str, Factory> = HashMap::new();
    registry.insert("linear", |p| Activation::Linear {
        a: p.first().copied().unwrap_or(1.0),
        b: p.get(1).copied().unwrap_or(0.0),
    });
    registry.insert("sigmoid", |_| Activation::Sigmoid);
    registry.insert("rectifier", |p| Activation::Rectifier {
        a: p.first().copied().unwrap_or(0.0),
    });
    registry.insert("tanh", |_| Activation::Tanh);
    registry
});

impl Activation {
    /// Parses `name`, returning `None` for unknown bases or unparsable
    /// parameters.
    pub fn get(name: &str) -> Option<Activation> {
        let mut parts = name.split(SEPARATOR);
        let factory = REGISTRY.get(parts.next()?.trim())?;
        let params = parts
            .map(|p| p.trim().parse::<f64>().ok())
            .collect::<Option<Vec<_>>>()?;
        Some(factory(&params))
    }

    /// Registered base names.
    pub fn names() -> impl Iterator<Item = &'static str> {
        REGISTRY.keys().copied()
    }

    /// Canonical name, parseable by [`Activation::get`].
    pub fn name(&self) -> String {
        match self {
            Activation::Linear { a, b } => format!("linear{SEPARATOR}{a}{SEPARATOR}{b}"),
            Activation::Sigmoid => "sigmoid".to_string(),
            Activation::Rectifier { a } => format!("rectifier{SEPARATOR}{a}"),
            Activation::Tanh => "tanh".to_string(),
        }
    }

    /// Applies the function to `x`.
    #[inline]
    pub fn forward<T: Real>(&self, x: T) -> T {
        match *self {
            Activation::Linear { a, b } => T::of(a) * x + T::of(b),
            Activation::Sigmoid => T::one() / (T::one() + (-x).exp()),
            Activation::Rectifier { a } => x.max(T::zero()) + T::of(a) * x.min(T::zero()),
            Activation::Tanh => x.tanh(),
        }
    }

    /// Derivative at `x`.
    pub fn derivative<T: Real>(&self, x: T) -> T {
        match *self {
            Activation::Linear { a, .. } => T::of(a),
            Activation::Sigmoid => {
                let s = self.forward(x);
                s * (T::one() - s)
            }
            Activation::Rectifier { a } => {
                if x >= T::zero() {
                    T::one()
                } else {
                    T::of(a)
                }
            }
            Activation::Tanh => {
                let t = x.tanh();
                T::one() - t * t
            }
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for Activation {
    type Err = NeuriteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Activation::get(s).ok_or_else(|| NeuriteError::invalid(format!("unknown activation: {s}")))
    }
}
