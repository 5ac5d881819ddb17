//! Fully connected layers.

use crate::activation::Activation;
use crate::calculus::vector::dot_product;
use crate::calculus::{BufferPool, Real};
use crate::error::{NeuriteError, Result};
use crate::parallel::{CancelToken, Executor};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Shape of one layer as persisted: neuron count and activation name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSpec {
    /// Number of neurons.
    pub neurons: usize,
    /// Activation name, e.g. `sigmoid` or `rectifier@0.01`.
    pub activation: String,
}

impl LayerSpec {
    /// Creates a layer spec.
    pub fn new(neurons: usize, activation: impl Into<String>) -> Self {
        Self {
            neurons,
            activation: activation.into(),
        }
    }

    /// Parses the activation name.
    pub fn resolve(&self) -> Result<Activation> {
        Activation::get(&self.activation).ok_or_else(|| {
            NeuriteError::invalid(format!("unknown activation: {}", self.activation))
        })
    }
}

/// An MLP neuron: a view of `inputs + 1` weights, the last one being the
/// bias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neuron {
    weights: Range<usize>,
}

impl Neuron {
    /// A neuron over `weights` of the network's flat vector.
    pub fn new(weights: Range<usize>) -> Self {
        Self { weights }
    }

    /// Position of the weights in the flat vector.
    pub fn weight_range(&self) -> Range<usize> {
        self.weights.clone()
    }

    /// This neuron's weights within `all`.
    pub fn weights<'a, T>(&self, all: &'a [T]) -> &'a [T] {
        &all[self.weights.clone()]
    }
}

/// A layer with pre-allocated input and output buffers.
///
/// The input buffer holds the previous layer's values followed by a
/// constant `1` feeding the bias weight.
#[derive(Debug)]
pub struct Layer<T> {
    activation: Activation,
    neurons: Vec<Neuron>,
    input: Vec<T>,
    output: Vec<T>,
}

impl<T: Real> Layer<T> {
    /// Builds a layer of `neurons` reading `inputs` values, with weights
    /// starting at `offset` of the flat vector.
    pub(crate) fn new(
        pool: &BufferPool,
        activation: Activation,
        inputs: usize,
        neurons: usize,
        offset: usize,
    ) -> Self {
        let stride = inputs + 1;
        let neurons = (0..neurons)
            .map(|j| Neuron::new(offset + j * stride..offset + (j + 1) * stride))
            .collect::<Vec<_>>();
        let mut input = pool.acquire::<T>(stride);
        input[inputs] = T::one();
        let output = pool.acquire::<T>(neurons.len());
        Self {
            activation,
            neurons,
            input,
            output,
        }
    }

    /// Activation function.
    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Neurons in output order.
    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    /// Number of values this layer reads, without the bias.
    pub fn inputs(&self) -> usize {
        self.input.len() - 1
    }

    /// Output of the last activation.
    pub fn output(&self) -> &[T] {
        &self.output
    }

    /// Writes `values` into the input buffer, leaving the bias slot alone.
    pub(crate) fn load(&mut self, values: &[T]) {
        let inputs = self.inputs();
        self.input[..inputs].copy_from_slice(values);
    }

    /// Computes `output[j] = f(dot(input, W[j]))`, one neuron per unit.
    pub(crate) fn activate(
        &mut self,
        weights: &[T],
        executor: &Executor,
        cancel: &CancelToken,
    ) -> Result<()> {
        let (input, neurons, activation) = (&self.input, &self.neurons, self.activation);
        executor.for_each_mut_cancellable(&mut self.output, cancel, |j, out| {
            *out = activation.forward(dot_product(input, neurons[j].weights(weights)));
        })
    }

    /// Returns both buffers to `pool`.
    pub(crate) fn recycle(self, pool: &BufferPool) {
        pool.release(self.input);
        pool.release(self.output);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_layout() {
        let pool = BufferPool::default();
        let layer: Layer<f64> = Layer::new(&pool, Activation::Sigmoid, 3, 2, 4);
        assert_eq!(layer.inputs(), 3);
        assert_eq!(layer.output().len(), 2);
        assert_eq!(layer.neurons()[0].weight_range(), 4..8);
        assert_eq!(layer.neurons()[1].weight_range(), 8..12);
        assert_eq!(layer.input, vec![0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_activate_with_bias() {
        let pool = BufferPool::default();
        let linear = Activation::Linear { a: 1.0, b: 0.0 };
        let mut layer: Layer<f64> = Layer::new(&pool, linear, 2, 2, 0);
        layer.load(&[1.0, 2.0]);
        let weights = [1.0, 1.0, 0.5, -1.0, 0.0, 3.0];
        layer
            .activate(&weights, &Executor::with_parallelism(2), &CancelToken::new())
            .unwrap();
        assert_eq!(layer.output(), &[3.5, 2.0]);
        layer.recycle(&pool);
        assert_eq!(pool.idle::<f64>(), 2);
    }

    #[test]
    fn test_resolve() {
        assert!(LayerSpec::new(3, "rectifier@0.1").resolve().is_ok());
        assert!(LayerSpec::new(3, "softmax").resolve().is_err());
    }
}
