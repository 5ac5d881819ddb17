//! Feed-forward multi-layer perceptron.

use super::layer::{Layer, LayerSpec};
use crate::calculus::Real;
use crate::engine::Engine;
use crate::error::{NeuriteError, Result};
use crate::initializers::Initialize;
use crate::parallel::CancelToken;
use log::info;
use std::fmt;

/// A feed-forward network of fully connected layers.
///
/// All weights live in one flat vector, layer after layer and neuron after
/// neuron; each neuron owns `inputs + 1` consecutive weights with the bias
/// last. Scratch buffers come from the engine's pool at [`Mlp::init`] and
/// go back to it on re-initialization or drop.
pub struct Mlp<T: Real> {
    input: usize,
    specs: Vec<LayerSpec>,
    weights: Vec<T>,
    layers: Vec<Layer<T>>,
    initializer: Option<Box<dyn Initialize<T> + Send>>,
    engine: Engine,
}

impl<T: Real> fmt::Debug for Mlp<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mlp")
            .field("input", &self.input)
            .field("layers", &self.specs)
            .field("weights", &self.weights.len())
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

/// Number of weights needed by `layers` fed with `input` values.
pub fn weight_count(input: usize, layers: &[LayerSpec]) -> usize {
    layers
        .iter()
        .scan(input, |inputs, spec| {
            let count = (*inputs + 1) * spec.neurons;
            *inputs = spec.neurons;
            Some(count)
        })
        .sum()
}

impl<T: Real> Mlp<T> {
    /// Creates an uninitialized network.
    pub fn new(input: usize, layers: Vec<LayerSpec>, engine: Engine) -> Self {
        Self {
            input,
            specs: layers,
            weights: Vec::new(),
            layers: Vec::new(),
            initializer: None,
            engine,
        }
    }

    /// Uses `weights` as the flat weight vector.
    pub fn with_weights(mut self, weights: Vec<T>) -> Self {
        self.weights = weights;
        self
    }

    /// Fills the weights with `initializer` when none were supplied.
    pub fn with_initializer(mut self, initializer: impl Initialize<T> + Send + 'static) -> Self {
        self.initializer = Some(Box::new(initializer));
        self
    }

    /// Validates the layout, fills missing weights and allocates the layer
    /// buffers.
    ///
    /// Fails on a zero input size, no layers, an empty layer, an unknown
    /// activation, a weight count mismatch, or when there are neither
    /// weights nor an initializer. On error the network is left unchanged.
    pub fn init(&mut self) -> Result<()> {
        if self.input == 0 {
            return Err(NeuriteError::invalid("input size must be positive"));
        }
        if self.specs.is_empty() {
            return Err(NeuriteError::invalid("network has no layers"));
        }
        if let Some(i) = self.specs.iter().position(|s| s.neurons == 0) {
            return Err(NeuriteError::invalid(format!("layer {i} has no neurons")));
        }
        let activations = self
            .specs
            .iter()
            .map(LayerSpec::resolve)
            .collect::<Result<Vec<_>>>()?;

        let required = weight_count(self.input, &self.specs);
        if self.weights.is_empty() {
            let Some(initializer) = self.initializer.as_mut() else {
                return Err(NeuriteError::invalid("neither weights nor initializer given"));
            };
            let mut weights = vec![T::zero(); required];
            initializer.initialize(&mut weights);
            self.weights = weights;
        } else if self.weights.len() != required {
            return Err(NeuriteError::invalid(format!(
                "expected {} weights, got {}",
                required,
                self.weights.len()
            )));
        }

        self.recycle();
        let pool = self.engine.pool();
        let mut inputs = self.input;
        let mut offset = 0;
        for (spec, activation) in self.specs.iter().zip(activations) {
            self.layers
                .push(Layer::new(pool, activation, inputs, spec.neurons, offset));
            offset += (inputs + 1) * spec.neurons;
            inputs = spec.neurons;
        }

        info!(
            "Initialized MLP: {} inputs, {} layers, {} weights",
            self.input,
            self.layers.len(),
            self.weights.len()
        );
        Ok(())
    }

    /// True once [`Mlp::init`] succeeded.
    pub fn is_initialized(&self) -> bool {
        !self.layers.is_empty()
    }

    /// Values expected by [`Mlp::activate`].
    pub fn input_size(&self) -> usize {
        self.input
    }

    /// Values produced by [`Mlp::activate`].
    pub fn output_size(&self) -> usize {
        self.specs.last().map_or(0, |s| s.neurons)
    }

    /// Layer layout.
    pub fn specs(&self) -> &[LayerSpec] {
        &self.specs
    }

    /// Initialized layers.
    pub fn layers(&self) -> &[Layer<T>] {
        &self.layers
    }

    /// The flat weight vector.
    pub fn weights(&self) -> &[T] {
        &self.weights
    }

    /// The flat weight vector, mutably.
    pub fn weights_mut(&mut self) -> &mut [T] {
        &mut self.weights
    }

    /// The engine used for fan-out and scratch buffers.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Feeds `input` forward and returns the last layer's output.
    ///
    /// Neurons of a layer are evaluated in parallel. After a cancellation
    /// the intermediate buffers hold partial results until the next full
    /// activation.
    pub fn activate(&mut self, input: &[T], cancel: &CancelToken) -> Result<&[T]> {
        if !self.is_initialized() {
            return Err(NeuriteError::invalid("MLP is not initialized"));
        }
        if input.len() != self.input {
            return Err(NeuriteError::invalid(format!(
                "input dimension {} does not match {}",
                input.len(),
                self.input
            )));
        }

        let executor = self.engine.executor();
        self.layers[0].load(input);
        for i in 0..self.layers.len() {
            self.layers[i].activate(&self.weights, executor, cancel)?;
            if let [current, next, ..] = &mut self.layers[i..] {
                next.load(current.output());
            }
        }
        Ok(self.layers[self.layers.len() - 1].output())
    }

    fn recycle(&mut self) {
        let pool = self.engine.pool();
        for layer in self.layers.drain(..) {
            layer.recycle(pool);
        }
    }
}

impl<T: Real> Drop for Mlp<T> {
    fn drop(&mut self) {
        self.recycle();
    }
}
