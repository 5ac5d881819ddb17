//! Multi-layer perceptron (forward pass only).

mod layer;
mod network;

pub use layer::{Layer, LayerSpec, Neuron};
pub use network::{weight_count, Mlp};
