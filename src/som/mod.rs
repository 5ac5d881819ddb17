//! Self-Organizing Map (SOM) module.
//!
//! - **Topology** (topology.rs): neuron coordinates for linear, rectangular
//!   and hexagonal layouts
//! - **Map** (map.rs): the network, BMU search and parallel weight updates
//! - **Neighborhoods** (neighborhood.rs): how far the BMU's pull reaches
//! - **Training** (training.rs): the epoch loop over a sample source

mod map;
mod neighborhood;
mod neuron;
mod topology;
pub mod training;

pub use map::{Match, Som, State};
pub use neighborhood::{Bubble, Gaussian, Identity, Neighborhood};
pub use neuron::{pull_towards, Neuron};
pub use topology::{Point, Topology};
pub use training::{Trainer, TrainingMetrics};
