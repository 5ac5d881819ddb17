//! SOM training.
//!
//! Each epoch pulls samples from a [`Samples`] source. For every sample the
//! BMU is located and all neurons are moved toward the sample by
//! `learning_rate(epoch) * neighborhood(bmu, neuron, epoch)`.

use super::map::Som;
use super::neighborhood::Neighborhood;
use crate::calculus::Real;
use crate::config::TrainingConfig;
use crate::error::{NeuriteError, Result};
use crate::initializers::Initialize;
use crate::learning::Schedule;
use crate::parallel::CancelToken;
use crate::sampling::Samples;
use log::{debug, info};

/// Per-epoch statistics collected while training.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingMetrics {
    /// Samples seen in each epoch.
    pub samples: Vec<usize>,
    /// Mean BMU distance in each epoch, measured before the update.
    pub mean_distances: Vec<f64>,
}

impl TrainingMetrics {
    /// Number of completed epochs.
    pub fn epochs(&self) -> usize {
        self.samples.len()
    }
}

/// SOM trainer with pluggable sampling, learning rate and neighborhood.
pub struct Trainer<T> {
    sampler: Box<dyn Samples<T>>,
    learning_rate: Box<dyn Schedule>,
    neighborhood: Box<dyn Neighborhood>,
    initializer: Option<Box<dyn Initialize<T>>>,
    epochs: usize,
    log_every: usize,
}

impl<T: Real> Trainer<T> {
    /// Creates a trainer.
    pub fn new(
        sampler: impl Samples<T> + 'static,
        learning_rate: impl Schedule + 'static,
        neighborhood: impl Neighborhood + 'static,
    ) -> Self {
        let defaults = TrainingConfig::default();
        Self {
            sampler: Box::new(sampler),
            learning_rate: Box::new(learning_rate),
            neighborhood: Box::new(neighborhood),
            initializer: None,
            epochs: defaults.epochs,
            log_every: defaults.log_every,
        }
    }

    /// Overwrites the map's weights with `initializer` before the first
    /// epoch.
    pub fn with_initializer(mut self, initializer: impl Initialize<T> + 'static) -> Self {
        self.initializer = Some(Box::new(initializer));
        self
    }

    /// Applies the epoch count and logging cadence from `config`.
    pub fn with_config(mut self, config: &TrainingConfig) -> Self {
        self.epochs = config.epochs;
        self.log_every = config.log_every.max(1);
        self
    }

    /// Epochs run by [`Trainer::run`].
    pub fn epochs(&self) -> usize {
        self.epochs
    }

    /// Trains `som` for the configured number of epochs.
    pub fn run(&mut self, som: &mut Som<T>, cancel: &CancelToken) -> Result<TrainingMetrics> {
        let epochs = self.epochs;
        self.train(som, epochs, cancel)
    }

    /// Trains `som` for `epochs` epochs, numbered from 1.
    ///
    /// An error yielded by the sample stream aborts training with that
    /// error. Cancellation is checked between epochs and during every BMU
    /// search and update; updates already applied are kept.
    pub fn train(
        &mut self,
        som: &mut Som<T>,
        epochs: usize,
        cancel: &CancelToken,
    ) -> Result<TrainingMetrics> {
        if !som.is_initialized() {
            return Err(NeuriteError::invalid("SOM is not initialized"));
        }
        if let Some(initializer) = self.initializer.as_mut() {
            initializer.initialize(som.weights_mut());
        }

        info!(
            "Starting SOM training: {} epochs, {} neurons, {} features",
            epochs,
            som.len(),
            som.features()
        );

        let mut metrics = TrainingMetrics::default();
        for epoch in 1..=epochs {
            cancel.check()?;
            let rate = self.learning_rate.at(epoch);
            let neighborhood = &*self.neighborhood;

            let mut count = 0usize;
            let mut total = 0.0f64;
            for sample in self.sampler.samples() {
                let sample = sample?;
                let bmu = som.find_bmu(&sample, cancel)?;
                let center = som.neurons()[bmu.index].point().clone();
                som.update(&sample, cancel, |point| {
                    rate * neighborhood.rate(&center, point, epoch)
                })?;
                count += 1;
                total += bmu.distance.as_f64();
            }

            let mean = if count > 0 { total / count as f64 } else { 0.0 };
            metrics.samples.push(count);
            metrics.mean_distances.push(mean);

            if epoch % self.log_every == 0 || epoch == epochs {
                info!(
                    "Epoch {}/{}: lr={:.4}, samples={}, mean distance={:.6}",
                    epoch, epochs, rate, count, mean
                );
            } else {
                debug!("Epoch {}/{} done", epoch, epochs);
            }
        }

        info!("SOM training completed");
        Ok(metrics)
    }
}
