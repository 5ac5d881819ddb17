//! Self-Organizing Map (SOM) implementation.

use super::neuron::{pull_towards, Neuron};
use super::topology::{Point, Topology};
use crate::calculus::Real;
use crate::engine::Engine;
use crate::error::{NeuriteError, Result};
use crate::initializers::{Initialize, Initializer};
use crate::metrics::Metric;
use crate::parallel::CancelToken;
use log::info;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::fmt;

/// Lifecycle of a [`Som`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Options accepted, neurons not built yet.
    Configured,
    /// Neurons built; queries and training are allowed.
    Initialized,
}

/// A neuron matched against an input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match<T> {
    /// Neuron index in topology order.
    pub index: usize,
    /// Distance between the neuron's weights and the input.
    pub distance: T,
}

/// A Self-Organizing Map.
///
/// Neurons are laid out by a [`Topology`] and hold views into one flat
/// weight vector of `neurons * features` values. Distances between weights
/// and inputs use the configured [`Metric`].
pub struct Som<T: Real> {
    features: usize,
    shape: Vec<usize>,
    topology: Topology,
    metric: Metric,
    weights: Vec<T>,
    neurons: Vec<Neuron>,
    initializer: Box<dyn Initialize<T> + Send + Sync>,
    engine: Engine,
    state: State,
}

impl<T: Real> fmt::Debug for Som<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Som")
            .field("features", &self.features)
            .field("shape", &self.shape)
            .field("topology", &self.topology)
            .field("metric", &self.metric)
            .field("neurons", &self.neurons.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<T: Real> Som<T> {
    /// Creates a linear, Euclidean map of `shape` neurons with `features`
    /// weights each.
    pub fn new(features: usize, shape: Vec<usize>, engine: Engine) -> Result<Self> {
        if features == 0 {
            return Err(NeuriteError::invalid("features must be positive"));
        }
        if shape.is_empty() || shape.contains(&0) {
            return Err(NeuriteError::invalid(format!(
                "shape must be non-empty and positive: {shape:?}"
            )));
        }
        Ok(Self {
            features,
            shape,
            topology: Topology::default(),
            metric: Metric::default(),
            weights: Vec::new(),
            neurons: Vec::new(),
            initializer: Box::new(Initializer::unit(None)),
            engine,
            state: State::Configured,
        })
    }

    /// Lays neurons out with `topology`.
    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    /// Measures weight distances with `metric`.
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Measures weight distances with the metric registered as `name`.
    pub fn with_metric_name(self, name: &str) -> Result<Self> {
        let metric = Metric::get(name)
            .ok_or_else(|| NeuriteError::invalid(format!("unknown metric: {name}")))?;
        Ok(self.with_metric(metric))
    }

    /// Starts from `weights` instead of a random fill.
    ///
    /// The length is checked against the shape at [`Som::init`].
    pub fn with_weights(mut self, weights: Vec<T>) -> Result<Self> {
        if weights.is_empty() {
            return Err(NeuriteError::invalid("weights are empty"));
        }
        self.weights = weights;
        Ok(self)
    }

    /// Fills missing weights with `initializer` at [`Som::init`].
    ///
    /// Default: uniform `[0, 1)`.
    pub fn with_initializer(
        mut self,
        initializer: impl Initialize<T> + Send + Sync + 'static,
    ) -> Self {
        self.initializer = Box::new(initializer);
        self
    }

    /// Validates the configuration and builds the neurons.
    ///
    /// Supplied weights must match `neurons * features` exactly; without
    /// weights the initializer fills a fresh vector. Calling `init` again
    /// re-validates and rebuilds the neurons over the current weights. On
    /// error the map is left unchanged.
    pub fn init(&mut self) -> Result<()> {
        let shape = self.topology.normalize_shape(&self.shape)?;
        let count: usize = shape.iter().product();
        let required = count * self.features;
        if !self.weights.is_empty() && self.weights.len() != required {
            return Err(NeuriteError::invalid(format!(
                "expected {} weights for {} neurons of {} features, got {}",
                required,
                count,
                self.features,
                self.weights.len()
            )));
        }

        if self.weights.is_empty() {
            let mut weights = vec![T::zero(); required];
            self.initializer.initialize(&mut weights);
            self.weights = weights;
        }

        let features = self.features;
        self.neurons = self
            .topology
            .points(&shape)
            .into_iter()
            .enumerate()
            .map(|(i, point)| Neuron::new(point, i * features..(i + 1) * features))
            .collect();
        self.shape = shape;
        self.state = State::Initialized;

        info!(
            "Initialized SOM: {} neurons ({} {:?}), {} features, {} metric",
            count, self.topology, self.shape, self.features, self.metric
        );
        Ok(())
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.state
    }

    /// True after a successful [`Som::init`].
    pub fn is_initialized(&self) -> bool {
        self.state == State::Initialized
    }

    /// Weights per neuron.
    pub fn features(&self) -> usize {
        self.features
    }

    /// Shape, normalized for the topology once initialized.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Neuron layout.
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Distance metric.
    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// The engine used for fan-out and scratch buffers.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The flat weight vector, neuron after neuron.
    pub fn weights(&self) -> &[T] {
        &self.weights
    }

    /// The flat weight vector, mutably.
    pub fn weights_mut(&mut self) -> &mut [T] {
        &mut self.weights
    }

    /// Neurons in topology order.
    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    /// Neuron at `index`.
    pub fn neuron(&self, index: usize) -> Option<&Neuron> {
        self.neurons.get(index)
    }

    /// Coordinates of every neuron, in topology order.
    pub fn points(&self) -> impl Iterator<Item = &Point> + '_ {
        self.neurons.iter().map(Neuron::point)
    }

    /// Total number of neurons.
    pub fn len(&self) -> usize {
        self.neurons.len()
    }

    /// True before initialization.
    pub fn is_empty(&self) -> bool {
        self.neurons.is_empty()
    }

    fn check_input(&self, input: &[T]) -> Result<()> {
        if !self.is_initialized() {
            return Err(NeuriteError::invalid("SOM is not initialized"));
        }
        if input.len() != self.features {
            return Err(NeuriteError::invalid(format!(
                "input dimension {} does not match {} features",
                input.len(),
                self.features
            )));
        }
        Ok(())
    }

    /// Finds the Best Matching Unit (BMU) for an input vector.
    ///
    /// Distances are computed in parallel, one neuron per unit, and folded
    /// in topology order; on ties the lowest index wins.
    pub fn find_bmu(&self, input: &[T], cancel: &CancelToken) -> Result<Match<T>> {
        self.check_input(input)?;
        let (neurons, weights, metric) = (&self.neurons, &self.weights, self.metric);
        let distances = self.engine.executor().map_cancellable(neurons.len(), cancel, |i| {
            neurons[i].distance(metric, weights, input)
        })?;

        let mut best = Match {
            index: 0,
            distance: distances[0],
        };
        for (index, &distance) in distances.iter().enumerate().skip(1) {
            if distance < best.distance {
                best = Match { index, distance };
            }
        }
        Ok(best)
    }

    /// Coordinate of the BMU for `input`.
    pub fn best_matching_unit(&self, input: &[T], cancel: &CancelToken) -> Result<&Point> {
        let bmu = self.find_bmu(input, cancel)?;
        Ok(self.neurons[bmu.index].point())
    }

    /// Sequential BMU search for batch callers that already run in parallel.
    fn nearest(&self, input: &[T]) -> Match<T> {
        let mut best = Match {
            index: 0,
            distance: T::infinity(),
        };
        for (index, neuron) in self.neurons.iter().enumerate() {
            let distance = neuron.distance(self.metric, &self.weights, input);
            if index == 0 || distance < best.distance {
                best = Match { index, distance };
            }
        }
        best
    }

    /// The `k` neurons closest to `input`, nearest first.
    pub fn find_k_nearest(&self, input: &[T], k: usize) -> Result<Vec<Match<T>>> {
        self.check_input(input)?;
        let (neurons, weights, metric) = (&self.neurons, &self.weights, self.metric);
        let mut matches = self.engine.executor().map(neurons.len(), |index| Match {
            index,
            distance: neurons[index].distance(metric, weights, input),
        });
        matches.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
        });
        matches.truncate(k);
        Ok(matches)
    }

    /// BMU index for every sample, computed in parallel across samples.
    pub fn map_samples(&self, samples: &[Vec<T>]) -> Result<Vec<usize>> {
        for sample in samples {
            self.check_input(sample)?;
        }
        Ok(samples
            .par_iter()
            .map(|sample| self.nearest(sample).index)
            .collect())
    }

    /// Mean distance between each sample and its BMU.
    pub fn quantization_error(&self, samples: &[Vec<T>]) -> Result<T> {
        if samples.is_empty() {
            return Err(NeuriteError::invalid("no samples"));
        }
        for sample in samples {
            self.check_input(sample)?;
        }
        let total: T = samples
            .par_iter()
            .map(|sample| self.nearest(sample).distance)
            .reduce(T::zero, |a, b| a + b);
        Ok(total / T::of(samples.len() as f64))
    }

    /// Pulls every neuron toward `input` by `factor(point)`, in parallel.
    ///
    /// Neurons whose factor is not a positive, finite number are left
    /// untouched.
    pub fn update<F>(&mut self, input: &[T], cancel: &CancelToken, factor: F) -> Result<()>
    where
        F: Fn(&Point) -> f64 + Sync,
    {
        self.check_input(input)?;
        let pool = self.engine.pool();
        let units = self
            .weights
            .chunks_mut(self.features)
            .zip(self.neurons.iter());
        self.engine
            .executor()
            .run_cancellable(units, cancel, |(weights, neuron)| {
                let influence = factor(neuron.point());
                if !influence.is_finite() || influence <= 0.0 {
                    return;
                }
                let mut delta = pool.acquire::<T>(weights.len());
                pull_towards(weights, input, T::of(influence), &mut delta);
                pool.release(delta);
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::Executor;

    fn engine() -> Engine {
        Engine::default().with_executor(Executor::with_parallelism(3))
    }

    fn line(weights: Vec<f64>) -> Som<f64> {
        let n = weights.len();
        let mut som = Som::new(1, vec![n], engine())
            .unwrap()
            .with_weights(weights)
            .unwrap();
        som.init().unwrap();
        som
    }

    #[test]
    fn test_som_creation() {
        let mut som: Som<f64> = Som::new(10, vec![8], engine())
            .unwrap()
            .with_topology(Topology::Rectangular)
            .with_initializer(Initializer::unit(Some(42)));
        assert_eq!(som.state(), State::Configured);
        som.init().unwrap();

        assert_eq!(som.shape(), &[8, 8]);
        assert_eq!(som.len(), 64);
        assert_eq!(som.features(), 10);
        assert_eq!(som.weights().len(), 640);
        assert!(som.weights().iter().all(|&w| (0.0..1.0).contains(&w)));
        assert_eq!(som.neuron(10).unwrap().point().coords(), &[2.0, 1.0]);
    }

    #[test]
    fn test_invalid_options() {
        assert!(Som::<f64>::new(0, vec![2], engine()).is_err());
        assert!(Som::<f64>::new(2, vec![], engine()).is_err());
        assert!(Som::<f64>::new(2, vec![2, 0], engine()).is_err());
        assert!(Som::<f64>::new(2, vec![2], engine())
            .unwrap()
            .with_metric_name("cosine")
            .is_err());
        assert!(Som::<f64>::new(2, vec![2], engine())
            .unwrap()
            .with_weights(Vec::new())
            .is_err());
    }

    #[test]
    fn test_weights_length_mismatch_leaves_state() {
        let mut som = Som::new(2, vec![3], engine())
            .unwrap()
            .with_weights(vec![0.0; 5])
            .unwrap();
        assert!(som.init().is_err());
        assert_eq!(som.state(), State::Configured);
        assert_eq!(som.weights().len(), 5);
    }

    #[test]
    fn test_not_initialized() {
        let som: Som<f64> = Som::new(1, vec![2], engine()).unwrap();
        let err = som.best_matching_unit(&[0.0], &CancelToken::new()).unwrap_err();
        assert!(matches!(err, NeuriteError::InvalidParameter(_)));
    }

    #[test]
    fn test_find_bmu() {
        let som = line(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let cancel = CancelToken::new();
        assert_eq!(som.best_matching_unit(&[0.0], &cancel).unwrap().coords(), &[0.0]);
        assert_eq!(som.best_matching_unit(&[2.0], &cancel).unwrap().coords(), &[1.0]);
        assert_eq!(som.best_matching_unit(&[9.0], &cancel).unwrap().coords(), &[5.0]);
        assert!(som.find_bmu(&[1.0, 2.0], &cancel).is_err());
    }

    #[test]
    fn test_bmu_tie_picks_lowest_index() {
        let som = line(vec![3.0, 1.0, 5.0, 1.0]);
        let bmu = som.find_bmu(&[1.0], &CancelToken::new()).unwrap();
        assert_eq!(bmu.index, 1);
        assert_eq!(bmu.distance, 0.0);
    }

    #[test]
    fn test_find_bmu_cancelled() {
        let som = line(vec![1.0, 2.0]);
        let cancel = CancelToken::new();
        cancel.cancel();
        assert!(som.find_bmu(&[1.0], &cancel).unwrap_err().is_cancelled());
    }

    #[test]
    fn test_find_k_nearest() {
        let som = line(vec![0.0, 0.9, 0.2, 5.0]);
        let nearest = som.find_k_nearest(&[1.0], 3).unwrap();
        let indices: Vec<_> = nearest.iter().map(|m| m.index).collect();
        assert_eq!(indices, vec![1, 2, 0]);
    }

    #[test]
    fn test_map_samples_and_quantization_error() {
        let som = line(vec![0.0, 10.0]);
        let samples = vec![vec![1.0], vec![9.0], vec![4.0]];
        assert_eq!(som.map_samples(&samples).unwrap(), vec![0, 1, 0]);
        let error = som.quantization_error(&samples).unwrap();
        assert!((error - 2.0).abs() < 1e-12);
        assert!(som.quantization_error(&[]).is_err());
    }

    #[test]
    fn test_update() {
        let mut som = line(vec![0.0, 0.0, 0.0]);
        som.update(&[1.0], &CancelToken::new(), |point| {
            if point[0] == 0.0 {
                0.5
            } else if point[0] == 1.0 {
                -1.0
            } else {
                f64::NAN
            }
        })
        .unwrap();
        assert_eq!(som.weights(), &[0.5, 0.0, 0.0]);
    }

    #[test]
    fn test_shared_across_threads() {
        fn assert_send_sync<S: Send + Sync>(_: &S) {}

        let som: Som<f64> = Som::new(1, vec![4], engine())
            .unwrap()
            .with_initializer(|weights: &mut [f64]| weights.fill(0.5));
        assert_send_sync(&som);

        let som = line(vec![0.0, 1.0, 2.0, 3.0]);
        let samples: Vec<Vec<f64>> = (0..64).map(|i| vec![(i % 4) as f64]).collect();
        let expected: Vec<usize> = (0..64).map(|i| i % 4).collect();
        std::thread::scope(|scope| {
            let a = scope.spawn(|| som.map_samples(&samples).unwrap());
            let b = scope.spawn(|| som.map_samples(&samples).unwrap());
            assert_eq!(a.join().unwrap(), expected);
            assert_eq!(b.join().unwrap(), expected);
        });
    }

    #[test]
    fn test_reinit_keeps_weights() {
        let mut som = line(vec![1.0, 2.0]);
        som.init().unwrap();
        assert_eq!(som.weights(), &[1.0, 2.0]);
        assert_eq!(som.len(), 2);
    }
}
