//! Epoch-wise sample streams consumed by training.

use super::source::Source;
use super::strategy::{Random, Shuffled, Strategy, Systematic};
use crate::error::Result;
use crate::initializers::seeded_rng;
use rand::Rng;

/// Something that yields one epoch of training samples per call.
pub trait Samples<T> {
    /// The samples of the next epoch. An `Err` item aborts training.
    fn samples(&mut self) -> Box<dyn Iterator<Item = Result<Vec<T>>> + '_>;
}

/// Creates the strategy for a new epoch.
pub type StrategyFactory<E> = Box<dyn FnMut() -> Box<dyn Strategy<E>>>;

/// Pulls samples from a [`Source`] through a fresh [`Strategy`] each epoch.
pub struct Sampler<E, S> {
    source: S,
    factory: StrategyFactory<E>,
}

impl<E: 'static, S: Source<E>> Sampler<E, S> {
    /// Pairs `source` with a strategy factory.
    pub fn new<F>(source: S, factory: F) -> Self
    where
        F: FnMut() -> Box<dyn Strategy<E>> + 'static,
    {
        Self {
            source,
            factory: Box::new(factory),
        }
    }

    /// Visits every sample in order, every epoch.
    pub fn systematic(source: S) -> Self {
        Self::new(source, || Box::new(Systematic::new()) as Box<dyn Strategy<E>>)
    }

    /// Draws one random sample per epoch.
    pub fn random(source: S, seed: Option<u64>) -> Self {
        let mut seeds = seeded_rng(seed);
        Self::new(source, move || {
            Box::new(Random::new(Some(seeds.gen()))) as Box<dyn Strategy<E>>
        })
    }

    /// Visits every sample in a different random order each epoch.
    pub fn shuffled(source: S, seed: Option<u64>) -> Self {
        let mut seeds = seeded_rng(seed);
        Self::new(source, move || {
            Box::new(Shuffled::new(Some(seeds.gen()))) as Box<dyn Strategy<E>>
        })
    }

    /// The underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Iterates over one epoch.
    pub fn epoch(&mut self) -> impl Iterator<Item = E> + '_ {
        let mut strategy = (self.factory)();
        let source = &self.source;
        std::iter::from_fn(move || strategy.next(source))
    }
}

impl<T: 'static, S: Source<Vec<T>>> Samples<T> for Sampler<Vec<T>, S> {
    fn samples(&mut self) -> Box<dyn Iterator<Item = Result<Vec<T>>> + '_> {
        Box::new(self.epoch().map(Ok))
    }
}

/// Pushes samples produced by a closure, one iterator per epoch.
///
/// Items are `Result`s so a producer can abort training by yielding an
/// error, typically [`NeuriteError::Sampling`](crate::NeuriteError::Sampling).
pub struct StreamSampler<F> {
    factory: F,
}

impl<F> StreamSampler<F> {
    /// Wraps a per-epoch producer.
    pub fn new(factory: F) -> Self {
        Self { factory }
    }
}

impl<T, F, I> Samples<T> for StreamSampler<F>
where
    F: FnMut() -> I,
    I: Iterator<Item = Result<Vec<T>>> + 'static,
{
    fn samples(&mut self) -> Box<dyn Iterator<Item = Result<Vec<T>>> + '_> {
        Box::new((self.factory)())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NeuriteError;
    use crate::sampling::SliceSource;

    fn rows() -> SliceSource<Vec<f64>> {
        SliceSource::new(vec![vec![1.0], vec![2.0], vec![3.0]])
    }

    #[test]
    fn test_systematic_epochs_restart() {
        let mut sampler = Sampler::systematic(rows());
        let first: Vec<_> = sampler.samples().map(|s| s.unwrap()).collect();
        let second: Vec<_> = sampler.samples().map(|s| s.unwrap()).collect();
        assert_eq!(first, vec![vec![1.0], vec![2.0], vec![3.0]]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_random_sampler() {
        let mut sampler = Sampler::random(rows(), Some(3));
        for _ in 0..5 {
            assert_eq!(sampler.epoch().count(), 1);
        }
    }

    #[test]
    fn test_shuffled_sampler_reproducible() {
        let source: SliceSource<usize> = SliceSource::new((0..20).collect());
        let mut a = Sampler::shuffled(source.clone(), Some(11));
        let mut b = Sampler::shuffled(source, Some(11));
        let a1: Vec<_> = a.epoch().collect();
        let a2: Vec<_> = a.epoch().collect();
        assert_eq!(a1, b.epoch().collect::<Vec<_>>());
        assert_eq!(a2, b.epoch().collect::<Vec<_>>());
        assert_ne!(a1, a2);
    }

    #[test]
    fn test_stream_sampler() {
        let mut stream = StreamSampler::new(|| {
            vec![
                Ok(vec![1.0f32]),
                Err(NeuriteError::Sampling("broken".into())),
            ]
            .into_iter()
        });
        let items: Vec<_> = stream.samples().collect();
        assert_eq!(items.len(), 2);
        assert!(matches!(items[1], Err(NeuriteError::Sampling(_))));
    }
}
