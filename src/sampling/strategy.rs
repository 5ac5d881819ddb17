//! Strategies deciding which samples an epoch visits, and in what order.

use super::source::Source;
use crate::initializers::seeded_rng;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Picks the next sample of an epoch.
///
/// A strategy instance covers one epoch; a fresh one is created per epoch.
pub trait Strategy<E> {
    /// The next sample, or `None` once the epoch is exhausted.
    fn next(&mut self, source: &dyn Source<E>) -> Option<E>;
}

/// Visits indices `0..limit` in order. Without an explicit limit the whole
/// source is visited.
#[derive(Debug, Clone, Default)]
pub struct Systematic {
    limit: Option<usize>,
    current: usize,
}

impl Systematic {
    /// Visits the whole source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Visits at most `limit` samples.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            current: 0,
        }
    }
}

impl<E> Strategy<E> for Systematic {
    fn next(&mut self, source: &dyn Source<E>) -> Option<E> {
        let limit = self.limit.unwrap_or_else(|| source.count()).min(source.count());
        if self.current >= limit {
            return None;
        }
        let sample = source.select(self.current);
        self.current += 1;
        sample
    }
}

/// Draws a single random sample per epoch.
#[derive(Debug, Clone)]
pub struct Random {
    rng: ChaCha8Rng,
    done: bool,
}

impl Random {
    /// A random draw from a seeded (or entropy-seeded) generator.
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: seeded_rng(seed),
            done: false,
        }
    }
}

impl<E> Strategy<E> for Random {
    fn next(&mut self, source: &dyn Source<E>) -> Option<E> {
        let count = source.count();
        if self.done || count == 0 {
            return None;
        }
        self.done = true;
        source.select(self.rng.gen_range(0..count))
    }
}

/// Visits every sample once in a random permutation.
#[derive(Debug, Clone)]
pub struct Shuffled {
    rng: ChaCha8Rng,
    order: Option<Vec<usize>>,
    position: usize,
}

impl Shuffled {
    /// A permutation drawn from a seeded (or entropy-seeded) generator.
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: seeded_rng(seed),
            order: None,
            position: 0,
        }
    }
}

impl<E> Strategy<E> for Shuffled {
    fn next(&mut self, source: &dyn Source<E>) -> Option<E> {
        let rng = &mut self.rng;
        let order = self.order.get_or_insert_with(|| {
            let mut order: Vec<usize> = (0..source.count()).collect();
            order.shuffle(rng);
            order
        });
        let index = *order.get(self.position)?;
        self.position += 1;
        source.select(index)
    }
}
