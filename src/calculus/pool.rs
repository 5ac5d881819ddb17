//! Type-sharded pool of reusable backing buffers.
//!
//! Every buffer handed out by [`BufferPool::acquire`] has exactly the
//! requested length and holds only zeros, whatever it was used for before:
//! released buffers are cleared over their whole length before they are
//! cached, and `acquire` refills the requested length with zeros. Spare
//! capacity beyond the length is never observable through safe code.

use super::num::Real;
use crate::config::PoolConfig;
use log::debug;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Idle buffers of one element type.
#[derive(Debug, Default)]
pub struct Shard<T> {
    free: Mutex<Vec<Vec<T>>>,
    /// Last requested length, used as the capacity of fresh allocations.
    hint: AtomicUsize,
}

impl<T> Shard<T> {
    fn take(&self) -> Option<Vec<T>> {
        self.free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
    }

    /// Number of idle buffers currently cached.
    pub fn idle(&self) -> usize {
        self.free.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// The last requested length.
    pub fn size_hint(&self) -> usize {
        self.hint.load(Ordering::Relaxed)
    }
}

/// Counters describing pool churn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Calls to `acquire`.
    pub acquired: u64,
    /// Acquires served from a cached buffer.
    pub reused: u64,
    /// Buffers accepted back by `release`.
    pub released: u64,
}

/// A cache of zero-cleared buffers, one shard per element type.
///
/// Shards are internally synchronized, so workers may acquire and release
/// concurrently through a shared reference.
#[derive(Debug)]
pub struct BufferPool {
    pub(crate) f32: Shard<f32>,
    pub(crate) f64: Shard<f64>,
    max_cached: usize,
    acquired: AtomicU64,
    reused: AtomicU64,
    released: AtomicU64,
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(&PoolConfig::default())
    }
}

impl BufferPool {
    /// Creates an empty pool.
    pub fn new(config: &PoolConfig) -> Self {
        Self {
            f32: Shard::default(),
            f64: Shard::default(),
            max_cached: config.max_cached,
            acquired: AtomicU64::new(0),
            reused: AtomicU64::new(0),
            released: AtomicU64::new(0),
        }
    }

    /// Returns a buffer of exactly `size` zeros.
    pub fn acquire<T: Real>(&self, size: usize) -> Vec<T> {
        let shard = T::shard(self);
        let hint = shard.hint.swap(size, Ordering::Relaxed);
        self.acquired.fetch_add(1, Ordering::Relaxed);

        let mut buffer = match shard.take() {
            Some(buffer) => {
                self.reused.fetch_add(1, Ordering::Relaxed);
                buffer
            }
            None => Vec::with_capacity(size.max(hint)),
        };
        buffer.clear();
        buffer.resize(size, T::zero());
        buffer
    }

    /// Returns a copy of `values` backed by a pooled buffer.
    pub fn copy_of<T: Real>(&self, values: &[T]) -> Vec<T> {
        let mut buffer = self.acquire(values.len());
        buffer.copy_from_slice(values);
        buffer
    }

    /// Clears `buffer` and caches it for reuse.
    ///
    /// Buffers without capacity are ignored.
    pub fn release<T: Real>(&self, mut buffer: Vec<T>) {
        if buffer.capacity() == 0 {
            return;
        }
        buffer.fill(T::zero());
        buffer.clear();

        let mut free = T::shard(self)
            .free
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if free.len() >= self.max_cached {
            debug!("buffer pool shard full ({} idle), dropping buffer", free.len());
            return;
        }
        free.push(buffer);
        self.released.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of idle buffers cached for element type `T`.
    pub fn idle<T: Real>(&self) -> usize {
        T::shard(self).idle()
    }

    /// Last requested length for element type `T`.
    pub fn size_hint<T: Real>(&self) -> usize {
        T::shard(self).size_hint()
    }

    /// Snapshot of the pool counters.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            acquired: self.acquired.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_acquire_exact_size_zeroed() {
        let pool = BufferPool::default();
        let buffer: Vec<f64> = pool.acquire(5);
        assert_eq!(buffer.len(), 5);
        assert!(buffer.iter().all(|&x| x == 0.0));

        let empty: Vec<f32> = pool.acquire(0);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_reused_buffer_is_cleared() {
        let pool = BufferPool::default();
        let mut buffer: Vec<f64> = pool.acquire(8);
        buffer.iter_mut().enumerate().for_each(|(i, x)| *x = i as f64 + 1.0);
        pool.release(buffer);
        assert_eq!(pool.idle::<f64>(), 1);

        // Smaller request over a dirty, larger buffer.
        let small: Vec<f64> = pool.acquire(3);
        assert_eq!(small.len(), 3);
        assert!(small.iter().all(|&x| x == 0.0));
        assert!(small.capacity() >= 8);

        // Growing the same buffer must not resurrect old values.
        let mut small = small;
        small.resize(8, 0.0);
        assert!(small.iter().all(|&x| x == 0.0));
        assert_eq!(pool.stats().reused, 1);
    }

    #[test]
    fn test_release_empty_is_noop() {
        let pool = BufferPool::default();
        pool.release(Vec::<f32>::new());
        assert_eq!(pool.idle::<f32>(), 0);
        assert_eq!(pool.stats().released, 0);
    }

    #[test]
    fn test_shards_are_separate() {
        let pool = BufferPool::default();
        pool.release(vec![1.0f32; 4]);
        assert_eq!(pool.idle::<f32>(), 1);
        assert_eq!(pool.idle::<f64>(), 0);

        let buffer: Vec<f64> = pool.acquire(4);
        assert_eq!(buffer, vec![0.0; 4]);
        assert_eq!(pool.idle::<f32>(), 1);
    }

    #[test]
    fn test_size_hint_tracks_last_request() {
        let pool = BufferPool::default();
        let _: Vec<f32> = pool.acquire(17);
        assert_eq!(pool.size_hint::<f32>(), 17);
        assert_eq!(pool.size_hint::<f64>(), 0);
    }

    #[test]
    fn test_max_cached() {
        let pool = BufferPool::new(&PoolConfig { max_cached: 2 });
        for _ in 0..4 {
            pool.release(vec![1.0f64; 2]);
        }
        assert_eq!(pool.idle::<f64>(), 2);
        assert_eq!(pool.stats().released, 2);
    }

    #[test]
    fn test_concurrent_acquire_release() {
        let pool = Arc::new(BufferPool::default());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let pool = Arc::clone(&pool);
                std::thread::spawn(move || {
                    for i in 0..200 {
                        let size = (t * 7 + i) % 13;
                        let mut buffer: Vec<f64> = pool.acquire(size);
                        assert_eq!(buffer.len(), size);
                        assert!(buffer.iter().all(|&x| x == 0.0));
                        buffer.iter_mut().for_each(|x| *x = t as f64 + 1.0);
                        pool.release(buffer);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(pool.stats().acquired, 1600);
    }
}
