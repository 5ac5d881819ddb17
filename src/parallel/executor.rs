//! Bounded fan-out/fan-in over disjoint units of work.
//!
//! The calling thread is the single dispatcher: it feeds units into a
//! bounded channel and blocks when the channel is full. Scoped worker
//! threads pull units until the channel closes. Every unit owns a disjoint
//! destination (an element, a row, or an output slot), so results do not
//! depend on completion order or on the number of workers.

use super::cancel::CancelToken;
use crate::config::ExecutorConfig;
use crate::error::{NeuriteError, Result};
use log::trace;
use std::{panic, thread};

/// Runs per-unit closures across a bounded set of workers.
#[derive(Debug, Clone)]
pub struct Executor {
    parallelism: usize,
    queue_depth: usize,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(&ExecutorConfig::default())
    }
}

impl Executor {
    /// Creates an executor from configuration.
    pub fn new(config: &ExecutorConfig) -> Self {
        Self {
            parallelism: config.target_parallelism(),
            queue_depth: config.queue_depth,
        }
    }

    /// An executor with exactly `parallelism` workers at most.
    pub fn with_parallelism(parallelism: usize) -> Self {
        Self::new(&ExecutorConfig {
            parallelism: parallelism.max(1),
            queue_depth: 0,
        })
    }

    /// An executor that runs every unit on the calling thread.
    pub fn sequential() -> Self {
        Self::with_parallelism(1)
    }

    /// Target number of workers.
    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Workers used for `units` units: `min(parallelism, units)`, and at
    /// least one whenever there is work.
    pub fn workers_for(&self, units: usize) -> usize {
        if units == 0 {
            0
        } else {
            self.parallelism.min(units).max(1)
        }
    }

    /// Applies `work` to every unit, returning once all of them completed.
    pub fn run<I, F>(&self, units: I, work: F)
    where
        I: IntoIterator,
        I::IntoIter: ExactSizeIterator,
        I::Item: Send,
        F: Fn(I::Item) + Sync,
    {
        self.dispatch(units, None, work);
    }

    /// Like [`Executor::run`], stopping dispatch once `cancel` fires.
    ///
    /// Units already handed to a worker finish; the call then returns
    /// [`NeuriteError::Cancelled`].
    pub fn run_cancellable<I, F>(&self, units: I, cancel: &CancelToken, work: F) -> Result<()>
    where
        I: IntoIterator,
        I::IntoIter: ExactSizeIterator,
        I::Item: Send,
        F: Fn(I::Item) + Sync,
    {
        if self.dispatch(units, Some(cancel), work) {
            Ok(())
        } else {
            Err(NeuriteError::Cancelled)
        }
    }

    /// Applies `f(index, item)` to every element of `items`.
    pub fn for_each_mut<T, F>(&self, items: &mut [T], f: F)
    where
        T: Send,
        F: Fn(usize, &mut T) + Sync,
    {
        self.run(items.iter_mut().enumerate(), |(i, item)| f(i, item));
    }

    /// Cancellable [`Executor::for_each_mut`].
    pub fn for_each_mut_cancellable<T, F>(
        &self,
        items: &mut [T],
        cancel: &CancelToken,
        f: F,
    ) -> Result<()>
    where
        T: Send,
        F: Fn(usize, &mut T) + Sync,
    {
        self.run_cancellable(items.iter_mut().enumerate(), cancel, |(i, item)| f(i, item))
    }

    /// Applies `f(row_index, row)` to every `width`-long row of `data`.
    pub fn for_each_row_mut<T, F>(&self, data: &mut [T], width: usize, f: F)
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync,
    {
        if width == 0 {
            return;
        }
        self.run(data.chunks_mut(width).enumerate(), |(i, row)| f(i, row));
    }

    /// Computes `f(i)` for `i in 0..count` into an ordered vector.
    pub fn map<R, F>(&self, count: usize, f: F) -> Vec<R>
    where
        R: Send,
        F: Fn(usize) -> R + Sync,
    {
        let mut slots: Vec<Option<R>> = (0..count).map(|_| None).collect();
        self.for_each_mut(&mut slots, |i, slot| *slot = Some(f(i)));
        slots.into_iter().flatten().collect()
    }

    /// Cancellable [`Executor::map`].
    pub fn map_cancellable<R, F>(&self, count: usize, cancel: &CancelToken, f: F) -> Result<Vec<R>>
    where
        R: Send,
        F: Fn(usize) -> R + Sync,
    {
        let mut slots: Vec<Option<R>> = (0..count).map(|_| None).collect();
        self.for_each_mut_cancellable(&mut slots, cancel, |i, slot| *slot = Some(f(i)))?;
        Ok(slots.into_iter().flatten().collect())
    }

    /// Returns false when dispatch stopped because of cancellation.
    fn dispatch<I, F>(&self, units: I, cancel: Option<&CancelToken>, work: F) -> bool
    where
        I: IntoIterator,
        I::IntoIter: ExactSizeIterator,
        I::Item: Send,
        F: Fn(I::Item) + Sync,
    {
        let cancelled = || cancel.is_some_and(CancelToken::is_cancelled);
        let units = units.into_iter();
        let workers = self.workers_for(units.len());
        if workers == 0 {
            return !cancelled();
        }

        if workers == 1 {
            for unit in units {
                if cancelled() {
                    return false;
                }
                work(unit);
            }
            return true;
        }

        trace!("dispatching {} units to {} workers", units.len(), workers);
        let depth = if self.queue_depth > 0 {
            self.queue_depth
        } else {
            workers
        };
        let (sender, receiver) = flume::bounded(depth);
        let work = &work;

        thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    let receiver = receiver.clone();
                    scope.spawn(move || {
                        for unit in receiver.iter() {
                            work(unit);
                        }
                    })
                })
                .collect();
            drop(receiver);

            let mut completed = true;
            for unit in units {
                if cancelled() {
                    completed = false;
                    break;
                }
                // Fails only once every worker has panicked.
                if sender.send(unit).is_err() {
                    break;
                }
            }
            drop(sender);

            for handle in handles {
                if let Err(payload) = handle.join() {
                    panic::resume_unwind(payload);
                }
            }
            completed
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_workers_for() {
        let executor = Executor::with_parallelism(4);
        assert_eq!(executor.workers_for(0), 0);
        assert_eq!(executor.workers_for(1), 1);
        assert_eq!(executor.workers_for(3), 3);
        assert_eq!(executor.workers_for(100), 4);
        assert!(Executor::default().parallelism() >= 1);
    }

    #[test]
    fn test_for_each_mut_visits_every_element() {
        let executor = Executor::with_parallelism(4);
        let mut values = vec![0usize; 1000];
        executor.for_each_mut(&mut values, |i, x| *x = i * 2);
        assert!(values.iter().enumerate().all(|(i, &x)| x == i * 2));
    }

    #[test]
    fn test_rows() {
        let executor = Executor::with_parallelism(3);
        let mut data = vec![0.0f64; 12];
        executor.for_each_row_mut(&mut data, 4, |i, row| {
            row.iter_mut().enumerate().for_each(|(j, x)| *x = (i * 4 + j) as f64)
        });
        assert_eq!(data, (0..12).map(|x| x as f64).collect::<Vec<_>>());

        let mut untouched = vec![1.0f64; 3];
        executor.for_each_row_mut(&mut untouched, 0, |_, row| row.fill(0.0));
        assert_eq!(untouched, vec![1.0; 3]);
    }

    #[test]
    fn test_map_matches_sequential() {
        let f = |i: usize| ((i as f64) * 0.37).sin();
        let sequential = Executor::sequential().map(257, f);
        let parallel = Executor::with_parallelism(7).map(257, f);
        assert_eq!(sequential, parallel);
        assert!(Executor::default().map(0, f).is_empty());
    }

    #[test]
    fn test_cancelled_before_dispatch() {
        let token = CancelToken::new();
        token.cancel();
        let counter = AtomicUsize::new(0);
        let result = Executor::with_parallelism(4).run_cancellable(0..100, &token, |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(result.unwrap_err().is_cancelled());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_cancel_mid_flight() {
        let token = CancelToken::new();
        let counter = AtomicUsize::new(0);
        let result = Executor::with_parallelism(2).run_cancellable(0..10_000, &token, |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 10 {
                token.cancel();
            }
        });
        assert!(result.unwrap_err().is_cancelled());
        assert!(counter.load(Ordering::SeqCst) < 10_000);
    }

    #[test]
    fn test_cancel_sequential() {
        let token = CancelToken::new();
        let result = Executor::sequential().map_cancellable(5, &token, |i| {
            if i == 2 {
                token.cancel();
            }
            i
        });
        assert!(result.unwrap_err().is_cancelled());
    }

    #[test]
    #[should_panic(expected = "unit failed")]
    fn test_panic_propagates() {
        Executor::with_parallelism(2).run(0..8, |i| {
            if i == 5 {
                panic!("unit failed");
            }
        });
    }
}
