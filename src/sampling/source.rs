//! Indexed sample sources.

use crate::error::{NeuriteError, Result};
use crate::metrics::Metric;
use std::sync::Arc;

/// Random access to a finite set of samples.
pub trait Source<E> {
    /// Number of samples.
    fn count(&self) -> usize;

    /// Sample at `index`, or `None` when out of range.
    fn select(&self, index: usize) -> Option<E>;
}

impl<E, S: Source<E> + ?Sized> Source<E> for Arc<S> {
    fn count(&self) -> usize {
        (**self).count()
    }

    fn select(&self, index: usize) -> Option<E> {
        (**self).select(index)
    }
}

impl<E, S: Source<E> + ?Sized> Source<E> for &S {
    fn count(&self) -> usize {
        (**self).count()
    }

    fn select(&self, index: usize) -> Option<E> {
        (**self).select(index)
    }
}

/// Samples held in memory.
#[derive(Debug, Clone, Default)]
pub struct SliceSource<E> {
    items: Vec<E>,
}

impl<E> SliceSource<E> {
    /// Wraps `items`.
    pub fn new(items: Vec<E>) -> Self {
        Self { items }
    }
}

impl<E> From<Vec<E>> for SliceSource<E> {
    fn from(items: Vec<E>) -> Self {
        Self::new(items)
    }
}

impl<E: Clone> Source<E> for SliceSource<E> {
    fn count(&self) -> usize {
        self.items.len()
    }

    fn select(&self, index: usize) -> Option<E> {
        self.items.get(index).cloned()
    }
}

/// The window `[from, to)` of another source.
#[derive(Debug, Clone)]
pub struct LimitedSource<S> {
    source: S,
    from: usize,
    to: usize,
}

impl<S> LimitedSource<S> {
    /// Restricts `source` to indices `from..to`.
    pub fn new(source: S, from: usize, to: usize) -> Result<Self> {
        if to < from {
            return Err(NeuriteError::invalid(format!(
                "limited source: to ({to}) is less than from ({from})"
            )));
        }
        Ok(Self { source, from, to })
    }

    /// The window bounds.
    pub fn bounds(&self) -> (usize, usize) {
        (self.from, self.to)
    }
}

impl<E, S: Source<E>> Source<E> for LimitedSource<S> {
    fn count(&self) -> usize {
        self.to - self.from
    }

    fn select(&self, index: usize) -> Option<E> {
        if index >= self.count() {
            return None;
        }
        self.source.select(self.from + index)
    }
}

fn normalize_ratios(ratios: &[f64]) -> Result<[f64; 3]> {
    let raw = match *ratios {
        [] => [0.7, 0.15, 0.15],
        [first] => [first, (1.0 - first) / 2.0, (1.0 - first) / 2.0],
        [first, second] => [first, second, 1.0 - first - second],
        [first, second, third, ..] => [first, second, third],
    };
    if raw.iter().any(|r| !r.is_finite() || *r < 0.0) {
        return Err(NeuriteError::invalid(format!("invalid split ratios: {raw:?}")));
    }
    let total = Metric::Manhattan.distance(&[0.0; 3], &raw);
    if total <= 0.0 {
        return Err(NeuriteError::invalid("split ratios sum to zero"));
    }
    Ok(raw.map(|r| r / total))
}

/// Splits `source` into three consecutive windows (e.g. training,
/// validation and test sets).
///
/// With no ratios the split is `0.7 / 0.15 / 0.15`. A single ratio sizes the
/// first window and divides the rest equally; two ratios leave the remainder
/// to the third. Ratios are normalized to sum to one, and the last window
/// absorbs rounding so the three cover the whole source.
pub fn split_set<E, S: Source<E>>(
    source: S,
    ratios: &[f64],
) -> Result<Vec<LimitedSource<Arc<S>>>> {
    let ratios = normalize_ratios(ratios)?;
    let count = source.count();
    let source = Arc::new(source);

    let mut windows = Vec::with_capacity(3);
    let mut start = 0;
    for (i, ratio) in ratios.iter().enumerate() {
        let end = if i == ratios.len() - 1 {
            count
        } else {
            (start + (count as f64 * ratio) as usize).min(count)
        };
        windows.push(LimitedSource::new(Arc::clone(&source), start, end)?);
        start = end;
    }
    Ok(windows)
}
