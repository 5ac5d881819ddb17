//! Two-dimensional real containers.

use super::num::Real;
use serde::{Deserialize, Serialize};

/// An in-place operation over a whole matrix.
pub type MatrixOp<'a, T> = &'a dyn Fn(&mut Matrix<T>);

/// A dense row-major matrix.
///
/// Rows live back to back in one flat buffer, so every row has the same
/// length by construction. Deserialization rejects data whose length is not
/// `rows * cols`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix<T>")]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

#[derive(Deserialize)]
struct RawMatrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T> TryFrom<RawMatrix<T>> for Matrix<T> {
    type Error = String;

    fn try_from(raw: RawMatrix<T>) -> Result<Self, Self::Error> {
        let expected = raw.rows.checked_mul(raw.cols);
        if expected != Some(raw.data.len()) {
            return Err(format!(
                "matrix of {}x{} needs {} values, got {}",
                raw.rows,
                raw.cols,
                raw.rows.saturating_mul(raw.cols),
                raw.data.len()
            ));
        }
        Ok(Self {
            rows: raw.rows,
            cols: raw.cols,
            data: raw.data,
        })
    }
}

impl<T: Real> Matrix<T> {
    /// Builds a matrix over `data` laid out row-major.
    ///
    /// # Panics
    /// When `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Self {
        assert_eq!(data.len(), rows * cols, "unmatched size of matrix data");
        Self { rows, cols, data }
    }

    /// Builds a matrix by copying `rows`.
    ///
    /// # Panics
    /// When the rows have different lengths.
    pub fn from_rows<R: AsRef<[T]>>(rows: &[R]) -> Self {
        let cols = rows.first().map_or(0, |row| row.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            let row = row.as_ref();
            assert_eq!(row.len(), cols, "unmatched size of matrix rows");
            data.extend_from_slice(row);
        }
        Self {
            rows: rows.len(),
            cols,
            data,
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// True when rows equal columns.
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Element at row `i`, column `j`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        self.data[i * self.cols + j]
    }

    /// Overwrites the element at row `i`, column `j`.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        self.data[i * self.cols + j] = value;
    }

    /// Row `i` as a slice.
    pub fn row(&self, i: usize) -> &[T] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Row `i` as a mutable slice.
    pub fn row_mut(&mut self, i: usize) -> &mut [T] {
        &mut self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Iterates over the rows.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        // chunks_exact(0) panics, and a matrix without columns has no data.
        self.data
            .chunks_exact(self.cols.max(1))
            .take(if self.cols == 0 { 0 } else { self.rows })
    }

    /// Copies column `j` into a new vector.
    pub fn column(&self, j: usize) -> Vec<T> {
        (0..self.rows).map(|i| self.get(i, j)).collect()
    }

    /// Copies the rows into nested vectors.
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.iter_rows().map(<[T]>::to_vec).collect()
    }

    /// The flat row-major data.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The flat row-major data, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Unwraps the flat backing buffer.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Swaps rows `i` and `j`.
    pub fn swap_rows(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        let (low, high) = (i.min(j), i.max(j));
        let cols = self.cols;
        let (head, tail) = self.data.split_at_mut(high * cols);
        head[low * cols..(low + 1) * cols].swap_with_slice(&mut tail[..cols]);
    }

    /// Swaps columns `i` and `j`.
    pub fn swap_columns(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        for row in self.data.chunks_exact_mut(self.cols.max(1)) {
            row.swap(i, j);
        }
    }

    /// Runs `ops` in order over the matrix.
    pub fn apply(&mut self, ops: &[MatrixOp<'_, T>]) -> &mut Self {
        for op in ops {
            op(self);
        }
        self
    }

    /// True when both matrices have the same shape and every pair of
    /// elements differs by less than `tolerance`.
    pub fn approx_eq(&self, other: &Self, tolerance: T) -> bool {
        self.shape() == other.shape()
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(&a, &b)| (a - b).abs() < tolerance)
    }
}

/// Reusable in-place matrix operations for [`Matrix::apply`].
pub mod ops {
    use super::*;

    /// Copies `values` over the target.
    pub fn set_values<T: Real>(values: &Matrix<T>) -> impl Fn(&mut Matrix<T>) + '_ {
        move |m| {
            assert_eq!(m.shape(), values.shape(), "unmatched size of matrices");
            m.data.copy_from_slice(&values.data);
        }
    }

    /// Swaps rows `i` and `j`.
    pub fn swap_rows<T: Real>(i: usize, j: usize) -> impl Fn(&mut Matrix<T>) {
        move |m| m.swap_rows(i, j)
    }

    /// Swaps columns `i` and `j`.
    pub fn swap_columns<T: Real>(i: usize, j: usize) -> impl Fn(&mut Matrix<T>) {
        move |m| m.swap_columns(i, j)
    }

    /// Replaces each element with `f(row, col, value)`.
    pub fn for_each<T: Real, F>(f: F) -> impl Fn(&mut Matrix<T>)
    where
        F: Fn(usize, usize, T) -> T,
    {
        move |m| {
            let cols = m.cols;
            for (k, x) in m.data.iter_mut().enumerate() {
                *x = f(k / cols, k % cols, *x);
            }
        }
    }
}
