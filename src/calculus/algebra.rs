//! Matrix algebra on top of the engine's pool and executor.
//!
//! Results are allocated from the pool; hand them back with
//! [`Engine::recycle`] once they are no longer needed. Operand shape
//! mismatches are programming errors and panic.

use super::matrix::Matrix;
use super::num::Real;
use super::vector::{dot_product, Vector};
use crate::engine::Engine;

fn check_same_shape<T: Real>(a: &Matrix<T>, b: &Matrix<T>) {
    assert_eq!(a.shape(), b.shape(), "unmatched size of matrices");
}

fn check_square<T: Real>(m: &Matrix<T>) {
    assert!(m.is_square(), "matrix is not square: {:?}", m.shape());
}

/// Partial-pivot elimination in place. `on_swap` sees every row swap.
fn eliminate<T: Real>(m: &mut Matrix<T>, mut on_swap: impl FnMut(usize, usize)) {
    let (rows, cols) = m.shape();
    for row in 0..rows.min(cols) {
        let mut max_el = m.get(row, row);
        let mut max_row = row;
        for k in row + 1..rows {
            if m.get(k, row).abs() > max_el.abs() {
                max_el = m.get(k, row);
                max_row = k;
            }
        }

        if max_row != row {
            m.swap_rows(max_row, row);
            on_swap(max_row, row);
        }

        let pivot = m.get(row, row);
        if pivot == T::zero() {
            continue;
        }
        for k in row + 1..rows {
            let c = -m.get(k, row) / pivot;
            m.set(k, row, T::zero());
            for i in row + 1..cols {
                let value = m.get(k, i) + c * m.get(row, i);
                m.set(k, i, value);
            }
        }
    }
}

impl Engine {
    /// A `rows x cols` matrix of zeros.
    pub fn zeros<T: Real>(&self, rows: usize, cols: usize) -> Matrix<T> {
        Matrix::from_vec(rows, cols, self.pool().acquire(rows * cols))
    }

    /// The `size x size` identity matrix.
    pub fn identity<T: Real>(&self, size: usize) -> Matrix<T> {
        let mut m = self.zeros(size, size);
        for i in 0..size {
            m.set(i, i, T::one());
        }
        m
    }

    /// A pooled copy of `m`.
    pub fn copy_of<T: Real>(&self, m: &Matrix<T>) -> Matrix<T> {
        Matrix::from_vec(m.rows(), m.cols(), self.pool().copy_of(m.as_slice()))
    }

    /// Returns the storage of `m` to the pool.
    pub fn recycle<T: Real>(&self, m: Matrix<T>) {
        self.pool().release(m.into_vec());
    }

    /// Column `j` of `m` in a pooled vector.
    pub fn column<T: Real>(&self, m: &Matrix<T>, j: usize) -> Vector<T> {
        let mut column = Vector::zeros(self.pool(), m.rows());
        column
            .iter_mut()
            .enumerate()
            .for_each(|(i, x)| *x = m.get(i, j));
        column
    }

    /// Replaces every element with `f(row, col, value)`, in parallel.
    pub fn for_each<T, F>(&self, m: &mut Matrix<T>, f: F)
    where
        T: Real,
        F: Fn(usize, usize, T) -> T + Sync,
    {
        let cols = m.cols();
        self.executor()
            .for_each_row_mut(m.as_mut_slice(), cols, |i, row| {
                for (j, x) in row.iter_mut().enumerate() {
                    *x = f(i, j, *x);
                }
            });
    }

    /// Runs `f(col, column)` over a copy of every column, in parallel, and
    /// writes the columns back.
    pub fn for_each_column<T, F>(&self, m: &mut Matrix<T>, f: F)
    where
        T: Real,
        F: Fn(usize, &mut [T]) + Sync,
    {
        let columns = {
            let view: &Matrix<T> = m;
            self.executor().map(view.cols(), |j| {
                let mut column = self.column(view, j);
                f(j, &mut column);
                column
            })
        };
        for (j, column) in columns.into_iter().enumerate() {
            for (i, &x) in column.iter().enumerate() {
                m.set(i, j, x);
            }
            column.recycle(self.pool());
        }
    }

    /// Elementwise `a + b`.
    ///
    /// # Panics
    /// When the shapes differ.
    pub fn add<T: Real>(&self, a: &Matrix<T>, b: &Matrix<T>) -> Matrix<T> {
        check_same_shape(a, b);
        let mut result = self.zeros(a.rows(), a.cols());
        self.executor()
            .for_each_row_mut(result.as_mut_slice(), a.cols(), |i, row| {
                for ((x, &p), &q) in row.iter_mut().zip(a.row(i)).zip(b.row(i)) {
                    *x = p + q;
                }
            });
        result
    }

    /// Elementwise `a - b`.
    ///
    /// # Panics
    /// When the shapes differ.
    pub fn subtract<T: Real>(&self, a: &Matrix<T>, b: &Matrix<T>) -> Matrix<T> {
        check_same_shape(a, b);
        let mut result = self.zeros(a.rows(), a.cols());
        self.executor()
            .for_each_row_mut(result.as_mut_slice(), a.cols(), |i, row| {
                for ((x, &p), &q) in row.iter_mut().zip(a.row(i)).zip(b.row(i)) {
                    *x = p - q;
                }
            });
        result
    }

    /// `m * c`.
    pub fn multiply<T: Real>(&self, m: &Matrix<T>, c: T) -> Matrix<T> {
        let mut result = self.copy_of(m);
        let cols = m.cols();
        self.executor()
            .for_each_row_mut(result.as_mut_slice(), cols, |_, row| {
                row.iter_mut().for_each(|x| *x = *x * c)
            });
        result
    }

    /// The transpose of `m`.
    pub fn transpose<T: Real>(&self, m: &Matrix<T>) -> Matrix<T> {
        let (rows, cols) = m.shape();
        let mut result = self.zeros(cols, rows);
        self.executor()
            .for_each_row_mut(result.as_mut_slice(), rows, |j, row| {
                for (i, x) in row.iter_mut().enumerate() {
                    *x = m.get(i, j);
                }
            });
        result
    }

    /// The matrix product `a * b`.
    ///
    /// # Panics
    /// When `a.cols() != b.rows()`.
    pub fn product<T: Real>(&self, a: &Matrix<T>, b: &Matrix<T>) -> Matrix<T> {
        assert_eq!(a.cols(), b.rows(), "unmatched size of matrices");
        let columns = self.transpose(b);
        let mut result = self.zeros(a.rows(), b.cols());
        self.executor()
            .for_each_row_mut(result.as_mut_slice(), b.cols(), |i, row| {
                let left = a.row(i);
                for (j, x) in row.iter_mut().enumerate() {
                    *x = dot_product(left, columns.row(j));
                }
            });
        self.recycle(columns);
        result
    }

    /// The matrix-vector product `m * v`.
    ///
    /// # Panics
    /// When `m.cols() != v.len()`.
    pub fn product_vector<T: Real>(&self, m: &Matrix<T>, v: &[T]) -> Vector<T> {
        assert_eq!(m.cols(), v.len(), "unmatched size of matrix and vector");
        let mut result = Vector::zeros(self.pool(), m.rows());
        self.executor()
            .for_each_mut(&mut result, |i, x| *x = dot_product(m.row(i), v));
        result
    }

    /// The determinant of a square matrix.
    ///
    /// Sizes up to 3 use closed forms; larger matrices go through
    /// [`Engine::upper_triangular`]. The empty matrix has determinant 1.
    ///
    /// # Panics
    /// When `m` is not square.
    pub fn determinant<T: Real>(&self, m: &Matrix<T>) -> T {
        check_square(m);
        let e = |i, j| m.get(i, j);
        match m.rows() {
            0 => T::one(),
            1 => e(0, 0),
            2 => e(0, 0) * e(1, 1) - e(0, 1) * e(1, 0),
            3 => {
                e(0, 0) * (e(1, 1) * e(2, 2) - e(1, 2) * e(2, 1))
                    - e(0, 1) * (e(1, 0) * e(2, 2) - e(1, 2) * e(2, 0))
                    + e(0, 2) * (e(1, 0) * e(2, 1) - e(1, 1) * e(2, 0))
            }
            n => {
                let (triangular, odd) = self.upper_triangular(m);
                let diagonal = (0..n).fold(T::one(), |acc, i| acc * triangular.get(i, i));
                self.recycle(triangular);
                if odd {
                    -diagonal
                } else {
                    diagonal
                }
            }
        }
    }

    /// `m` without row `i` and column `j`.
    pub fn minor<T: Real>(&self, m: &Matrix<T>, i: usize, j: usize) -> Matrix<T> {
        let (rows, cols) = m.shape();
        assert!(i < rows && j < cols, "minor ({i}, {j}) out of bounds for {rows}x{cols}");
        let mut result = self.zeros(rows - 1, cols - 1);
        let mut k = 0;
        for r in (0..rows).filter(|&r| r != i) {
            for c in (0..cols).filter(|&c| c != j) {
                result.as_mut_slice()[k] = m.get(r, c);
                k += 1;
            }
        }
        result
    }

    /// The cofactor matrix, one row per worker unit.
    ///
    /// # Panics
    /// When `m` is not square.
    pub fn cofactor<T: Real>(&self, m: &Matrix<T>) -> Matrix<T> {
        check_square(m);
        let n = m.rows();
        let mut result = self.zeros(n, n);
        self.executor()
            .for_each_row_mut(result.as_mut_slice(), n, |i, row| {
                for (j, x) in row.iter_mut().enumerate() {
                    let minor = self.minor(m, i, j);
                    let det = self.determinant(&minor);
                    self.recycle(minor);
                    *x = if (i + j) % 2 == 0 { det } else { -det };
                }
            });
        result
    }

    /// The adjugate: transpose of the cofactor matrix.
    pub fn adjugate<T: Real>(&self, m: &Matrix<T>) -> Matrix<T> {
        let cofactor = self.cofactor(m);
        let result = self.transpose(&cofactor);
        self.recycle(cofactor);
        result
    }

    /// The inverse of `m`, or `None` when `|det(m)| < T::ZERO_TOLERANCE`.
    ///
    /// # Panics
    /// When `m` is not square.
    pub fn inverse<T: Real>(&self, m: &Matrix<T>) -> Option<Matrix<T>> {
        check_square(m);
        let det = self.determinant(m);
        if det.is_near_zero() {
            return None;
        }
        let adjugate = self.adjugate(m);
        let result = self.multiply(&adjugate, T::one() / det);
        self.recycle(adjugate);
        Some(result)
    }

    /// Upper-triangular form of `m` and whether an odd number of row swaps
    /// was needed to reach it.
    pub fn upper_triangular<T: Real>(&self, m: &Matrix<T>) -> (Matrix<T>, bool) {
        let mut result = self.copy_of(m);
        let mut odd = false;
        eliminate(&mut result, |_, _| odd = !odd);
        (result, odd)
    }

    /// Gaussian elimination with partial pivoting.
    ///
    /// Returns the eliminated matrix and the permutation matrix recording
    /// the row swaps.
    pub fn gauss_elimination<T: Real>(&self, m: &Matrix<T>) -> (Matrix<T>, Matrix<T>) {
        let mut result = self.copy_of(m);
        let mut permutation = self.identity(m.rows());
        eliminate(&mut result, |a, b| permutation.swap_rows(a, b));
        (result, permutation)
    }
}
