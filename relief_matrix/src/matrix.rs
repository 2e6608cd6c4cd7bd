// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::iter;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::MatrixError;

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

/// Dense, row‑major grid of `f64` values.
///
/// Once both dimensions are set, all `rows * columns` cells are addressable.
/// Every mutation assigns a fresh, process‑unique [`Matrix::revision`], which
/// derived artifacts (meshes, exports) use to detect stale caches. Clones share
/// the revision of their source until one of them is mutated.
#[derive(Clone, Debug)]
pub struct Matrix {
    rows: usize,
    columns: usize,
    values: Vec<f64>,
    revision: u64,
}

/// A single cell yielded by [`Matrix::iter`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    /// Row index, counted from the top.
    pub row: usize,
    /// Column index, counted from the left.
    pub column: usize,
    /// Cell value.
    pub value: f64,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows && self.columns == other.columns && self.values == other.values
    }
}

impl Matrix {
    /// Creates an empty `0x0` matrix.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: 0,
            columns: 0,
            values: Vec::new(),
            revision: next_revision(),
        }
    }

    /// Creates a matrix from row‑major values.
    pub fn from_vec(rows: usize, columns: usize, values: Vec<f64>) -> Result<Self, MatrixError> {
        if values.len() != rows * columns {
            return Err(MatrixError::Shape {
                rows,
                columns,
                found: values.len(),
            });
        }
        Ok(Self {
            rows,
            columns,
            values,
            revision: next_revision(),
        })
    }

    /// Creates a matrix by evaluating `f(row, column)` for every cell.
    #[must_use]
    pub fn from_fn(rows: usize, columns: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut values = Vec::with_capacity(rows * columns);
        for row in 0..rows {
            for column in 0..columns {
                values.push(f(row, column));
            }
        }
        Self {
            rows,
            columns,
            values,
            revision: next_revision(),
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Returns `true` when the matrix has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Current revision stamp.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns the value at `(row, column)`, if it exists.
    #[must_use]
    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        if row >= self.rows || column >= self.columns {
            return None;
        }
        self.values.get(row * self.columns + column).copied()
    }

    /// Overwrites the value at `(row, column)`.
    pub fn set(&mut self, row: usize, column: usize, value: f64) -> Result<(), MatrixError> {
        if row >= self.rows || column >= self.columns {
            return Err(MatrixError::OutOfBounds {
                row,
                column,
                rows: self.rows,
                columns: self.columns,
            });
        }
        self.values[row * self.columns + column] = value;
        self.touch();
        Ok(())
    }

    /// Returns the values of one row.
    #[must_use]
    pub fn row(&self, row: usize) -> Option<&[f64]> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.columns;
        self.values.get(start..start + self.columns)
    }

    /// All values in row‑major order.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterates over all cells in row‑major order.
    pub fn iter(&self) -> impl Iterator<Item = Cell> + '_ {
        let columns = self.columns.max(1);
        self.values.iter().enumerate().map(move |(i, &value)| Cell {
            row: i / columns,
            column: i % columns,
            value,
        })
    }

    /// Smallest and largest value, or `None` for an empty matrix.
    #[must_use]
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut it = self.values.iter().copied();
        let first = it.next()?;
        Some(it.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }

    /// Appends a row.
    ///
    /// The first row fixes the column count. Later rows are padded with
    /// zeros or truncated to that width; the return value reports whether the
    /// row had to be adjusted.
    pub fn push_row(&mut self, row: &[f64]) -> bool {
        if self.rows == 0 && self.columns == 0 {
            self.columns = row.len();
        }
        let fits = row.len() == self.columns;
        let take = row.len().min(self.columns);
        self.values.extend_from_slice(&row[..take]);
        self.values.extend(iter::repeat_n(0.0, self.columns - take));
        self.rows += 1;
        self.touch();
        fits
    }

    pub(crate) fn update_values(&mut self, f: impl FnOnce(usize, usize, &mut [f64])) {
        f(self.rows, self.columns, &mut self.values);
        self.touch();
    }

    fn touch(&mut self) {
        self.revision = next_revision();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_vec_checks_shape() {
        assert!(Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).is_ok());
        let err = Matrix::from_vec(2, 3, vec![1.0]).unwrap_err();
        assert_eq!(
            err,
            MatrixError::Shape {
                rows: 2,
                columns: 3,
                found: 1
            }
        );
    }

    #[test]
    fn get_set_and_bounds() {
        let mut m = Matrix::from_fn(2, 3, |r, c| (r * 10 + c) as f64);
        assert_eq!(m.get(1, 2), Some(12.0));
        assert_eq!(m.get(2, 0), None);
        assert_eq!(m.get(0, 3), None);

        let before = m.revision();
        m.set(0, 1, -7.5).unwrap();
        assert_eq!(m.get(0, 1), Some(-7.5));
        assert_ne!(m.revision(), before);

        assert!(matches!(
            m.set(5, 0, 1.0),
            Err(MatrixError::OutOfBounds { row: 5, .. })
        ));
    }

    #[test]
    fn push_row_pads_and_truncates_to_first_width() {
        let mut m = Matrix::new();
        assert!(m.push_row(&[1.0, 2.0, 3.0]));
        assert!(!m.push_row(&[4.0]));
        assert!(!m.push_row(&[5.0, 6.0, 7.0, 8.0]));
        assert_eq!(m.rows(), 3);
        assert_eq!(m.columns(), 3);
        assert_eq!(m.row(1), Some(&[4.0, 0.0, 0.0][..]));
        assert_eq!(m.row(2), Some(&[5.0, 6.0, 7.0][..]));
    }

    #[test]
    fn iter_visits_cells_in_row_major_order() {
        let m = Matrix::from_fn(2, 2, |r, c| (r * 2 + c) as f64);
        let cells: Vec<_> = m.iter().map(|c| (c.row, c.column, c.value)).collect();
        assert_eq!(
            cells,
            vec![(0, 0, 0.0), (0, 1, 1.0), (1, 0, 2.0), (1, 1, 3.0)]
        );
    }

    #[test]
    fn value_range_and_clone_equality() {
        let m = Matrix::from_vec(1, 3, vec![3.0, -1.0, 2.0]).unwrap();
        assert_eq!(m.value_range(), Some((-1.0, 3.0)));
        assert_eq!(Matrix::new().value_range(), None);

        let dup = m.clone();
        assert_eq!(dup, m);
        assert_eq!(dup.revision(), m.revision());
    }
}
