// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;

/// Errors raised when building or addressing a [`crate::Matrix`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    /// The value buffer does not hold `rows * columns` cells.
    #[error("matrix of {rows}x{columns} needs {} values, got {found}", .rows * .columns)]
    Shape {
        /// Requested row count.
        rows: usize,
        /// Requested column count.
        columns: usize,
        /// Number of values supplied.
        found: usize,
    },
    /// A cell address lies outside the grid.
    #[error("cell ({row}, {column}) is outside a {rows}x{columns} matrix")]
    OutOfBounds {
        /// Requested row.
        row: usize,
        /// Requested column.
        column: usize,
        /// Row count of the matrix.
        rows: usize,
        /// Column count of the matrix.
        columns: usize,
    },
}

/// Errors raised while reading matrix text from a stream.
#[derive(Error, Debug)]
pub enum ReadError {
    /// The underlying reader failed.
    #[error("failed to read matrix input")]
    Io(#[from] std::io::Error),
}
