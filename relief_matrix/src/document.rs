// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::io::BufRead;

use crate::{Matrix, ReadError, read_matrices};

/// The matrices read from one input stream, viewed one at a time.
#[derive(Clone, Debug, Default)]
pub struct Document {
    matrices: Vec<Matrix>,
    current: usize,
}

impl Document {
    /// Creates a document whose current matrix is the first one.
    #[must_use]
    pub fn new(matrices: Vec<Matrix>) -> Self {
        Self {
            matrices,
            current: 0,
        }
    }

    /// Reads all matrices from `input`.
    pub fn from_reader<R: BufRead>(input: R) -> Result<Self, ReadError> {
        Ok(Self::new(read_matrices(input)?))
    }

    /// Number of matrices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    /// Returns `true` when the document holds no matrix.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    /// Index of the current matrix.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The current matrix.
    #[must_use]
    pub fn current(&self) -> Option<&Matrix> {
        self.matrices.get(self.current)
    }

    /// Mutable access to the current matrix.
    pub fn current_mut(&mut self) -> Option<&mut Matrix> {
        self.matrices.get_mut(self.current)
    }

    /// Makes matrix `index` current. Returns `false` if it does not exist.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.matrices.len() {
            self.current = index;
            true
        } else {
            false
        }
    }

    /// Moves to the next matrix, staying put on the last one.
    pub fn select_next(&mut self) -> bool {
        self.select(self.current + 1)
    }

    /// Moves to the previous matrix, staying put on the first one.
    pub fn select_previous(&mut self) -> bool {
        self.current
            .checked_sub(1)
            .is_some_and(|index| self.select(index))
    }

    /// All matrices in input order.
    #[must_use]
    pub fn matrices(&self) -> &[Matrix] {
        &self.matrices
    }

    /// Consumes the document, returning its matrices.
    #[must_use]
    pub fn into_matrices(self) -> Vec<Matrix> {
        self.matrices
    }
}
