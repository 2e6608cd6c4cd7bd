// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::io::BufRead;

use log::warn;

use crate::{Matrix, ReadError};

/// Parses every matrix in `text`.
///
/// The format is whitespace separated numbers, one matrix row per line. A
/// lone `-` token negates the number that follows it on the same line. A line
/// without numbers ends the current matrix, so several matrices may share one
/// stream. The first row of each matrix fixes its width; shorter or longer
/// rows are logged and padded or truncated to that width.
#[must_use]
pub fn parse_matrices(text: &str) -> Vec<Matrix> {
    let mut reader = MatrixReader::default();
    for (index, line) in text.lines().enumerate() {
        reader.line(index + 1, line);
    }
    reader.finish()
}

/// Reads every matrix from a buffered reader.
///
/// See [`parse_matrices`] for the accepted format.
pub fn read_matrices<R: BufRead>(input: R) -> Result<Vec<Matrix>, ReadError> {
    let mut reader = MatrixReader::default();
    for (index, line) in input.lines().enumerate() {
        reader.line(index + 1, &line?);
    }
    Ok(reader.finish())
}

#[derive(Default)]
struct MatrixReader {
    done: Vec<Matrix>,
    current: Matrix,
    row: Vec<f64>,
}

impl MatrixReader {
    fn line(&mut self, line_number: usize, line: &str) {
        self.row.clear();
        let mut negate = false;
        for token in line.split_whitespace() {
            if token == "-" {
                negate = !negate;
                continue;
            }
            match token.parse::<f64>() {
                Ok(value) => {
                    self.row.push(if negate { -value } else { value });
                    negate = false;
                }
                Err(_) => warn!("skipping token {token:?} at line {line_number}"),
            }
        }

        if self.row.is_empty() {
            self.end_matrix();
            return;
        }

        let expected = self.current.columns();
        if !self.current.push_row(&self.row) {
            warn!(
                "column mismatch at line {line_number}: expected {expected}, found {}",
                self.row.len()
            );
        }
    }

    fn end_matrix(&mut self) {
        if self.current.rows() > 0 {
            self.done.push(core::mem::take(&mut self.current));
        }
    }

    fn finish(mut self) -> Vec<Matrix> {
        self.end_matrix();
        self.done
    }
}
