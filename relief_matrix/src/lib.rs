// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Relief Matrix: the numeric grid behind a Relief histogram.
//!
//! This crate owns the data side of the pipeline:
//! - [`Matrix`]: a dense, row‑major grid of `f64` cells with a revision stamp
//!   that changes whenever the contents change.
//! - [`parse_matrices`] / [`read_matrices`]: the whitespace separated text
//!   format, one row per line, several matrices per stream.
//! - [`MatrixTransforms`]: display transforms (permutation, sign alternation,
//!   absolute value, signum, log scale) applied in a fixed order.
//! - [`Document`]: the list of matrices read from one stream with a
//!   "current" cursor.
//!
//! Mesh generation and rendering live in other `relief_*` crates; they only
//! read from a [`Matrix`] and key their caches on [`Matrix::revision`].
//!
//! ## Example
//!
//! ```rust
//! use relief_matrix::{MatrixTransforms, parse_matrices};
//!
//! let mut matrices = parse_matrices("1 2\n3 4\n");
//! let m = &mut matrices[0];
//! assert_eq!((m.rows(), m.columns()), (2, 2));
//! assert_eq!(m.get(1, 1), Some(4.0));
//!
//! m.apply_transforms(MatrixTransforms::LOG_SCALE);
//! assert!((m.get(0, 0).unwrap() - 2.0_f64.ln()).abs() < 1e-12);
//! ```

mod document;
mod error;
mod matrix;
mod read;
mod transform;

pub use document::Document;
pub use error::{MatrixError, ReadError};
pub use matrix::{Cell, Matrix};
pub use read::{parse_matrices, read_matrices};
pub use transform::MatrixTransforms;
