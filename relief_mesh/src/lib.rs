// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Relief Mesh: turns a [`relief_matrix::Matrix`] into coloured quads.
//!
//! Each cell becomes a horizontal top face at its scaled height. Walls are
//! emitted only where the outline of the bar chart needs them: at the start
//! and end of every row and column, where neighbouring cells change sign
//! (split at `z = 0`), and between same‑signed neighbours of different height.
//!
//! - [`Mesh::generate`] builds a mesh from a matrix and [`MeshParams`].
//! - [`MeshCache`] keeps the last mesh and rebuilds it only when the matrix
//!   revision or the parameters change.
//! - [`ColorPalette`] maps face hues to colours.
//!
//! ## Example
//!
//! ```rust
//! use relief_matrix::Matrix;
//! use relief_mesh::{Mesh, MeshParams};
//!
//! let m = Matrix::from_vec(1, 1, vec![5.0]).unwrap();
//! let mesh = Mesh::generate(&m, &MeshParams::default());
//! assert_eq!(mesh.top_faces().len(), 1);
//! assert_eq!(mesh.side_faces().len(), 4);
//! ```

mod cache;
mod face;
mod mesh;
mod palette;

pub use cache::MeshCache;
pub use face::{Face, FacePlane};
pub use mesh::{Mesh, MeshParams};
pub use palette::ColorPalette;
