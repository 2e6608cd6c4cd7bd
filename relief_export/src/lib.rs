// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Relief Export: draws histogram meshes with the painter's algorithm.
//!
//! Faces are projected into device space ([`DeviceFace`]), sorted farthest
//! first and optionally thinned by hidden face removal. A [`Scene`] adds a
//! colour legend ([`Colorbar`]) and can be drawn into any
//! [`relief_imaging::ImagingBackend`].
//!
//! - [`render_view`] draws into a viewport for on-screen display.
//! - [`export_to_file`] writes PNG, SVG, PDF or TikZ, picked by extension.
//! - [`export_series`] writes one numbered file per matrix, all sharing one
//!   frame.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use kurbo::Size;
//! use relief_export::{ExportOptions, export_to_file};
//! use relief_matrix::Matrix;
//! use relief_view3d::Camera;
//!
//! let m = Matrix::from_fn(4, 4, |r, c| (r * c) as f64 - 3.0);
//! let camera = Camera::new(Size::new(600.0, 600.0));
//! export_to_file(Path::new("histogram.svg"), &m, &camera, &ExportOptions::default())?;
//! # Ok::<(), relief_export::ExportError>(())
//! ```

pub mod bounds;
mod colorbar;
mod device;
mod error;
mod export;
mod options;
mod render;

pub use colorbar::{Colorbar, ColorbarOptions, Label, gradient_strip};
pub use device::{DeviceFace, project_faces, remove_hidden_faces, sort_by_depth};
pub use error::ExportError;
pub use export::{export_series, export_to_file, numbered_path};
pub use options::{ExportFormat, ExportOptions};
pub use render::{Scene, fit_to_width, render_view, visible_bounds};
