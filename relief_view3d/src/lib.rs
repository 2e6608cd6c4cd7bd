// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Relief View 3D: an orbit camera for looking at a unit‑cube model.
//!
//! This crate is headless. It provides:
//! - [`Mat4`] / [`Vec3`]: homogeneous 4x4 math in row‑vector convention,
//!   with axis rotations and orbit angle conversion ([`EulerAngles`]).
//! - [`Camera`]: committed rotation, translation and zoom plus at most one
//!   in‑progress pan or arcball gesture.
//! - [`ScreenProjector`]: world ↔ pixel mapping for a given projection.
//! - [`arcball_point`] / [`rotation_between`]: the arcball building blocks.
//!
//! Wiring pointer events to gestures and drawing the projected geometry is
//! left to callers.
//!
//! ## Example
//!
//! ```rust
//! use kurbo::{Point, Size};
//! use relief_view3d::{ArcballRestriction, Camera, Vec3};
//!
//! let mut camera = Camera::new(Size::new(800.0, 600.0));
//!
//! // The model origin starts at the centre of the viewport.
//! let centre = camera.world_to_screen(Vec3::ZERO).point;
//! assert!((centre - Point::new(400.0, 300.0)).hypot() < 1e-9);
//!
//! // Drag to rotate; nothing is committed until the gesture finishes.
//! camera.arcball_rotate_start(Point::new(400.0, 300.0));
//! camera.arcball_rotate_update(Point::new(450.0, 300.0), ArcballRestriction::None);
//! camera.arcball_rotate_finish(Point::new(450.0, 300.0), ArcballRestriction::None);
//!
//! camera.zoom(2);
//! assert_eq!(camera.zoom_factor(), 1024.0);
//! ```

mod arcball;
mod camera;
mod modes;
mod projection;
mod projector;

pub use arcball::{arcball_point, rotation_between};
pub use camera::{Camera, CameraDebugInfo, CommittedCamera, GestureDelta};
pub use modes::{ArcballRestriction, CameraMode};
pub use projection::{
    Axis, EulerAngles, Mat4, Vec3, matrix_vector_multiply, vector_matrix_multiply,
};
pub use projector::{ScreenPoint, ScreenProjector};
