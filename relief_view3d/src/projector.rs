// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Point, Size};

use crate::{Mat4, Vec3};

/// A projected point: pixel position plus depth.
///
/// Depth is the clip‑space z; larger values are nearer the viewer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenPoint {
    /// Position in pixels, y growing downward.
    pub point: Point,
    /// Clip‑space depth.
    pub depth: f64,
}

/// Maps between world space and a pixel viewport.
///
/// The projection takes world points into clip space, where the viewport spans
/// `[-1, 1]` on both axes with y up. `inverse` must be the exact inverse of
/// `projection`; [`crate::Camera`] assembles it from the inverses of its
/// scale, rotation and translation parts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenProjector {
    projection: Mat4,
    inverse: Mat4,
    size: Size,
}

impl ScreenProjector {
    /// Creates a projector from a projection, its inverse and the viewport size.
    #[must_use]
    pub fn new(projection: Mat4, inverse: Mat4, size: Size) -> Self {
        Self {
            projection,
            inverse,
            size,
        }
    }

    /// The world → clip projection.
    #[must_use]
    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// Viewport size in pixels.
    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Projects a world point into pixel space.
    #[must_use]
    pub fn world_to_screen(&self, world: Vec3) -> ScreenPoint {
        let clip = self.projection.transform_point(world);
        ScreenPoint {
            point: Point::new(
                (clip.x + 1.0) * 0.5 * self.size.width,
                (1.0 - clip.y) * 0.5 * self.size.height,
            ),
            depth: clip.z,
        }
    }

    /// Unprojects a pixel position at the given depth back into world space.
    #[must_use]
    pub fn screen_to_world(&self, screen: ScreenPoint) -> Vec3 {
        let clip = Vec3::new(
            2.0 * screen.point.x / self.size.width - 1.0,
            1.0 - 2.0 * screen.point.y / self.size.height,
            screen.depth,
        );
        self.inverse.transform_point(clip)
    }

    /// World‑space displacements produced by moving one pixel right and one
    /// pixel up on screen.
    #[must_use]
    pub fn screen_axes(&self) -> (Vec3, Vec3) {
        let x = self
            .inverse
            .transform_direction(Vec3::new(2.0 / self.size.width, 0.0, 0.0));
        let y = self
            .inverse
            .transform_direction(Vec3::new(0.0, 2.0 / self.size.height, 0.0));
        (x, y)
    }
}
