// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::Color;
use relief_view3d::Vec3;

/// Plane a face lies in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FacePlane {
    /// Horizontal top face of a bar.
    XY,
    /// Wall facing along y, produced by the column scan.
    XZ,
    /// Wall facing along x, produced by the row scan.
    YZ,
}

/// A coloured quadrilateral in model space.
///
/// Model space is the unit cube: x and y span `[-0.5, 0.5]`, z is the cell
/// value scaled by the mesh's z‑scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Face {
    /// Corners in drawing order.
    pub vertices: [Vec3; 4],
    /// Fill colour, including the mesh alpha.
    pub color: Color,
    /// Palette position the colour was taken from.
    pub hue: f64,
    /// Plane tag.
    pub plane: FacePlane,
    /// `(row, column)` of the cell for top faces, `None` for walls.
    pub cell: Option<(usize, usize)>,
}

impl Face {
    /// Builds an axis‑aligned quad anchored at `origin`.
    ///
    /// `d1` is the extent along the plane's first axis (x for `XY`/`XZ`, y for
    /// `YZ`) and `d2` along the second (y for `XY`, z otherwise).
    #[must_use]
    pub fn axis_aligned(plane: FacePlane, origin: Vec3, d1: f64, d2: f64) -> [Vec3; 4] {
        let Vec3 { x, y, z } = origin;
        match plane {
            FacePlane::XY => [
                Vec3::new(x, y, z),
                Vec3::new(x + d1, y, z),
                Vec3::new(x + d1, y + d2, z),
                Vec3::new(x, y + d2, z),
            ],
            FacePlane::XZ => [
                Vec3::new(x, y, z),
                Vec3::new(x + d1, y, z),
                Vec3::new(x + d1, y, z + d2),
                Vec3::new(x, y, z + d2),
            ],
            FacePlane::YZ => [
                Vec3::new(x, y + d1, z),
                Vec3::new(x, y, z),
                Vec3::new(x, y, z + d2),
                Vec3::new(x, y + d1, z + d2),
            ],
        }
    }

    /// Mean of the four corners.
    #[must_use]
    pub fn centroid(&self) -> Vec3 {
        let sum = self.vertices[0] + self.vertices[1] + self.vertices[2] + self.vertices[3];
        sum * 0.25
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_vertices_stay_in_their_plane() {
        let o = Vec3::new(0.25, -0.5, 0.0);
        for v in Face::axis_aligned(FacePlane::XZ, o, 0.5, 0.3) {
            assert_eq!(v.y, -0.5);
        }
        for v in Face::axis_aligned(FacePlane::YZ, o, 0.5, 0.3) {
            assert_eq!(v.x, 0.25);
        }
        for v in Face::axis_aligned(FacePlane::XY, o, 0.5, 0.3) {
            assert_eq!(v.z, 0.0);
        }
    }

    #[test]
    fn yz_wall_spans_y_to_y_plus_d1() {
        let q = Face::axis_aligned(FacePlane::YZ, Vec3::new(0.0, 0.1, 0.0), 0.2, -0.4);
        assert_eq!(q[0], Vec3::new(0.0, 0.1 + 0.2, 0.0));
        assert_eq!(q[1], Vec3::new(0.0, 0.1, 0.0));
        assert_eq!(q[2], Vec3::new(0.0, 0.1, -0.4));
        assert_eq!(q[3], Vec3::new(0.0, 0.1 + 0.2, -0.4));
    }
}
