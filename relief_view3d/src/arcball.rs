// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Point, Size};

use crate::{ArcballRestriction, Axis, Mat4, Vec3};

/// Drags shorter than this on the unit sphere produce no rotation.
const ARC_EPSILON: f64 = 1e-9;

/// Maps a screen point onto the unit arcball hemisphere.
///
/// The viewport centre maps to `(0, 0, 1)` and the inscribed circle of the
/// viewport to the equator; x grows to the right, y upward and z toward the
/// viewer. Points outside the circle are pulled onto the equator.
#[must_use]
pub fn arcball_point(point: Point, view_size: Size, restriction: ArcballRestriction) -> Vec3 {
    let radius = (0.5 * view_size.width.min(view_size.height)).max(f64::MIN_POSITIVE);
    let mut x = (point.x - 0.5 * view_size.width) / radius;
    let mut y = (0.5 * view_size.height - point.y) / radius;
    match restriction {
        ArcballRestriction::None => {}
        ArcballRestriction::Horizontal => y = 0.0,
        ArcballRestriction::Vertical => x = 0.0,
    }
    let d2 = x * x + y * y;
    if d2 <= 1.0 {
        Vec3::new(x, y, (1.0 - d2).sqrt())
    } else {
        let len = d2.sqrt();
        Vec3::new(x / len, y / len, 0.0)
    }
}

/// Rotation that carries unit vector `from` onto unit vector `to`.
///
/// In row‑vector convention `from * R == to`. Coincident vectors give the
/// identity; opposite vectors give a half turn about a perpendicular axis.
#[must_use]
pub fn rotation_between(from: Vec3, to: Vec3) -> Mat4 {
    if (to - from).length() < ARC_EPSILON {
        return Mat4::IDENTITY;
    }
    let dot = from.dot(to).clamp(-1.0, 1.0);
    let angle = dot.acos().to_degrees();
    let axis = from.cross(to);
    if axis.length() > ARC_EPSILON {
        return Mat4::rotation(angle, Axis::Custom(axis));
    }
    let helper = if from.x.abs() < 0.9 {
        Vec3::new(1.0, 0.0, 0.0)
    } else {
        Vec3::new(0.0, 1.0, 0.0)
    };
    Mat4::rotation(angle, Axis::Custom(from.cross(helper)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: Size = Size::new(400.0, 200.0);

    fn assert_close(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-9, "{a:?} != {b:?}");
    }

    #[test]
    fn centre_maps_to_pole_and_edges_to_equator() {
        let centre = arcball_point(Point::new(200.0, 100.0), VIEW, ArcballRestriction::None);
        assert_close(centre, Vec3::new(0.0, 0.0, 1.0));

        // Radius is half the smaller side (100px); the top edge is on the equator.
        let top = arcball_point(Point::new(200.0, 0.0), VIEW, ArcballRestriction::None);
        assert_close(top, Vec3::new(0.0, 1.0, 0.0));

        let far_right = arcball_point(Point::new(400.0, 100.0), VIEW, ArcballRestriction::None);
        assert_close(far_right, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn restrictions_zero_one_axis() {
        let p = Point::new(250.0, 50.0);
        let h = arcball_point(p, VIEW, ArcballRestriction::Horizontal);
        assert_eq!(h.y, 0.0);
        assert!((h.x - 0.5).abs() < 1e-12);
        let v = arcball_point(p, VIEW, ArcballRestriction::Vertical);
        assert_eq!(v.x, 0.0);
        assert!((v.y - 0.5).abs() < 1e-12);
        assert!((v.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rotation_between_carries_start_onto_end() {
        let from = arcball_point(Point::new(180.0, 90.0), VIEW, ArcballRestriction::None);
        let to = arcball_point(Point::new(260.0, 140.0), VIEW, ArcballRestriction::None);
        let r = rotation_between(from, to);
        assert_close(r.transform_direction(from), to);
    }

    #[test]
    fn rotation_between_degenerate_cases() {
        let v = Vec3::new(0.0, 0.6, 0.8);
        assert_eq!(rotation_between(v, v), Mat4::IDENTITY);

        let x = Vec3::new(1.0, 0.0, 0.0);
        let r = rotation_between(x, -x);
        assert_close(r.transform_direction(x), -x);
    }
}
