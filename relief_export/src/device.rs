// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Point, Rect, Vec2};
use peniko::Color;
use relief_mesh::Face;
use relief_view3d::ScreenProjector;

/// A mesh face projected into device space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeviceFace {
    /// Projected corners, in mesh vertex order.
    pub points: [Point; 4],
    /// Average projected depth of the corners; larger is nearer.
    pub depth: f64,
    /// Fill colour.
    pub color: Color,
    /// Device-space bounding box of `points`.
    pub bounds: Rect,
}

impl DeviceFace {
    /// Projects `face` through `projector`.
    #[must_use]
    pub fn project(face: &Face, projector: &ScreenProjector) -> Self {
        let projected = face.vertices.map(|v| projector.world_to_screen(v));
        let points = projected.map(|p| p.point);
        let depth = 0.25 * projected.iter().map(|p| p.depth).sum::<f64>();
        Self {
            points,
            depth,
            color: face.color,
            bounds: quad_bounds(&points),
        }
    }

    /// Returns `true` if `point` lies strictly inside this face's quad.
    ///
    /// The quad is assumed convex; either winding is accepted. Points on an
    /// edge or a corner are outside, and degenerate quads contain nothing.
    #[must_use]
    pub fn contains_strictly(&self, point: Point) -> bool {
        if !(self.bounds.x0 < point.x
            && point.x < self.bounds.x1
            && self.bounds.y0 < point.y
            && point.y < self.bounds.y1)
        {
            return false;
        }
        let mut positive = 0;
        let mut negative = 0;
        for i in 0..4 {
            let a = self.points[i];
            let b = self.points[(i + 1) % 4];
            let cross = Vec2::cross(b - a, point - a);
            if cross > 0.0 {
                positive += 1;
            } else if cross < 0.0 {
                negative += 1;
            }
        }
        positive == 4 || negative == 4
    }

    /// Returns `true` if every corner of `other` lies strictly inside this face.
    #[must_use]
    pub fn covers(&self, other: &Self) -> bool {
        other.points.iter().all(|p| self.contains_strictly(*p))
    }
}

fn quad_bounds(points: &[Point; 4]) -> Rect {
    points[1..]
        .iter()
        .fold(Rect::from_points(points[0], points[0]), |r, p| {
            r.union_pt(*p)
        })
}

/// Projects every face and sorts the result back to front.
#[must_use]
pub fn project_faces<'a>(
    faces: impl IntoIterator<Item = &'a Face>,
    projector: &ScreenProjector,
) -> Vec<DeviceFace> {
    let mut out: Vec<_> = faces
        .into_iter()
        .map(|f| DeviceFace::project(f, projector))
        .collect();
    sort_by_depth(&mut out);
    out
}

/// Sorts faces by ascending depth, farthest first.
///
/// The sort is stable, so faces of equal depth keep their mesh order.
pub fn sort_by_depth(faces: &mut [DeviceFace]) {
    faces.sort_by(|a, b| a.depth.total_cmp(&b.depth));
}

/// Drops faces completely hidden behind a single nearer face.
///
/// `faces` must be sorted farthest first. They are walked from the nearest
/// one; a face is removed when all four corners lie strictly inside a face
/// that was already kept. The remaining faces keep their order.
pub fn remove_hidden_faces(faces: &mut Vec<DeviceFace>) {
    let mut kept: Vec<DeviceFace> = Vec::with_capacity(faces.len());
    for face in faces.iter().rev() {
        if !kept.iter().any(|near| near.covers(face)) {
            kept.push(*face);
        }
    }
    kept.reverse();
    log::debug!(
        "hidden face removal kept {} of {} faces",
        kept.len(),
        faces.len()
    );
    *faces = kept;
}
