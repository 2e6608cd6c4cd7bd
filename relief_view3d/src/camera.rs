// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::cell::OnceCell;

use kurbo::{Point, Size};

use crate::arcball::{arcball_point, rotation_between};
use crate::modes::{ArcballRestriction, CameraMode};
use crate::{EulerAngles, Mat4, ScreenPoint, ScreenProjector, Vec3};

/// Camera state that survives between gestures.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CommittedCamera {
    /// Model rotation.
    pub rotation: Mat4,
    /// Inverse of `rotation`, kept as its transpose.
    pub rotation_inverse: Mat4,
    /// World‑space translation applied before rotating.
    pub translation: Vec3,
    /// Integer zoom level in `[Camera::MIN_ZOOM_LEVEL, Camera::MAX_ZOOM_LEVEL]`.
    pub zoom_level: i32,
}

impl CommittedCamera {
    fn with_angles(angles: EulerAngles) -> Self {
        let rotation = Mat4::from_euler(angles);
        Self {
            rotation,
            rotation_inverse: rotation.transpose(),
            translation: Vec3::ZERO,
            zoom_level: 0,
        }
    }
}

/// Provisional delta of an in‑progress drag.
///
/// It is composed into the rendered projection but only folded into
/// [`CommittedCamera`] when the gesture finishes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureDelta {
    /// Pan drag.
    Pan {
        /// Screen point where the drag started.
        start: Point,
        /// Provisional world‑space translation.
        translation: Vec3,
    },
    /// Arcball drag.
    Rotate {
        /// Screen point where the drag started.
        start: Point,
        /// Provisional rotation, applied after the committed one.
        rotation: Mat4,
    },
}

/// Orbit camera over a unit‑cube model.
///
/// The committed projection is `T(translation) * R * S(zoom)` in row‑vector
/// convention: translate the model, rotate it, then scale into clip space.
/// A pending pan adds to the translation; a pending rotation is applied after
/// `R`. Gestures come as start/update/finish triplets; starting a new
/// gesture or calling [`Camera::cancel_gesture`] discards the pending one.
#[derive(Clone, Debug)]
pub struct Camera {
    view_size: Size,
    committed: CommittedCamera,
    pending: Option<GestureDelta>,
    projection: Mat4,
    committed_inverse: OnceCell<Mat4>,
}

impl Camera {
    /// Smallest zoom level.
    pub const MIN_ZOOM_LEVEL: i32 = -12;
    /// Largest zoom level.
    pub const MAX_ZOOM_LEVEL: i32 = 12;
    /// Orientation of a freshly created camera: rows recede upward and bar
    /// heights point up the screen.
    pub const DEFAULT_ANGLES: EulerAngles = EulerAngles::new(30.0, -60.0, 0.0);

    /// Creates a camera for a viewport of `view_size` pixels.
    #[must_use]
    pub fn new(view_size: Size) -> Self {
        let mut camera = Self {
            view_size,
            committed: CommittedCamera::with_angles(Self::DEFAULT_ANGLES),
            pending: None,
            projection: Mat4::IDENTITY,
            committed_inverse: OnceCell::new(),
        };
        camera.rebuild_projection();
        camera
    }

    /// Returns the viewport size in pixels.
    #[must_use]
    pub fn view_size(&self) -> Size {
        self.view_size
    }

    /// Sets the viewport size in pixels.
    pub fn set_view_size(&mut self, size: Size) {
        if self.view_size == size {
            return;
        }
        self.view_size = size;
        self.rebuild_projection();
    }

    /// The committed state.
    #[must_use]
    pub fn committed(&self) -> &CommittedCamera {
        &self.committed
    }

    /// The in‑progress gesture, if any.
    #[must_use]
    pub fn pending(&self) -> Option<&GestureDelta> {
        self.pending.as_ref()
    }

    /// Current interaction mode.
    #[must_use]
    pub fn mode(&self) -> CameraMode {
        match self.pending {
            None => CameraMode::Idle,
            Some(GestureDelta::Pan { .. }) => CameraMode::Panning,
            Some(GestureDelta::Rotate { .. }) => CameraMode::Rotating,
        }
    }

    /// Committed orientation as orbit angles.
    #[must_use]
    pub fn angles(&self) -> EulerAngles {
        self.committed.rotation.euler_angles()
    }

    /// Replaces the committed rotation.
    pub fn set_angles(&mut self, angles: EulerAngles) {
        let zoom_level = self.committed.zoom_level;
        let translation = self.committed.translation;
        self.committed = CommittedCamera {
            translation,
            zoom_level,
            ..CommittedCamera::with_angles(angles)
        };
        self.rebuild_projection();
    }

    /// Replaces the committed translation.
    pub fn set_translation(&mut self, translation: Vec3) {
        self.committed.translation = translation;
        self.rebuild_projection();
    }

    /// Restores default orientation, zero translation and zoom level 0.
    pub fn reset(&mut self) {
        self.committed = CommittedCamera::with_angles(Self::DEFAULT_ANGLES);
        self.pending = None;
        self.rebuild_projection();
    }

    /// Current zoom level.
    #[must_use]
    pub fn zoom_level(&self) -> i32 {
        self.committed.zoom_level
    }

    /// Pixels per world unit: `2^((level + 18) / 2)`.
    #[must_use]
    pub fn zoom_factor(&self) -> f64 {
        (f64::from(self.committed.zoom_level + 18) / 2.0).exp2()
    }

    /// Changes the zoom level by `steps`, saturating at the limits.
    pub fn zoom(&mut self, steps: i32) {
        self.set_zoom_level(self.committed.zoom_level.saturating_add(steps));
    }

    /// Sets the zoom level, clamped to the allowed range.
    pub fn set_zoom_level(&mut self, level: i32) {
        let level = level.clamp(Self::MIN_ZOOM_LEVEL, Self::MAX_ZOOM_LEVEL);
        if level == self.committed.zoom_level {
            return;
        }
        self.committed.zoom_level = level;
        self.rebuild_projection();
    }

    /// Clip‑space scale derived from the zoom factor and viewport size.
    #[must_use]
    pub fn scale_vector(&self) -> [f64; 4] {
        let f = 2.0 * self.zoom_factor();
        let w = positive_or_one(self.view_size.width);
        let h = positive_or_one(self.view_size.height);
        [f / w, f / h, f / w.max(h), 1.0]
    }

    /// Begins a pan drag at `point`.
    pub fn pan_start(&mut self, point: Point) {
        self.pending = Some(GestureDelta::Pan {
            start: point,
            translation: Vec3::ZERO,
        });
        self.rebuild_projection();
    }

    /// Updates the provisional pan translation.
    ///
    /// Does nothing unless a pan is in progress.
    pub fn pan_update(&mut self, point: Point) {
        let Some(GestureDelta::Pan { start, .. }) = self.pending else {
            return;
        };
        let translation = self.pan_translation(start, point);
        self.pending = Some(GestureDelta::Pan { start, translation });
        self.rebuild_projection();
    }

    /// Ends a pan drag, committing its translation.
    pub fn pan_finish(&mut self, point: Point) {
        let Some(GestureDelta::Pan { start, .. }) = self.pending else {
            return;
        };
        let translation = self.pan_translation(start, point);
        self.committed.translation += translation;
        self.pending = None;
        self.rebuild_projection();
    }

    /// Begins an arcball drag at `point`.
    pub fn arcball_rotate_start(&mut self, point: Point) {
        self.pending = Some(GestureDelta::Rotate {
            start: point,
            rotation: Mat4::IDENTITY,
        });
        self.rebuild_projection();
    }

    /// Updates the provisional arcball rotation.
    ///
    /// Does nothing unless an arcball drag is in progress.
    pub fn arcball_rotate_update(&mut self, point: Point, restriction: ArcballRestriction) {
        let Some(GestureDelta::Rotate { start, .. }) = self.pending else {
            return;
        };
        let rotation = self.arcball_rotation(start, point, restriction);
        self.pending = Some(GestureDelta::Rotate { start, rotation });
        self.rebuild_projection();
    }

    /// Ends an arcball drag, composing its rotation into the committed one.
    pub fn arcball_rotate_finish(&mut self, point: Point, restriction: ArcballRestriction) {
        let Some(GestureDelta::Rotate { start, .. }) = self.pending else {
            return;
        };
        let rotation = self.arcball_rotation(start, point, restriction);
        if rotation != Mat4::IDENTITY {
            self.committed.rotation = self.committed.rotation * rotation;
            self.committed.rotation_inverse = rotation.transpose() * self.committed.rotation_inverse;
        }
        self.pending = None;
        self.rebuild_projection();
    }

    /// Drops the in‑progress gesture without committing it.
    pub fn cancel_gesture(&mut self) {
        if self.pending.take().is_some() {
            self.rebuild_projection();
        }
    }

    /// Effective projection, including any pending gesture.
    #[must_use]
    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// Projector for the effective (rendered) state.
    #[must_use]
    pub fn projector(&self) -> ScreenProjector {
        let (translation, rotation, rotation_inverse) = self.effective_parts();
        let scale = self.scale_vector();
        ScreenProjector::new(
            self.projection,
            compose_inverse(translation, &rotation_inverse, scale),
            self.view_size,
        )
    }

    /// Projector for the committed state, ignoring any pending gesture.
    #[must_use]
    pub fn committed_projector(&self) -> ScreenProjector {
        let c = &self.committed;
        let scale = self.scale_vector();
        ScreenProjector::new(
            compose(c.translation, &c.rotation, scale),
            *self.committed_inverse(),
            self.view_size,
        )
    }

    /// Projects a world point with the effective projection.
    #[must_use]
    pub fn world_to_screen(&self, world: Vec3) -> ScreenPoint {
        self.projector().world_to_screen(world)
    }

    /// Unprojects a screen point with the committed inverse projection.
    #[must_use]
    pub fn screen_to_world(&self, screen: ScreenPoint) -> Vec3 {
        self.committed_projector().screen_to_world(screen)
    }

    /// Snapshot of the current camera state for debugging and inspection.
    #[must_use]
    pub fn debug_info(&self) -> CameraDebugInfo {
        CameraDebugInfo {
            view_size: self.view_size,
            mode: self.mode(),
            angles: self.angles(),
            translation: self.committed.translation,
            zoom_level: self.committed.zoom_level,
            zoom_factor: self.zoom_factor(),
        }
    }

    fn committed_inverse(&self) -> &Mat4 {
        self.committed_inverse.get_or_init(|| {
            let c = &self.committed;
            compose_inverse(c.translation, &c.rotation_inverse, self.scale_vector())
        })
    }

    fn pan_translation(&self, start: Point, point: Point) -> Vec3 {
        let (x_axis, y_axis) = self.committed_projector().screen_axes();
        let delta = point - start;
        // Screen y grows downward, world y upward.
        x_axis * delta.x - y_axis * delta.y
    }

    fn arcball_rotation(&self, start: Point, point: Point, restriction: ArcballRestriction) -> Mat4 {
        let from = arcball_point(start, self.view_size, restriction);
        let to = arcball_point(point, self.view_size, restriction);
        rotation_between(from, to)
    }

    fn effective_parts(&self) -> (Vec3, Mat4, Mat4) {
        let c = &self.committed;
        match self.pending {
            None => (c.translation, c.rotation, c.rotation_inverse),
            Some(GestureDelta::Pan { translation, .. }) => {
                (c.translation + translation, c.rotation, c.rotation_inverse)
            }
            Some(GestureDelta::Rotate { rotation, .. }) => (
                c.translation,
                c.rotation * rotation,
                rotation.transpose() * c.rotation_inverse,
            ),
        }
    }

    fn rebuild_projection(&mut self) {
        let (translation, rotation, _) = self.effective_parts();
        self.projection = compose(translation, &rotation, self.scale_vector());
        self.committed_inverse = OnceCell::new();
    }
}

/// Debug snapshot of a [`Camera`].
#[derive(Clone, Copy, Debug)]
pub struct CameraDebugInfo {
    /// Viewport size in pixels.
    pub view_size: Size,
    /// Interaction mode.
    pub mode: CameraMode,
    /// Committed orientation.
    pub angles: EulerAngles,
    /// Committed translation.
    pub translation: Vec3,
    /// Committed zoom level.
    pub zoom_level: i32,
    /// Pixels per world unit.
    pub zoom_factor: f64,
}

fn positive_or_one(v: f64) -> f64 {
    if v > 0.0 { v } else { 1.0 }
}

fn compose(translation: Vec3, rotation: &Mat4, scale: [f64; 4]) -> Mat4 {
    let mut m = Mat4::translation(translation) * *rotation;
    m.scale(scale);
    m
}

fn compose_inverse(translation: Vec3, rotation_inverse: &Mat4, scale: [f64; 4]) -> Mat4 {
    let inverse_scale = Mat4::scaling([1.0 / scale[0], 1.0 / scale[1], 1.0 / scale[2], 1.0]);
    inverse_scale * *rotation_inverse * Mat4::translation(-translation)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: Size = Size::new(800.0, 600.0);

    fn assert_point_close(a: Point, b: Point) {
        assert!((a - b).hypot() < 1e-6, "{a:?} != {b:?}");
    }

    fn assert_vec_close(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-9, "{a:?} != {b:?}");
    }

    #[test]
    fn screen_world_round_trip_for_committed_state() {
        let mut camera = Camera::new(VIEW);
        camera.set_translation(Vec3::new(0.1, -0.2, 0.05));
        camera.zoom(3);
        camera.set_angles(EulerAngles::new(-40.0, 70.0, 12.0));

        for p in [
            Point::new(0.0, 0.0),
            Point::new(400.0, 300.0),
            Point::new(123.5, 555.25),
        ] {
            for depth in [-0.5, 0.0, 0.8] {
                let world = camera.screen_to_world(ScreenPoint { point: p, depth });
                let back = camera.world_to_screen(world);
                assert_point_close(back.point, p);
                assert!((back.depth - depth).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn zoom_saturates_at_both_limits() {
        let mut camera = Camera::new(VIEW);
        camera.zoom(100);
        assert_eq!(camera.zoom_level(), Camera::MAX_ZOOM_LEVEL);
        camera.zoom(100);
        assert_eq!(camera.zoom_level(), Camera::MAX_ZOOM_LEVEL);
        camera.zoom(-100);
        assert_eq!(camera.zoom_level(), Camera::MIN_ZOOM_LEVEL);
        camera.zoom(-100);
        assert_eq!(camera.zoom_level(), Camera::MIN_ZOOM_LEVEL);
        camera.zoom(i32::MAX);
        assert_eq!(camera.zoom_level(), Camera::MAX_ZOOM_LEVEL);
    }

    #[test]
    fn zoom_factor_is_exponential() {
        let mut camera = Camera::new(VIEW);
        assert_eq!(camera.zoom_factor(), 512.0);
        camera.zoom(2);
        assert_eq!(camera.zoom_factor(), 1024.0);
        camera.zoom(-1);
        assert!((camera.zoom_factor() - 2.0_f64.powf(9.5)).abs() < 1e-9);
    }

    #[test]
    fn origin_projects_to_viewport_centre() {
        let camera = Camera::new(VIEW);
        let centre = camera.world_to_screen(Vec3::ZERO);
        assert_point_close(centre.point, Point::new(400.0, 300.0));
    }

    #[test]
    fn pan_moves_model_with_the_pointer() {
        let mut camera = Camera::new(VIEW);
        let origin_before = camera.world_to_screen(Vec3::ZERO).point;

        camera.pan_start(Point::new(100.0, 100.0));
        assert_eq!(camera.mode(), CameraMode::Panning);
        camera.pan_update(Point::new(130.0, 80.0));
        let during = camera.world_to_screen(Vec3::ZERO).point;
        assert_point_close(during, origin_before + (30.0, -20.0));
        // Nothing is committed yet.
        assert_eq!(camera.committed().translation, Vec3::ZERO);

        camera.pan_finish(Point::new(150.0, 140.0));
        assert_eq!(camera.mode(), CameraMode::Idle);
        let after = camera.world_to_screen(Vec3::ZERO).point;
        assert_point_close(after, origin_before + (50.0, 40.0));
        assert_ne!(camera.committed().translation, Vec3::ZERO);
    }

    #[test]
    fn cancelled_pan_leaves_committed_state() {
        let mut camera = Camera::new(VIEW);
        let before = *camera.projection();
        camera.pan_start(Point::new(10.0, 10.0));
        camera.pan_update(Point::new(200.0, 300.0));
        assert_ne!(*camera.projection(), before);
        camera.cancel_gesture();
        assert_eq!(*camera.projection(), before);
    }

    #[test]
    fn arcball_finish_at_start_point_is_a_no_op() {
        let mut camera = Camera::new(VIEW);
        let before = camera.committed().rotation;
        let p = Point::new(321.0, 123.0);
        camera.arcball_rotate_start(p);
        camera.arcball_rotate_finish(p, ArcballRestriction::None);
        assert_eq!(camera.committed().rotation, before);
        assert_eq!(camera.mode(), CameraMode::Idle);
    }

    #[test]
    fn arcball_commit_matches_last_provisional_projection() {
        let mut camera = Camera::new(VIEW);
        camera.arcball_rotate_start(Point::new(400.0, 300.0));
        camera.arcball_rotate_update(Point::new(460.0, 250.0), ArcballRestriction::None);
        assert_eq!(camera.mode(), CameraMode::Rotating);
        let provisional = *camera.projection();
        camera.arcball_rotate_finish(Point::new(460.0, 250.0), ArcballRestriction::None);
        for (a, b) in camera.projection().as_array().iter().zip(provisional.as_array()) {
            assert!((a - b).abs() < 1e-9);
        }
        let c = camera.committed();
        let product = c.rotation * c.rotation_inverse;
        for (a, b) in product.as_array().iter().zip(Mat4::IDENTITY.as_array()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn arcball_drag_from_centre_turns_front_toward_pointer() {
        let mut camera = Camera::new(VIEW);
        camera.set_angles(EulerAngles::default());
        // With no rotation world +z faces the viewer; dragging right from the
        // centre should swing it toward screen +x.
        camera.arcball_rotate_start(Point::new(400.0, 300.0));
        camera.arcball_rotate_finish(Point::new(500.0, 300.0), ArcballRestriction::Horizontal);
        let z = camera.committed().rotation.transform_direction(Vec3::new(0.0, 0.0, 1.0));
        assert!(z.x > 0.0);
        assert!(z.y.abs() < 1e-9);
    }

    #[test]
    fn gesture_updates_without_start_are_ignored() {
        let mut camera = Camera::new(VIEW);
        let before = *camera.projection();
        camera.pan_update(Point::new(5.0, 5.0));
        camera.arcball_rotate_update(Point::new(5.0, 5.0), ArcballRestriction::None);
        camera.pan_finish(Point::new(50.0, 5.0));
        assert_eq!(*camera.projection(), before);

        camera.pan_start(Point::new(0.0, 0.0));
        camera.arcball_rotate_finish(Point::new(40.0, 0.0), ArcballRestriction::None);
        assert_eq!(camera.mode(), CameraMode::Panning);
    }

    #[test]
    fn angles_and_debug_info() {
        let mut camera = Camera::new(VIEW);
        let angles = EulerAngles::new(15.0, 50.0, -20.0);
        camera.set_angles(angles);
        let back = camera.angles();
        assert!((back.azimuth - 15.0).abs() < 1e-9);
        assert!((back.elevation - 50.0).abs() < 1e-9);
        assert!((back.tilt + 20.0).abs() < 1e-9);

        camera.zoom(1);
        let info = camera.debug_info();
        assert_eq!(info.view_size, VIEW);
        assert_eq!(info.zoom_level, 1);
        assert_eq!(info.mode, CameraMode::Idle);

        camera.reset();
        assert_eq!(camera.zoom_level(), 0);
        assert_vec_close(camera.committed().translation, Vec3::ZERO);
    }
}
