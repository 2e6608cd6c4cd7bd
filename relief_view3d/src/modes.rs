// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Constraint applied to arcball drags.
///
/// Used by [`crate::Camera::arcball_rotate_update`] and
/// [`crate::Camera::arcball_rotate_finish`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ArcballRestriction {
    /// Rotate freely about any axis.
    #[default]
    None,
    /// Only horizontal drag motion counts; rotation is about the screen's
    /// vertical axis.
    Horizontal,
    /// Only vertical drag motion counts; rotation is about the screen's
    /// horizontal axis.
    Vertical,
}

/// Interaction state of a [`crate::Camera`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CameraMode {
    /// No gesture in progress.
    #[default]
    Idle,
    /// A pan drag is in progress.
    Panning,
    /// An arcball drag is in progress.
    Rotating,
}
