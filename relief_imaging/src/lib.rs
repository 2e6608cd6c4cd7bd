// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Relief Imaging: the drawing IR shared by every Relief output target.
//!
//! Exported scenes are flat: filled and stroked polygons plus a few text
//! labels. This crate describes them as plain data and defines the traits a
//! target implements to consume them.
//!
//! - **Resources**: [`PathId`] and [`PaintId`] handles, created and destroyed
//!   through [`ResourceBackend`].
//! - **Operations**: [`StateOp`] changes the current transform, paint or
//!   stroke; [`DrawOp`] draws with that state. [`ImagingOp`] is either.
//! - **Backends**: [`ImagingBackend`] accepts operations. [`RecordingBackend`]
//!   keeps them in memory so document writers (SVG, PDF, TikZ) can walk the
//!   list afterwards with a [`DrawState`] tracking the current state.
//!
//! # Example
//!
//! ```rust
//! use kurbo::Point;
//! use peniko::Color;
//! use relief_imaging::{
//!     DrawOp, ImagingBackend, ImagingOp, PaintDesc, PathDesc, RecordingBackend,
//!     ResourceBackend, StateOp,
//! };
//!
//! let mut backend = RecordingBackend::default();
//! let paint = backend.create_paint(PaintDesc::solid(Color::from_rgba8(255, 0, 0, 255)));
//! let path = backend.create_path(PathDesc::polygon(&[
//!     Point::new(0.0, 0.0),
//!     Point::new(10.0, 0.0),
//!     Point::new(10.0, 10.0),
//! ]));
//!
//! backend.state(StateOp::SetPaint(paint));
//! backend.draw(DrawOp::FillPath(path));
//! assert!(matches!(backend.ops()[1], ImagingOp::Draw(DrawOp::FillPath(_))));
//! ```
//!
//! This crate is `no_std`.

#![no_std]

extern crate alloc;

use alloc::{boxed::Box, sync::Arc, vec::Vec};
use kurbo::Point;
use peniko::{Brush, Color};

/// Identifier for a path resource.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PathId(pub u32);

/// Identifier for a paint resource.
///
/// Paints may be shared by many draws.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PaintId(pub u32);

/// Affine transform type used by the IR.
pub type Affine = kurbo::Affine;

/// Stroke style used by [`StateOp::SetStroke`].
pub type StrokeStyle = kurbo::Stroke;

/// State operations that mutate the current drawing state.
#[derive(Clone, Debug, PartialEq)]
pub enum StateOp {
    /// Set the current transform matrix.
    SetTransform(Affine),
    /// Set the current paint resource.
    SetPaint(PaintId),
    /// Set the current stroke style.
    SetStroke(StrokeStyle),
}

/// Horizontal alignment of a text run relative to its anchor point.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextAnchor {
    /// The text starts at the anchor.
    #[default]
    Start,
    /// The text is centred on the anchor.
    Middle,
    /// The text ends at the anchor.
    End,
}

/// Draw operations that produce output given the current state.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// Fill the given path with the current paint.
    FillPath(PathId),
    /// Stroke the given path with the current stroke and paint.
    StrokePath(PathId),
    /// Fill an axis-aligned rectangle with the current paint.
    FillRect {
        /// Minimum X coordinate.
        x0: f32,
        /// Minimum Y coordinate.
        y0: f32,
        /// Maximum X coordinate.
        x1: f32,
        /// Maximum Y coordinate.
        y1: f32,
    },
    /// Stroke an axis-aligned rectangle with the current stroke and paint.
    StrokeRect {
        /// Minimum X coordinate.
        x0: f32,
        /// Minimum Y coordinate.
        y0: f32,
        /// Maximum X coordinate.
        x1: f32,
        /// Maximum Y coordinate.
        y1: f32,
    },
    /// Draw a single line of text with the current paint.
    ///
    /// `(x, y)` is the baseline anchor. Backends without text support may
    /// ignore this op.
    Text {
        /// Anchor X coordinate.
        x: f32,
        /// Baseline Y coordinate.
        y: f32,
        /// Font size in user units.
        size: f32,
        /// Alignment relative to `x`.
        anchor: TextAnchor,
        /// Text content.
        text: Arc<str>,
    },
}

/// Description of a path resource.
#[derive(Clone, Debug, PartialEq)]
pub struct PathDesc {
    /// Command buffer describing the path geometry.
    pub commands: Box<[PathCmd]>,
}

impl PathDesc {
    /// Closed polygon through `points`.
    ///
    /// Returns an empty path for an empty slice.
    #[must_use]
    pub fn polygon(points: &[Point]) -> Self {
        let mut commands = Vec::with_capacity(points.len() + 1);
        for (i, p) in points.iter().enumerate() {
            let (x, y) = (to_f32(p.x), to_f32(p.y));
            commands.push(if i == 0 {
                PathCmd::MoveTo { x, y }
            } else {
                PathCmd::LineTo { x, y }
            });
        }
        if !commands.is_empty() {
            commands.push(PathCmd::Close);
        }
        Self {
            commands: commands.into_boxed_slice(),
        }
    }
}

/// Simple path command enumeration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PathCmd {
    /// Move the current point without drawing.
    MoveTo {
        /// X coordinate of the new point.
        x: f32,
        /// Y coordinate of the new point.
        y: f32,
    },
    /// Draw a line from the current point to the given point.
    LineTo {
        /// X coordinate of the line end.
        x: f32,
        /// Y coordinate of the line end.
        y: f32,
    },
    /// Close the current subpath.
    Close,
}

/// Description of a paint resource.
#[derive(Clone, Debug, PartialEq)]
pub struct PaintDesc {
    /// Brush used when rendering.
    pub brush: Brush,
}

impl PaintDesc {
    /// Solid colour paint.
    #[must_use]
    pub fn solid(color: Color) -> Self {
        Self {
            brush: Brush::Solid(color),
        }
    }

    /// The colour of a solid paint, `None` for gradients and images.
    #[must_use]
    pub fn solid_color(&self) -> Option<Color> {
        match &self.brush {
            Brush::Solid(color) => Some(*color),
            _ => None,
        }
    }
}

/// Resource lifetime interface.
///
/// IDs must remain valid and refer to the same resource until the
/// corresponding `destroy_*` call.
pub trait ResourceBackend {
    /// Create a path resource.
    fn create_path(&mut self, desc: PathDesc) -> PathId;
    /// Destroy a previously created path.
    fn destroy_path(&mut self, id: PathId);

    /// Create a paint resource.
    fn create_paint(&mut self, desc: PaintDesc) -> PaintId;
    /// Destroy a previously created paint.
    fn destroy_paint(&mut self, id: PaintId);
}

/// Unified operation, as stored by recordings.
#[derive(Clone, Debug, PartialEq)]
pub enum ImagingOp {
    /// State-changing operation.
    State(StateOp),
    /// Drawing operation.
    Draw(DrawOp),
}

/// Minimal backend trait: apply state and draw operations in order.
pub trait ImagingBackend: ResourceBackend {
    /// Apply a state operation.
    fn state(&mut self, op: StateOp);

    /// Apply a draw operation.
    fn draw(&mut self, op: DrawOp);
}

/// Current drawing state while walking a list of [`ImagingOp`]s.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawState {
    /// Current transform.
    pub transform: Affine,
    /// Current paint, if any was set.
    pub paint: Option<PaintId>,
    /// Current stroke style.
    pub stroke: StrokeStyle,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            paint: None,
            stroke: StrokeStyle::new(1.0),
        }
    }
}

impl DrawState {
    /// Applies a state operation.
    pub fn apply(&mut self, op: &StateOp) {
        match op {
            StateOp::SetTransform(xf) => self.transform = *xf,
            StateOp::SetPaint(id) => self.paint = Some(*id),
            StateOp::SetStroke(style) => self.stroke = style.clone(),
        }
    }
}

/// In-memory backend that keeps resources and operations for later
/// inspection or serialization.
#[derive(Clone, Debug, Default)]
pub struct RecordingBackend {
    paths: Vec<Option<PathDesc>>,
    paints: Vec<Option<PaintDesc>>,
    ops: Vec<ImagingOp>,
}

impl RecordingBackend {
    /// Recorded operations, in order.
    #[must_use]
    pub fn ops(&self) -> &[ImagingOp] {
        &self.ops
    }

    /// Looks up a live path.
    #[must_use]
    pub fn path(&self, id: PathId) -> Option<&PathDesc> {
        self.paths.get(id.0 as usize)?.as_ref()
    }

    /// Looks up a live paint.
    #[must_use]
    pub fn paint(&self, id: PaintId) -> Option<&PaintDesc> {
        self.paints.get(id.0 as usize)?.as_ref()
    }

    /// Colour of the current paint in `state`, if it is a live solid paint.
    #[must_use]
    pub fn solid_color(&self, state: &DrawState) -> Option<Color> {
        state.paint.and_then(|id| self.paint(id)?.solid_color())
    }

    /// Walks the recorded ops, calling `f` for every draw with the state in
    /// effect at that point.
    pub fn for_each_draw(&self, mut f: impl FnMut(&DrawState, &DrawOp)) {
        let mut state = DrawState::default();
        for op in &self.ops {
            match op {
                ImagingOp::State(op) => state.apply(op),
                ImagingOp::Draw(op) => f(&state, op),
            }
        }
    }
}

impl ResourceBackend for RecordingBackend {
    fn create_path(&mut self, desc: PathDesc) -> PathId {
        let id = next_id(self.paths.len());
        self.paths.push(Some(desc));
        PathId(id)
    }

    fn destroy_path(&mut self, id: PathId) {
        if let Some(slot) = self.paths.get_mut(id.0 as usize) {
            *slot = None;
        }
    }

    fn create_paint(&mut self, desc: PaintDesc) -> PaintId {
        let id = next_id(self.paints.len());
        self.paints.push(Some(desc));
        PaintId(id)
    }

    fn destroy_paint(&mut self, id: PaintId) {
        if let Some(slot) = self.paints.get_mut(id.0 as usize) {
            *slot = None;
        }
    }
}

impl ImagingBackend for RecordingBackend {
    fn state(&mut self, op: StateOp) {
        self.ops.push(ImagingOp::State(op));
    }

    fn draw(&mut self, op: DrawOp) {
        self.ops.push(ImagingOp::Draw(op));
    }
}

/// Next resource handle for a table of `len` slots.
///
/// Saturates at `u32::MAX`; a scene never holds that many resources.
fn next_id(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "device coordinates are stored as f32 in the IR"
)]
fn to_f32(v: f64) -> f32 {
    v as f32
}
