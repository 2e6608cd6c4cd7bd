// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use hashbrown::HashMap;
use kurbo::{Affine, Rect, Size, Stroke};
use peniko::Color;
use relief_imaging::{DrawOp, ImagingBackend, PaintDesc, PaintId, PathDesc, StateOp};
use relief_mesh::{ColorPalette, Mesh};
use relief_view3d::{Camera, ScreenProjector};

use crate::bounds::{crop, union_bounds};
use crate::device::{DeviceFace, project_faces, remove_hidden_faces};
use crate::{Colorbar, ColorbarOptions, ExportOptions, Label};

/// Outline colour of faces and of the legend.
pub(crate) const EDGE_COLOR: Color = Color::new([0.4, 0.4, 0.4, 1.0]);

#[allow(
    clippy::cast_possible_truncation,
    reason = "imaging coordinates are f32"
)]
pub(crate) fn to_f32(v: f64) -> f32 {
    v as f32
}

/// Device-space content of one view: depth-sorted faces and the legend.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    faces: Vec<DeviceFace>,
    plot_bounds: Option<Rect>,
    value_range: Option<(f64, f64)>,
    palette: ColorPalette,
    colorbar_options: ColorbarOptions,
    colorbar: Option<Colorbar>,
}

impl Scene {
    /// Projects, sorts and optionally culls the faces of `mesh`, then lays out
    /// the legend next to them.
    #[must_use]
    pub fn build(mesh: &Mesh, projector: &ScreenProjector, options: &ExportOptions) -> Self {
        let mut faces = project_faces(mesh.faces(), projector);
        if options.hidden_face_removal {
            remove_hidden_faces(&mut faces);
        }
        let plot_bounds = union_bounds(faces.iter().map(|f| f.bounds));
        let mut scene = Self {
            faces,
            plot_bounds,
            value_range: mesh.value_range(),
            palette: mesh.params().palette,
            colorbar_options: options.colorbar,
            colorbar: None,
        };
        if let Some(plot) = plot_bounds {
            scene.layout_colorbar(plot);
        }
        scene
    }

    /// Faces in drawing order, farthest first.
    #[must_use]
    pub fn faces(&self) -> &[DeviceFace] {
        &self.faces
    }

    /// Union of the face bounding boxes.
    #[must_use]
    pub fn plot_bounds(&self) -> Option<Rect> {
        self.plot_bounds
    }

    /// The legend, if one is shown.
    #[must_use]
    pub fn colorbar(&self) -> Option<&Colorbar> {
        self.colorbar.as_ref()
    }

    /// Places the legend next to `plot` instead of this scene's own faces.
    ///
    /// Used to line legends up across a series of exports.
    pub fn layout_colorbar(&mut self, plot: Rect) {
        self.colorbar = self.value_range.and_then(|range| {
            Colorbar::layout(plot, range, &self.colorbar_options, self.palette)
        });
    }

    /// Union of the faces, the legend and its labels.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        union_bounds(
            self.plot_bounds
                .into_iter()
                .chain(self.colorbar.as_ref().map(Colorbar::bounds)),
        )
    }

    /// Draws the scene with every device coordinate mapped through
    /// `transform`.
    ///
    /// Each face is filled and then outlined. Legend labels are emitted as
    /// text ops when `with_labels` is set; they are always returned, mapped
    /// through `transform`.
    pub fn draw(
        &self,
        backend: &mut impl ImagingBackend,
        transform: Affine,
        stroke_width: f64,
        with_labels: bool,
    ) -> Vec<Label> {
        backend.state(StateOp::SetStroke(Stroke::new(stroke_width)));
        let edge = backend.create_paint(PaintDesc::solid(EDGE_COLOR));
        let mut paints: HashMap<[u8; 4], PaintId> = HashMap::new();
        for face in &self.faces {
            let c = face.color.to_rgba8();
            let fill = *paints
                .entry([c.r, c.g, c.b, c.a])
                .or_insert_with(|| backend.create_paint(PaintDesc::solid(face.color)));
            let corners = face.points.map(|p| transform * p);
            let path = backend.create_path(PathDesc::polygon(&corners));
            backend.state(StateOp::SetPaint(fill));
            backend.draw(DrawOp::FillPath(path));
            backend.state(StateOp::SetPaint(edge));
            backend.draw(DrawOp::StrokePath(path));
        }

        let Some(colorbar) = &self.colorbar else {
            return Vec::new();
        };
        colorbar.draw(backend, transform);
        if with_labels {
            colorbar.draw_labels(backend, transform);
        }
        colorbar
            .labels
            .iter()
            .map(|l| l.transformed(transform))
            .collect()
    }
}

/// Maps `frame` onto an output `width` units wide, keeping its aspect ratio.
///
/// Returns the transform and the output size. Degenerate frames map with unit
/// scale.
#[must_use]
pub fn fit_to_width(frame: Rect, width: f64) -> (Affine, Size) {
    let scale = if frame.width() > 0.0 {
        width / frame.width()
    } else {
        1.0
    };
    let transform = Affine::scale(scale) * Affine::translate(-frame.origin().to_vec2());
    (transform, Size::new(width, frame.height() * scale))
}

/// Renders the mesh as seen by `camera` into `backend`, in viewport pixels.
///
/// Uses the effective projection, so a gesture in progress is shown. Text is
/// left to the caller: the legend labels are returned instead of drawn.
pub fn render_view(
    backend: &mut impl ImagingBackend,
    mesh: &Mesh,
    camera: &Camera,
    options: &ExportOptions,
) -> Vec<Label> {
    let scene = Scene::build(mesh, &camera.projector(), options);
    scene.draw(backend, Affine::IDENTITY, 1.0, false)
}

/// Part of the viewport covered by the rendered mesh and legend, on the
/// pixel grid.
#[must_use]
pub fn visible_bounds(mesh: &Mesh, camera: &Camera, options: &ExportOptions) -> Option<Rect> {
    let scene = Scene::build(mesh, &camera.projector(), options);
    let bounds = scene.bounds()?;
    let viewport = camera.view_size().to_rect();
    Some(crop(bounds.expand(), viewport))
}
