// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use kurbo::{Affine, Point, Rect};
use relief_imaging::{DrawOp, ImagingBackend, PaintDesc, StateOp, TextAnchor};
use relief_mesh::ColorPalette;

use crate::render::{EDGE_COLOR, to_f32};

/// Placement of the colour legend.
///
/// `offset` and `width` are fractions of the plot height, so the legend keeps
/// its proportions at any export size. A positive offset puts the legend to
/// the right of the plot, a negative one to the left.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorbarOptions {
    /// Whether the legend is drawn at all.
    pub visible: bool,
    /// Gap between plot and legend.
    pub offset: f64,
    /// Width of the gradient bar.
    pub width: f64,
    /// Number of solid slices the gradient is drawn with.
    pub steps: usize,
}

impl Default for ColorbarOptions {
    fn default() -> Self {
        Self {
            visible: true,
            offset: 0.08,
            width: 0.05,
            steps: 64,
        }
    }
}

/// A text placement produced by the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    /// Baseline anchor position.
    pub position: Point,
    /// Horizontal alignment relative to `position`.
    pub anchor: TextAnchor,
    /// Font size in the same units as `position`.
    pub size: f64,
    /// Text content.
    pub text: String,
}

impl Label {
    /// Estimated bounding box, assuming glyphs half as wide as the font size.
    #[must_use]
    pub fn estimated_bounds(&self) -> Rect {
        let width = 0.5 * self.size * self.text.chars().count() as f64;
        let x0 = match self.anchor {
            TextAnchor::Start => self.position.x,
            TextAnchor::Middle => self.position.x - 0.5 * width,
            TextAnchor::End => self.position.x - width,
        };
        Rect::new(
            x0,
            self.position.y - self.size,
            x0 + width,
            self.position.y + 0.25 * self.size,
        )
    }

    /// Returns this label with `transform` applied to its position and size.
    #[must_use]
    pub fn transformed(&self, transform: Affine) -> Self {
        Self {
            position: transform * self.position,
            anchor: self.anchor,
            size: self.size * transform.as_coeffs()[0].abs(),
            text: self.text.clone(),
        }
    }
}

/// Colour legend laid out next to a plot.
#[derive(Clone, Debug, PartialEq)]
pub struct Colorbar {
    /// The gradient bar.
    pub rect: Rect,
    /// Minimum and maximum value labels.
    pub labels: [Label; 2],
    steps: usize,
    palette: ColorPalette,
}

impl Colorbar {
    /// Lays out a legend for `value_range` next to `plot`.
    ///
    /// Returns `None` when the legend is hidden or the plot has no height.
    #[must_use]
    pub fn layout(
        plot: Rect,
        value_range: (f64, f64),
        options: &ColorbarOptions,
        palette: ColorPalette,
    ) -> Option<Self> {
        let height = plot.height();
        if !options.visible || height.is_nan() || height <= 0.0 {
            return None;
        }
        let offset = options.offset * height;
        let width = options.width * height;
        let (x0, label_x, anchor) = if options.offset >= 0.0 {
            let x0 = plot.x1 + offset;
            (x0, x0 + width + 0.2 * width, TextAnchor::Start)
        } else {
            let x0 = plot.x0 + offset - width;
            (x0, x0 - 0.2 * width, TextAnchor::End)
        };
        let rect = Rect::new(x0, plot.y0, x0 + width, plot.y1);
        let size = 0.05 * height;
        let (min, max) = value_range;
        let labels = [
            Label {
                position: Point::new(label_x, rect.y1),
                anchor,
                size,
                text: format_value(min),
            },
            Label {
                position: Point::new(label_x, rect.y0 + size),
                anchor,
                size,
                text: format_value(max),
            },
        ];
        Some(Self {
            rect,
            labels,
            steps: options.steps.max(1),
            palette,
        })
    }

    /// Bounding box of the bar and its labels.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.labels
            .iter()
            .fold(self.rect, |r, l| r.union(l.estimated_bounds()))
    }

    /// Draws the bar with every coordinate mapped through `transform`.
    ///
    /// Hue 0 (the minimum) is at the bottom.
    pub fn draw(&self, backend: &mut impl ImagingBackend, transform: Affine) {
        let rect = transform.transform_rect_bbox(self.rect);
        draw_gradient(backend, rect, self.palette, self.steps, Direction::Up);
        let edge = backend.create_paint(PaintDesc::solid(EDGE_COLOR));
        backend.state(StateOp::SetPaint(edge));
        backend.draw(DrawOp::StrokeRect {
            x0: to_f32(rect.x0),
            y0: to_f32(rect.y0),
            x1: to_f32(rect.x1),
            y1: to_f32(rect.y1),
        });
    }

    /// Emits the labels as text ops.
    pub fn draw_labels(&self, backend: &mut impl ImagingBackend, transform: Affine) {
        let paint = backend.create_paint(PaintDesc::solid(peniko::Color::BLACK));
        backend.state(StateOp::SetPaint(paint));
        for label in &self.labels {
            let label = label.transformed(transform);
            backend.draw(DrawOp::Text {
                x: to_f32(label.position.x),
                y: to_f32(label.position.y),
                size: to_f32(label.size),
                anchor: label.anchor,
                text: Arc::from(label.text.as_str()),
            });
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Up,
    Right,
}

/// Draws a horizontal preview of `palette` filling `rect`, hue 0 at the left.
pub fn gradient_strip(
    backend: &mut impl ImagingBackend,
    rect: Rect,
    palette: ColorPalette,
    steps: usize,
) {
    draw_gradient(backend, rect, palette, steps.max(1), Direction::Right);
}

fn draw_gradient(
    backend: &mut impl ImagingBackend,
    rect: Rect,
    palette: ColorPalette,
    steps: usize,
    direction: Direction,
) {
    let n = steps as f64;
    for i in 0..steps {
        let t0 = i as f64 / n;
        let t1 = (i + 1) as f64 / n;
        let hue = (i as f64 + 0.5) / n;
        let slice = match direction {
            Direction::Up => Rect::new(
                rect.x0,
                rect.y1 - t1 * rect.height(),
                rect.x1,
                rect.y1 - t0 * rect.height(),
            ),
            Direction::Right => Rect::new(
                rect.x0 + t0 * rect.width(),
                rect.y0,
                rect.x0 + t1 * rect.width(),
                rect.y1,
            ),
        };
        let paint = backend.create_paint(PaintDesc::solid(palette.color(hue, 1.0)));
        backend.state(StateOp::SetPaint(paint));
        backend.draw(DrawOp::FillRect {
            x0: to_f32(slice.x0),
            y0: to_f32(slice.y0),
            x1: to_f32(slice.x1),
            y1: to_f32(slice.y1),
        });
    }
}

/// Formats a legend value: integers without decimals, others with up to
/// three.
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{value:.0}");
    }
    let mut s = format!("{value:.3}");
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    if s == "-0" {
        s.remove(0);
    }
    s
}
