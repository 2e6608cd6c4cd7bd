// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! SVG document backend for the Relief imaging IR.
//!
//! [`SvgBackend`] records imaging ops and serializes them with
//! [`SvgBackend::to_svg`]: one `<path>` per filled or stroked polygon, `<rect>`
//! for rectangles and `<text>` for labels. Only solid paints carry colour;
//! other brushes fall back to black.

#![no_std]

extern crate alloc;

use alloc::format;
use alloc::string::String;
use core::fmt::Write as _;
use kurbo::{Cap, Join};
use peniko::Color;
use relief_imaging::{
    Affine, DrawOp, DrawState, ImagingBackend, ImagingOp, PaintDesc, PaintId, PathCmd,
    PathDesc, PathId, RecordingBackend, ResourceBackend, StateOp, TextAnchor,
};

/// A recording SVG backend.
#[derive(Clone, Default, Debug)]
pub struct SvgBackend {
    recording: RecordingBackend,
}

impl SvgBackend {
    /// Returns the recorded imaging ops.
    pub fn ops(&self) -> &[ImagingOp] {
        self.recording.ops()
    }

    /// Export the currently recorded ops as an SVG document.
    ///
    /// `width`/`height` are used both as the SVG `width`/`height` attributes
    /// (in points) and to set `viewBox="0 0 width height"`.
    pub fn to_svg(&self, width: f64, height: f64) -> String {
        let (w, h) = (fmt_f64(width), fmt_f64(height));
        let mut svg = String::new();
        svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        let _ = writeln!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}pt\" height=\"{h}pt\" viewBox=\"0 0 {w} {h}\">"
        );
        self.recording.for_each_draw(|state, op| {
            write_draw_op(&self.recording, &mut svg, op, state);
        });
        svg.push_str("</svg>\n");
        svg
    }
}

impl ResourceBackend for SvgBackend {
    fn create_path(&mut self, desc: PathDesc) -> PathId {
        self.recording.create_path(desc)
    }

    fn destroy_path(&mut self, id: PathId) {
        self.recording.destroy_path(id);
    }

    fn create_paint(&mut self, desc: PaintDesc) -> PaintId {
        self.recording.create_paint(desc)
    }

    fn destroy_paint(&mut self, id: PaintId) {
        self.recording.destroy_paint(id);
    }
}

impl ImagingBackend for SvgBackend {
    fn state(&mut self, op: StateOp) {
        self.recording.state(op);
    }

    fn draw(&mut self, op: DrawOp) {
        self.recording.draw(op);
    }
}

fn write_draw_op(recording: &RecordingBackend, out: &mut String, op: &DrawOp, state: &DrawState) {
    let attrs = svg_transform_attr(state.transform);
    match op {
        DrawOp::FillRect { x0, y0, x1, y1 } | DrawOp::StrokeRect { x0, y0, x1, y1 } => {
            let kind = if matches!(op, DrawOp::FillRect { .. }) {
                PaintKind::Fill
            } else {
                PaintKind::Stroke
            };
            let style = style_for_paint(recording, state, kind);
            let _ = writeln!(
                out,
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"{attrs}{style}/>",
                fmt_f32(*x0),
                fmt_f32(*y0),
                fmt_f32(x1 - x0),
                fmt_f32(y1 - y0),
            );
        }
        DrawOp::FillPath(path_id) => {
            if let Some(path) = recording.path(*path_id) {
                let d = path_to_svg_d(path);
                let style = style_for_paint(recording, state, PaintKind::Fill);
                let _ = writeln!(out, "<path d=\"{d}\"{attrs}{style}/>");
            }
        }
        DrawOp::StrokePath(path_id) => {
            if let Some(path) = recording.path(*path_id) {
                let d = path_to_svg_d(path);
                let style = style_for_paint(recording, state, PaintKind::Stroke);
                let _ = writeln!(out, "<path d=\"{d}\"{attrs}{style}/>");
            }
        }
        DrawOp::Text {
            x,
            y,
            size,
            anchor,
            text,
        } => {
            let (rgb, a) = color_to_svg(recording.solid_color(state).unwrap_or(Color::BLACK));
            let mut style = format!(" fill=\"{rgb}\"");
            if a < 1.0 {
                let _ = write!(style, " fill-opacity=\"{}\"", fmt_f32(a));
            }
            let _ = writeln!(
                out,
                "<text x=\"{}\" y=\"{}\" font-family=\"sans-serif\" font-size=\"{}\" text-anchor=\"{}\"{attrs}{style}>{}</text>",
                fmt_f32(*x),
                fmt_f32(*y),
                fmt_f32(*size),
                text_anchor_svg(*anchor),
                escape_xml(text),
            );
        }
    }
}

fn svg_transform_attr(transform: Affine) -> String {
    let mut attrs = String::new();
    if transform != Affine::IDENTITY {
        let _ = write!(attrs, " transform=\"{}\"", affine_to_svg_matrix(transform));
    }
    attrs
}

fn text_anchor_svg(anchor: TextAnchor) -> &'static str {
    match anchor {
        TextAnchor::Start => "start",
        TextAnchor::Middle => "middle",
        TextAnchor::End => "end",
    }
}

#[derive(Copy, Clone)]
enum PaintKind {
    Fill,
    Stroke,
}

fn style_for_paint(recording: &RecordingBackend, state: &DrawState, kind: PaintKind) -> String {
    let mut out = String::new();
    let (rgb, a) = color_to_svg(recording.solid_color(state).unwrap_or(Color::BLACK));
    match kind {
        PaintKind::Fill => {
            let _ = write!(out, " fill=\"{rgb}\" stroke=\"none\"");
            if a < 1.0 {
                let _ = write!(out, " fill-opacity=\"{}\"", fmt_f32(a));
            }
        }
        PaintKind::Stroke => {
            let stroke = &state.stroke;
            let _ = write!(out, " fill=\"none\" stroke=\"{rgb}\"");
            if a < 1.0 {
                let _ = write!(out, " stroke-opacity=\"{}\"", fmt_f32(a));
            }
            let _ = write!(out, " stroke-width=\"{}\"", fmt_f64(stroke.width));
            // SVG has a single linecap; use the start cap.
            let _ = write!(
                out,
                " stroke-linecap=\"{}\" stroke-linejoin=\"{}\"",
                stroke_cap_svg(stroke.start_cap),
                stroke_join_svg(stroke.join)
            );
        }
    }
    out
}

fn stroke_cap_svg(cap: Cap) -> &'static str {
    match cap {
        Cap::Butt => "butt",
        Cap::Round => "round",
        Cap::Square => "square",
    }
}

fn stroke_join_svg(join: Join) -> &'static str {
    match join {
        Join::Miter => "miter",
        Join::Round => "round",
        Join::Bevel => "bevel",
    }
}

fn color_to_svg(color: Color) -> (String, f32) {
    let rgba = color.to_rgba8();
    let a = f32::from(rgba.a) / 255.0;
    (format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b), a)
}

fn affine_to_svg_matrix(xf: Affine) -> String {
    let c = xf.as_coeffs();
    format!(
        "matrix({} {} {} {} {} {})",
        fmt_f64(c[0]),
        fmt_f64(c[1]),
        fmt_f64(c[2]),
        fmt_f64(c[3]),
        fmt_f64(c[4]),
        fmt_f64(c[5]),
    )
}

fn path_to_svg_d(path: &PathDesc) -> String {
    let mut d = String::new();
    for cmd in path.commands.iter() {
        match *cmd {
            PathCmd::MoveTo { x, y } => {
                let _ = write!(d, "M{} {}", fmt_f32(x), fmt_f32(y));
            }
            PathCmd::LineTo { x, y } => {
                let _ = write!(d, "L{} {}", fmt_f32(x), fmt_f32(y));
            }
            PathCmd::Close => d.push('Z'),
        }
    }
    d
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "SVG uses f32-like scalar formatting"
)]
fn fmt_f64(v: f64) -> String {
    fmt_f32(v as f32)
}

fn fmt_f32(v: f32) -> String {
    if v.is_finite() {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "best-effort pretty formatting"
        )]
        let i = v as i32;
        let diff = (i as f32) - v;
        if diff > -1e-6 && diff < 1e-6 {
            return format!("{i}");
        }
    } else {
        return format!("{v}");
    }

    let mut s = format!("{v:.3}");
    while s.contains('.') && s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    s
}
