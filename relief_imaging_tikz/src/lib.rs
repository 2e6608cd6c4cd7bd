// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! TikZ backend for the Relief imaging IR.
//!
//! [`TikzBackend`] records imaging ops and serializes them with
//! [`TikzBackend::to_tikz`] as a `tikzpicture` in point units with the y axis
//! pointing down, so IR coordinates are written unchanged.
//!
//! Colours are declared once each with `\definecolor` and referenced by name.
//! A fill immediately followed by a stroke of the same path is merged into one
//! `\filldraw`, which is how quads with outlines come out of the exporter.

#![no_std]

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write as _;
use hashbrown::HashMap;
use kurbo::{Cap, Join};
use peniko::Color;
use relief_imaging::{
    Affine, DrawOp, DrawState, ImagingBackend, ImagingOp, PaintDesc, PaintId, PathCmd,
    PathDesc, PathId, RecordingBackend, ResourceBackend, StateOp, TextAnchor,
};

/// A recording TikZ backend.
#[derive(Clone, Default, Debug)]
pub struct TikzBackend {
    recording: RecordingBackend,
}

impl TikzBackend {
    /// Returns the recorded imaging ops.
    pub fn ops(&self) -> &[ImagingOp] {
        self.recording.ops()
    }

    /// Export the recorded ops as TikZ source.
    ///
    /// The picture is clipped to `width` x `height` points. With `standalone`
    /// set the picture is wrapped in a `standalone` document that compiles on
    /// its own; otherwise the output is meant to be `\input` into a document
    /// that loads `tikz`.
    pub fn to_tikz(&self, width: f64, height: f64, standalone: bool) -> String {
        let mut draws = Vec::new();
        self.recording
            .for_each_draw(|state, op| draws.push((state.clone(), op.clone())));

        let mut colors = ColorTable::default();
        let mut body = String::new();
        let mut i = 0;
        while i < draws.len() {
            let (state, op) = &draws[i];
            let merged = match (op, draws.get(i + 1)) {
                (DrawOp::FillPath(fill), Some((next_state, DrawOp::StrokePath(stroke))))
                    if fill == stroke && next_state.transform == state.transform =>
                {
                    self.write_filldraw(&mut body, &mut colors, *fill, state, next_state);
                    true
                }
                _ => false,
            };
            if merged {
                i += 2;
            } else {
                self.write_draw_op(&mut body, &mut colors, op, state);
                i += 1;
            }
        }

        let mut out = String::new();
        if standalone {
            out.push_str("\\documentclass{standalone}\n\\usepackage{tikz}\n\\begin{document}\n");
        }
        for (name, rgb) in colors.definitions() {
            let [r, g, b] = rgb.map(|c| fmt_f32(f32::from(c) / 255.0));
            let _ = writeln!(out, "\\definecolor{{{name}}}{{rgb}}{{{r},{g},{b}}}");
        }
        out.push_str("\\begin{tikzpicture}[x=1pt, y=-1pt]\n");
        let _ = writeln!(
            out,
            "\\clip (0,0) rectangle ({},{});",
            fmt_f64(width),
            fmt_f64(height)
        );
        out.push_str(&body);
        out.push_str("\\end{tikzpicture}\n");
        if standalone {
            out.push_str("\\end{document}\n");
        }
        out
    }

    fn write_filldraw(
        &self,
        out: &mut String,
        colors: &mut ColorTable,
        id: PathId,
        fill_state: &DrawState,
        stroke_state: &DrawState,
    ) {
        let Some(path) = self.recording.path(id) else {
            return;
        };
        let fill = self.color(fill_state);
        let draw = self.color(stroke_state);
        let mut options = String::new();
        let _ = write!(options, "fill={}", colors.name(fill));
        push_opacity(&mut options, "fill opacity", fill);
        let _ = write!(options, ", draw={}", colors.name(draw));
        push_opacity(&mut options, "draw opacity", draw);
        push_stroke_options(&mut options, stroke_state);
        let scoped = open_scope(out, &fill_state.transform);
        let _ = writeln!(out, "\\filldraw[{options}] {};", path_to_tikz(path));
        close_scope(out, scoped);
    }

    fn write_draw_op(&self, out: &mut String, colors: &mut ColorTable, op: &DrawOp, state: &DrawState) {
        let color = self.color(state);
        let name = colors.name(color);
        let scoped = open_scope(out, &state.transform);
        match op {
            DrawOp::FillPath(id) => {
                if let Some(path) = self.recording.path(*id) {
                    let mut options = String::from(name);
                    push_opacity(&mut options, "fill opacity", color);
                    let _ = writeln!(out, "\\fill[{options}] {};", path_to_tikz(path));
                }
            }
            DrawOp::StrokePath(id) => {
                if let Some(path) = self.recording.path(*id) {
                    let mut options = String::from(name);
                    push_opacity(&mut options, "draw opacity", color);
                    push_stroke_options(&mut options, state);
                    let _ = writeln!(out, "\\draw[{options}] {};", path_to_tikz(path));
                }
            }
            DrawOp::FillRect { x0, y0, x1, y1 } => {
                let mut options = String::from(name);
                push_opacity(&mut options, "fill opacity", color);
                let _ = writeln!(
                    out,
                    "\\fill[{options}] ({},{}) rectangle ({},{});",
                    fmt_f32(*x0),
                    fmt_f32(*y0),
                    fmt_f32(*x1),
                    fmt_f32(*y1)
                );
            }
            DrawOp::StrokeRect { x0, y0, x1, y1 } => {
                let mut options = String::from(name);
                push_opacity(&mut options, "draw opacity", color);
                push_stroke_options(&mut options, state);
                let _ = writeln!(
                    out,
                    "\\draw[{options}] ({},{}) rectangle ({},{});",
                    fmt_f32(*x0),
                    fmt_f32(*y0),
                    fmt_f32(*x1),
                    fmt_f32(*y1)
                );
            }
            DrawOp::Text {
                x,
                y,
                size,
                anchor,
                text,
            } => {
                let anchor = match anchor {
                    TextAnchor::Start => "base west",
                    TextAnchor::Middle => "base",
                    TextAnchor::End => "base east",
                };
                let _ = writeln!(
                    out,
                    "\\node[anchor={anchor}, inner sep=0pt, text={name}, font=\\fontsize{{{}pt}}{{{}pt}}\\selectfont] at ({},{}) {{{}}};",
                    fmt_f32(*size),
                    fmt_f32(size * 1.2),
                    fmt_f32(*x),
                    fmt_f32(*y),
                    escape_tex(text)
                );
            }
        }
        close_scope(out, scoped);
    }

    fn color(&self, state: &DrawState) -> Color {
        self.recording.solid_color(state).unwrap_or(Color::BLACK)
    }
}

impl ResourceBackend for TikzBackend {
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

impl ImagingBackend for TikzBackend {
    fn state(&mut self, op: StateOp) {
        self.recording.state(op);
    }

    fn draw(&mut self, op: DrawOp) {
        self.recording.draw(op);
    }
}

/// Named colour definitions in first‑use order.
#[derive(Default)]
struct ColorTable {
    names: HashMap<[u8; 3], usize>,
    order: Vec<[u8; 3]>,
    scratch: String,
}

impl ColorTable {
    fn name(&mut self, color: Color) -> &str {
        let rgba = color.to_rgba8();
        let rgb = [rgba.r, rgba.g, rgba.b];
        let index = *self.names.entry(rgb).or_insert_with(|| {
            self.order.push(rgb);
            self.order.len() - 1
        });
        self.scratch.clear();
        let _ = write!(self.scratch, "c{index}");
        &self.scratch
    }

    fn definitions(&self) -> impl Iterator<Item = (String, [u8; 3])> + '_ {
        self.order.iter().enumerate().map(|(i, rgb)| {
            let mut name = String::new();
            let _ = write!(name, "c{i}");
            (name, *rgb)
        })
    }
}

fn open_scope(out: &mut String, transform: &Affine) -> bool {
    if *transform == Affine::IDENTITY {
        return false;
    }
    let c = transform.as_coeffs();
    let _ = writeln!(
        out,
        "\\begin{{scope}}[cm={{{},{},{},{},({},{})}}]",
        fmt_f64(c[0]),
        fmt_f64(c[1]),
        fmt_f64(c[2]),
        fmt_f64(c[3]),
        fmt_f64(c[4]),
        fmt_f64(c[5])
    );
    true
}

fn close_scope(out: &mut String, scoped: bool) {
    if scoped {
        out.push_str("\\end{scope}\n");
    }
}

fn push_opacity(options: &mut String, key: &str, color: Color) {
    let a = color.to_rgba8().a;
    if a < 255 {
        let _ = write!(options, ", {key}={}", fmt_f32(f32::from(a) / 255.0));
    }
}

fn push_stroke_options(options: &mut String, state: &DrawState) {
    let stroke = &state.stroke;
    let _ = write!(options, ", line width={}pt", fmt_f64(stroke.width));
    options.push_str(match stroke.join {
        Join::Miter => ", line join=miter",
        Join::Round => ", line join=round",
        Join::Bevel => ", line join=bevel",
    });
    options.push_str(match stroke.start_cap {
        Cap::Butt => ", line cap=butt",
        Cap::Round => ", line cap=round",
        Cap::Square => ", line cap=rect",
    });
}

fn path_to_tikz(path: &PathDesc) -> String {
    let mut out = String::new();
    for cmd in path.commands.iter() {
        match *cmd {
            PathCmd::MoveTo { x, y } => {
                if !out.is_empty() {
                    out.push(' ');
                }
                let _ = write!(out, "({},{})", fmt_f32(x), fmt_f32(y));
            }
            PathCmd::LineTo { x, y } => {
                let _ = write!(out, " -- ({},{})", fmt_f32(x), fmt_f32(y));
            }
            PathCmd::Close => out.push_str(" -- cycle"),
        }
    }
    out
}

fn escape_tex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\textbackslash{}"),
            '#' | '$' | '%' | '&' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(ch);
            }
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            _ => out.push(ch),
        }
    }
    out
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "TikZ coordinates are written with three decimals"
)]
fn fmt_f64(v: f64) -> String {
    fmt_f32(v as f32)
}

fn fmt_f32(v: f32) -> String {
    if !v.is_finite() {
        return String::from("0");
    }
    let mut s = String::new();
    let _ = write!(s, "{v:.3}");
    while s.contains('.') && s.ends_with('0') {
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

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::sync::Arc;
    use kurbo::Point;
    use relief_imaging::StrokeStyle;

    fn quad(backend: &mut TikzBackend) -> PathId {
        backend.create_path(PathDesc::polygon(&[
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 2.5),
            Point::new(0.0, 2.5),
        ]))
    }

    #[test]
    fn fill_then_stroke_becomes_filldraw() {
        let mut backend = TikzBackend::default();
        let path = quad(&mut backend);
        let red = backend.create_paint(PaintDesc::solid(Color::from_rgba8(255, 0, 0, 255)));
        let black = backend.create_paint(PaintDesc::solid(Color::from_rgba8(0, 0, 0, 255)));
        backend.state(StateOp::SetPaint(red));
        backend.draw(DrawOp::FillPath(path));
        backend.state(StateOp::SetPaint(black));
        backend.state(StateOp::SetStroke(StrokeStyle::new(0.5)));
        backend.draw(DrawOp::StrokePath(path));

        let tikz = backend.to_tikz(100.0, 50.0, false);
        assert!(tikz.contains("\\definecolor{c0}{rgb}{1,0,0}"));
        assert!(tikz.contains("\\definecolor{c1}{rgb}{0,0,0}"));
        assert!(tikz.contains(
            "\\filldraw[fill=c0, draw=c1, line width=0.5pt, line join=round, line cap=round] (0,0) -- (4,0) -- (4,2.5) -- (0,2.5) -- cycle;"
        ));
        assert!(tikz.contains("\\clip (0,0) rectangle (100,50);"));
        assert!(!tikz.contains("\\documentclass"));
    }

    #[test]
    fn colours_are_defined_once() {
        let mut backend = TikzBackend::default();
        let path = quad(&mut backend);
        let blue = backend.create_paint(PaintDesc::solid(Color::from_rgba8(0, 0, 255, 255)));
        let translucent = backend.create_paint(PaintDesc::solid(Color::from_rgba8(0, 0, 255, 128)));
        backend.state(StateOp::SetPaint(blue));
        backend.draw(DrawOp::FillPath(path));
        backend.draw(DrawOp::FillPath(path));
        backend.state(StateOp::SetPaint(translucent));
        backend.draw(DrawOp::FillPath(path));

        let tikz = backend.to_tikz(10.0, 10.0, false);
        assert_eq!(tikz.matches("\\definecolor").count(), 1);
        assert_eq!(tikz.matches("\\fill[c0]").count(), 2);
        assert!(tikz.contains("\\fill[c0, fill opacity=0.502]"));
    }

    #[test]
    fn standalone_wraps_a_document() {
        let mut backend = TikzBackend::default();
        backend.draw(DrawOp::Text {
            x: 5.0,
            y: 8.0,
            size: 10.0,
            anchor: TextAnchor::Middle,
            text: Arc::from("50%"),
        });
        let tikz = backend.to_tikz(10.0, 10.0, true);
        assert!(tikz.starts_with("\\documentclass{standalone}\n"));
        assert!(tikz.ends_with("\\end{tikzpicture}\n\\end{document}\n"));
        assert!(tikz.contains("anchor=base, "));
        assert!(tikz.contains("at (5,8) {50\\%};"));
    }

    #[test]
    fn transforms_open_a_scope() {
        let mut backend = TikzBackend::default();
        backend.state(StateOp::SetTransform(Affine::translate((3.0, 4.0))));
        backend.draw(DrawOp::FillRect {
            x0: 0.0,
            y0: 0.0,
            x1: 1.0,
            y1: 1.0,
        });
        let tikz = backend.to_tikz(10.0, 10.0, false);
        assert!(tikz.contains("\\begin{scope}[cm={1,0,0,1,(3,4)}]\n\\fill[c0] (0,0) rectangle (1,1);\n\\end{scope}\n"));
    }
}
