// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! PDF backend for the Relief imaging IR.
//!
//! [`PdfBackend`] records imaging ops and serializes them with
//! [`PdfBackend::to_pdf`] as a single page PDF 1.4 document. The page
//! content flips the y axis once so IR coordinates (y down) can be written
//! unchanged. Paint opacity uses one `ExtGState` per distinct alpha value and
//! text uses the standard Helvetica font.
//!
//! Text widths for centred and end‑anchored labels are estimated from the
//! font size, since no font metrics are embedded.

#![no_std]

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write as _;
use kurbo::{Cap, Join};
use peniko::Color;
use relief_imaging::{
    Affine, DrawOp, DrawState, ImagingBackend, ImagingOp, PaintDesc, PaintId, PathCmd,
    PathDesc, PathId, RecordingBackend, ResourceBackend, StateOp, TextAnchor,
};

/// Average Helvetica advance as a fraction of the font size.
const AVERAGE_ADVANCE: f32 = 0.5;

/// A recording PDF backend.
#[derive(Clone, Default, Debug)]
pub struct PdfBackend {
    recording: RecordingBackend,
}

impl PdfBackend {
    /// Returns the recorded imaging ops.
    pub fn ops(&self) -> &[ImagingOp] {
        self.recording.ops()
    }

    /// Export the recorded ops as a one page PDF of `width` x `height` points.
    pub fn to_pdf(&self, width: f64, height: f64) -> Vec<u8> {
        let mut alphas = Vec::new();
        let mut content = String::new();
        let _ = writeln!(content, "1 0 0 -1 0 {} cm", fmt_f64(height));
        self.recording.for_each_draw(|state, op| {
            write_draw_op(&self.recording, &mut content, &mut alphas, op, state);
        });

        let mut doc = PdfWriter::default();
        doc.object("<< /Type /Catalog /Pages 2 0 R >>");
        doc.object("<< /Type /Pages /Kids [3 0 R] /Count 1 >>");

        let mut ext_g_states = String::new();
        for i in 0..alphas.len() {
            let _ = write!(ext_g_states, " /GS{i} {} 0 R", 6 + i);
        }
        doc.object(&format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] /Resources << /Font << /F1 5 0 R >> /ExtGState <<{ext_g_states} >> >> /Contents 4 0 R >>",
            fmt_f64(width),
            fmt_f64(height)
        ));
        doc.object(&format!(
            "<< /Length {} >>\nstream\n{content}endstream",
            content.len()
        ));
        doc.object("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>");
        for alpha in &alphas {
            let a = fmt_f32(f32::from(*alpha) / 255.0);
            doc.object(&format!("<< /Type /ExtGState /ca {a} /CA {a} >>"));
        }
        doc.finish()
    }
}

impl ResourceBackend for PdfBackend {
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

impl ImagingBackend for PdfBackend {
    fn state(&mut self, op: StateOp) {
        self.recording.state(op);
    }

    fn draw(&mut self, op: DrawOp) {
        self.recording.draw(op);
    }
}

/// Serializes numbered objects and the cross‑reference table.
#[derive(Default)]
struct PdfWriter {
    out: String,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn object(&mut self, body: &str) {
        if self.out.is_empty() {
            self.out.push_str("%PDF-1.4\n");
        }
        self.offsets.push(self.out.len());
        let _ = write!(self.out, "{} 0 obj\n{body}\nendobj\n", self.offsets.len());
    }

    fn finish(mut self) -> Vec<u8> {
        let xref = self.out.len();
        let _ = write!(
            self.out,
            "xref\n0 {}\n0000000000 65535 f \n",
            self.offsets.len() + 1
        );
        for offset in &self.offsets {
            let _ = write!(self.out, "{offset:010} 00000 n \n");
        }
        let _ = write!(
            self.out,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n",
            self.offsets.len() + 1
        );
        self.out.into_bytes()
    }
}

#[derive(Copy, Clone)]
enum PaintKind {
    Fill,
    Stroke,
}

fn write_draw_op(
    recording: &RecordingBackend,
    out: &mut String,
    alphas: &mut Vec<u8>,
    op: &DrawOp,
    state: &DrawState,
) {
    out.push_str("q\n");
    if state.transform != Affine::IDENTITY {
        let c = state.transform.as_coeffs();
        let _ = writeln!(
            out,
            "{} {} {} {} {} {} cm",
            fmt_f64(c[0]),
            fmt_f64(c[1]),
            fmt_f64(c[2]),
            fmt_f64(c[3]),
            fmt_f64(c[4]),
            fmt_f64(c[5])
        );
    }
    let color = recording.solid_color(state).unwrap_or(Color::BLACK);
    match op {
        DrawOp::FillPath(id) => {
            if let Some(path) = recording.path(*id) {
                write_paint(out, alphas, color, state, PaintKind::Fill);
                write_path(out, path);
                out.push_str("f\n");
            }
        }
        DrawOp::StrokePath(id) => {
            if let Some(path) = recording.path(*id) {
                write_paint(out, alphas, color, state, PaintKind::Stroke);
                write_path(out, path);
                out.push_str("S\n");
            }
        }
        DrawOp::FillRect { x0, y0, x1, y1 } => {
            write_paint(out, alphas, color, state, PaintKind::Fill);
            write_rect(out, *x0, *y0, *x1, *y1);
            out.push_str("f\n");
        }
        DrawOp::StrokeRect { x0, y0, x1, y1 } => {
            write_paint(out, alphas, color, state, PaintKind::Stroke);
            write_rect(out, *x0, *y0, *x1, *y1);
            out.push_str("S\n");
        }
        DrawOp::Text {
            x,
            y,
            size,
            anchor,
            text,
        } => {
            write_paint(out, alphas, color, state, PaintKind::Fill);
            let estimated = AVERAGE_ADVANCE * size * count_f32(text.chars().count());
            let x = match anchor {
                TextAnchor::Start => *x,
                TextAnchor::Middle => x - 0.5 * estimated,
                TextAnchor::End => x - estimated,
            };
            // Undo the page flip so glyphs stay upright.
            let _ = writeln!(
                out,
                "BT /F1 {} Tf 1 0 0 -1 {} {} Tm ({}) Tj ET",
                fmt_f32(*size),
                fmt_f32(x),
                fmt_f32(*y),
                escape_pdf_string(text)
            );
        }
    }
    out.push_str("Q\n");
}

fn write_paint(
    out: &mut String,
    alphas: &mut Vec<u8>,
    color: Color,
    state: &DrawState,
    kind: PaintKind,
) {
    let rgba = color.to_rgba8();
    let [r, g, b] = [rgba.r, rgba.g, rgba.b].map(|c| fmt_f32(f32::from(c) / 255.0));
    match kind {
        PaintKind::Fill => {
            let _ = writeln!(out, "{r} {g} {b} rg");
        }
        PaintKind::Stroke => {
            let stroke = &state.stroke;
            let _ = writeln!(out, "{r} {g} {b} RG");
            let _ = writeln!(
                out,
                "{} w {} J {} j",
                fmt_f64(stroke.width),
                cap_code(stroke.start_cap),
                join_code(stroke.join)
            );
        }
    }
    if rgba.a < 255 {
        let index = match alphas.iter().position(|a| *a == rgba.a) {
            Some(i) => i,
            None => {
                alphas.push(rgba.a);
                alphas.len() - 1
            }
        };
        let _ = writeln!(out, "/GS{index} gs");
    }
}

fn write_path(out: &mut String, path: &PathDesc) {
    for cmd in path.commands.iter() {
        match *cmd {
            PathCmd::MoveTo { x, y } => {
                let _ = writeln!(out, "{} {} m", fmt_f32(x), fmt_f32(y));
            }
            PathCmd::LineTo { x, y } => {
                let _ = writeln!(out, "{} {} l", fmt_f32(x), fmt_f32(y));
            }
            PathCmd::Close => out.push_str("h\n"),
        }
    }
}

fn write_rect(out: &mut String, x0: f32, y0: f32, x1: f32, y1: f32) {
    let _ = writeln!(
        out,
        "{} {} {} {} re",
        fmt_f32(x0),
        fmt_f32(y0),
        fmt_f32(x1 - x0),
        fmt_f32(y1 - y0)
    );
}

fn cap_code(cap: Cap) -> u8 {
    match cap {
        Cap::Butt => 0,
        Cap::Round => 1,
        Cap::Square => 2,
    }
}

fn join_code(join: Join) -> u8 {
    match join {
        Join::Miter => 0,
        Join::Round => 1,
        Join::Bevel => 2,
    }
}

/// Escapes a literal string; characters outside printable ASCII become `?`.
fn escape_pdf_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            ' '..='~' => out.push(ch),
            _ => out.push('?'),
        }
    }
    out
}

#[allow(clippy::cast_precision_loss, reason = "label lengths are tiny")]
fn count_f32(n: usize) -> f32 {
    n as f32
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "PDF numbers are written with three decimals"
)]
fn fmt_f64(v: f64) -> String {
    fmt_f32(v as f32)
}

fn fmt_f32(v: f32) -> String {
    if !v.is_finite() {
        return String::from("0");
    }
    let mut s = format!("{v:.3}");
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

    fn as_text(bytes: &[u8]) -> &str {
        core::str::from_utf8(bytes).unwrap()
    }

    #[test]
    fn transform_is_concatenated_per_draw() {
        let mut backend = PdfBackend::default();
        let path = backend.create_path(PathDesc::polygon(&[
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
        ]));
        backend.draw(DrawOp::FillPath(path));
        backend.state(StateOp::SetTransform(Affine::new([2.0, 0.0, 0.0, 2.0, 5.0, -3.0])));
        backend.draw(DrawOp::FillPath(path));

        let pdf = backend.to_pdf(10.0, 10.0);
        let text = as_text(&pdf);
        assert_eq!(text.matches(" cm\n").count(), 2, "page flip plus one draw");
        assert!(text.contains("q\n2 0 0 2 5 -3 cm\n"));
    }

    #[test]
    fn writes_a_well_formed_single_page() {
        let mut backend = PdfBackend::default();
        let paint = backend.create_paint(PaintDesc::solid(Color::from_rgba8(255, 0, 0, 255)));
        let path = backend.create_path(PathDesc::polygon(&[
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 5.5),
        ]));
        backend.state(StateOp::SetPaint(paint));
        backend.draw(DrawOp::FillPath(path));
        backend.state(StateOp::SetStroke(StrokeStyle::new(0.5)));
        backend.draw(DrawOp::StrokePath(path));

        let bytes = backend.to_pdf(200.0, 100.0);
        let pdf = as_text(&bytes);
        assert!(pdf.starts_with("%PDF-1.4\n"));
        assert!(pdf.ends_with("%%EOF\n"));
        assert!(pdf.contains("/MediaBox [0 0 200 100]"));
        assert!(pdf.contains("1 0 0 -1 0 100 cm"));
        assert!(pdf.contains("1 0 0 rg\n0 0 m\n10 0 l\n10 5.5 l\nh\nf\n"));
        assert!(pdf.contains("1 0 0 RG\n0.5 w 1 J 1 j\n"));
        assert!(pdf.contains("xref\n0 6\n"));
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let backend = PdfBackend::default();
        let bytes = backend.to_pdf(10.0, 10.0);
        let pdf = as_text(&bytes);
        let xref_at: usize = pdf
            .rsplit("startxref\n")
            .next()
            .and_then(|tail| tail.lines().next())
            .and_then(|n| n.parse().ok())
            .unwrap();
        assert!(pdf[xref_at..].starts_with("xref"));

        let table = &pdf[xref_at..];
        for (i, line) in table.lines().skip(3).take(5).enumerate() {
            let offset: usize = line[..10].parse().unwrap();
            assert!(pdf[offset..].starts_with(&format!("{} 0 obj", i + 1)));
        }
    }

    #[test]
    fn alpha_gets_a_shared_graphics_state() {
        let mut backend = PdfBackend::default();
        let half = backend.create_paint(PaintDesc::solid(Color::from_rgba8(0, 0, 255, 128)));
        backend.state(StateOp::SetPaint(half));
        for _ in 0..3 {
            backend.draw(DrawOp::FillRect {
                x0: 0.0,
                y0: 0.0,
                x1: 1.0,
                y1: 1.0,
            });
        }
        let bytes = backend.to_pdf(10.0, 10.0);
        let pdf = as_text(&bytes);
        assert_eq!(pdf.matches("/GS0 gs").count(), 3);
        assert!(pdf.contains("/ExtGState << /GS0 6 0 R >>"));
        assert!(pdf.contains("/ca 0.502 /CA 0.502"));
    }

    #[test]
    fn text_is_escaped_and_anchored() {
        let mut backend = PdfBackend::default();
        backend.draw(DrawOp::Text {
            x: 100.0,
            y: 50.0,
            size: 10.0,
            anchor: TextAnchor::End,
            text: Arc::from("(1.5)"),
        });
        let bytes = backend.to_pdf(200.0, 100.0);
        let pdf = as_text(&bytes);
        // Five characters at half the font size each.
        assert!(pdf.contains("BT /F1 10 Tf 1 0 0 -1 75 50 Tm (\\(1.5\\)) Tj ET"));
    }
}
