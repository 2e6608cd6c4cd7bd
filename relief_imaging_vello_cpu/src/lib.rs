// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vello CPU raster backend for the Relief imaging IR.
//!
//! [`VelloCpuImagingBackend`] draws straight into a sparse‑strips
//! [`vello_cpu::RenderContext`]. [`render_to_rgba`] wraps the usual
//! context/flush/pixmap dance and returns unpremultiplied RGBA8 rows, top row
//! first. [`encode_png`] and [`write_png`] store such a buffer as an 8‑bit
//! RGBA PNG.
//!
//! Text ops are ignored: raster output carries no labels.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use kurbo::{Affine, Cap, Join};
use peniko::{Brush, Color};
use png::{BitDepth, ColorType, Encoder, EncodingError};
use relief_imaging::{
    DrawOp, ImagingBackend, PaintDesc, PaintId, PathCmd, PathDesc, PathId, ResourceBackend,
    StateOp,
};
use vello_cpu::kurbo::{
    Affine as CpuAffine, BezPath, Cap as CpuCap, Join as CpuJoin, Rect, Stroke,
};
use vello_cpu::{Pixmap, RenderContext};

/// CPU-backed implementation of the imaging backend using `vello_cpu`.
pub struct VelloCpuImagingBackend<'ctx> {
    /// Underlying Vello CPU render context to draw into.
    pub ctx: &'ctx mut RenderContext,
    paths: Vec<Option<BezPath>>,
    paints: Vec<Option<PaintDesc>>,
    current_paint: Option<PaintId>,
}

impl fmt::Debug for VelloCpuImagingBackend<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VelloCpuImagingBackend")
            .field("paths", &self.paths.len())
            .field("paints", &self.paints.len())
            .field("current_paint", &self.current_paint)
            .finish_non_exhaustive()
    }
}

impl<'ctx> VelloCpuImagingBackend<'ctx> {
    /// Create a new backend that renders into the given CPU render context.
    pub fn new(ctx: &'ctx mut RenderContext) -> Self {
        Self {
            ctx,
            paths: Vec::new(),
            paints: Vec::new(),
            current_paint: None,
        }
    }

    fn path(&self, id: PathId) -> Option<&BezPath> {
        self.paths.get(id.0 as usize)?.as_ref()
    }

    fn affine_to_cpu(xf: Affine) -> CpuAffine {
        CpuAffine::new(xf.as_coeffs())
    }

    fn apply_current_paint(&mut self) {
        let Some(id) = self.current_paint else {
            return;
        };
        if let Some(Some(PaintDesc { brush })) = self.paints.get(id.0 as usize) {
            match brush {
                Brush::Solid(color) => self.ctx.set_paint(*color),
                Brush::Gradient(gradient) => self.ctx.set_paint(gradient.clone()),
                // Image brushes never come out of the exporter.
                Brush::Image(_) => {}
            }
        }
    }
}

fn next_id(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

impl ResourceBackend for VelloCpuImagingBackend<'_> {
    fn create_path(&mut self, desc: PathDesc) -> PathId {
        let mut p = BezPath::new();
        for cmd in desc.commands.iter() {
            match *cmd {
                PathCmd::MoveTo { x, y } => p.move_to((f64::from(x), f64::from(y))),
                PathCmd::LineTo { x, y } => p.line_to((f64::from(x), f64::from(y))),
                PathCmd::Close => p.close_path(),
            }
        }
        let id = next_id(self.paths.len());
        self.paths.push(Some(p));
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

impl ImagingBackend for VelloCpuImagingBackend<'_> {
    fn state(&mut self, op: StateOp) {
        match op {
            StateOp::SetTransform(xf) => {
                self.ctx.set_transform(Self::affine_to_cpu(xf));
            }
            StateOp::SetPaint(id) => {
                self.current_paint = Some(id);
                self.apply_current_paint();
            }
            StateOp::SetStroke(style) => {
                let mut stroke = Stroke::new(style.width);
                stroke.miter_limit = style.miter_limit;
                stroke.join = match style.join {
                    Join::Bevel => CpuJoin::Bevel,
                    Join::Miter => CpuJoin::Miter,
                    Join::Round => CpuJoin::Round,
                };
                stroke.start_cap = cap_to_cpu(style.start_cap);
                stroke.end_cap = cap_to_cpu(style.end_cap);
                self.ctx.set_stroke(stroke);
            }
        }
    }

    fn draw(&mut self, op: DrawOp) {
        match op {
            DrawOp::FillPath(id) => {
                if let Some(path) = self.path(id).cloned() {
                    self.ctx.fill_path(&path);
                }
            }
            DrawOp::StrokePath(id) => {
                if let Some(path) = self.path(id).cloned() {
                    self.ctx.stroke_path(&path);
                }
            }
            DrawOp::FillRect { x0, y0, x1, y1 } => {
                let rect = Rect::new(x0.into(), y0.into(), x1.into(), y1.into());
                self.ctx.fill_rect(&rect);
            }
            DrawOp::StrokeRect { x0, y0, x1, y1 } => {
                let rect = Rect::new(x0.into(), y0.into(), x1.into(), y1.into());
                self.ctx.stroke_rect(&rect);
            }
            DrawOp::Text { .. } => {}
        }
    }
}

fn cap_to_cpu(cap: Cap) -> CpuCap {
    match cap {
        Cap::Butt => CpuCap::Butt,
        Cap::Round => CpuCap::Round,
        Cap::Square => CpuCap::Square,
    }
}

/// Renders a `width` x `height` image and returns its unpremultiplied RGBA8
/// bytes, top row first.
///
/// The canvas is cleared to `background` before `build` draws into it.
pub fn render_to_rgba(
    width: u16,
    height: u16,
    background: Color,
    build: impl FnOnce(&mut VelloCpuImagingBackend<'_>),
) -> Vec<u8> {
    let mut ctx = RenderContext::new(width, height);
    ctx.reset();
    ctx.set_paint(background);
    ctx.fill_rect(&Rect::new(0.0, 0.0, width.into(), height.into()));
    {
        let mut backend = VelloCpuImagingBackend::new(&mut ctx);
        build(&mut backend);
    }

    let mut pixmap = Pixmap::new(width, height);
    ctx.flush();
    ctx.render_to_pixmap(&mut pixmap);

    let unpremul = pixmap.take_unpremultiplied();
    let mut bytes = Vec::with_capacity(unpremul.len() * 4);
    for p in unpremul {
        bytes.extend_from_slice(&[p.r, p.g, p.b, p.a]);
    }
    bytes
}

/// Encodes RGBA8 rows (top row first) as an 8-bit RGBA PNG into `out`.
pub fn encode_png(
    out: impl Write,
    rgba: &[u8],
    width: u32,
    height: u32,
) -> Result<(), EncodingError> {
    let mut encoder = Encoder::new(out, width, height);
    encoder.set_color(ColorType::Rgba);
    encoder.set_depth(BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(rgba)?;
    writer.finish()
}

/// Writes RGBA8 rows (top row first) to `path` as a PNG.
pub fn write_png(path: &Path, rgba: &[u8], width: u32, height: u32) -> Result<(), EncodingError> {
    let mut out = BufWriter::new(File::create(path)?);
    encode_png(&mut out, rgba, width, height)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    fn pixel(rgba: &[u8], width: usize, x: usize, y: usize) -> [u8; 4] {
        let i = (y * width + x) * 4;
        [rgba[i], rgba[i + 1], rgba[i + 2], rgba[i + 3]]
    }

    #[test]
    fn background_fills_the_canvas() {
        let rgba = render_to_rgba(4, 3, Color::WHITE, |_| {});
        assert_eq!(rgba.len(), 4 * 3 * 4);
        assert!(rgba.iter().all(|b| *b == 255));
    }

    #[test]
    fn rows_are_top_first() {
        let rgba = render_to_rgba(8, 8, Color::WHITE, |backend| {
            let red = backend.create_paint(PaintDesc::solid(Color::from_rgba8(255, 0, 0, 255)));
            backend.state(StateOp::SetPaint(red));
            backend.draw(DrawOp::FillRect {
                x0: 0.0,
                y0: 0.0,
                x1: 8.0,
                y1: 4.0,
            });
            let path = backend.create_path(PathDesc::polygon(&[
                Point::new(0.0, 4.0),
                Point::new(8.0, 4.0),
                Point::new(8.0, 8.0),
                Point::new(0.0, 8.0),
            ]));
            let blue = backend.create_paint(PaintDesc::solid(Color::from_rgba8(0, 0, 255, 255)));
            backend.state(StateOp::SetPaint(blue));
            backend.draw(DrawOp::FillPath(path));
        });
        assert_eq!(pixel(&rgba, 8, 3, 1), [255, 0, 0, 255]);
        assert_eq!(pixel(&rgba, 8, 3, 6), [0, 0, 255, 255]);
    }

    #[test]
    fn destroyed_paths_draw_nothing() {
        let rgba = render_to_rgba(4, 4, Color::WHITE, |backend| {
            let path = backend.create_path(PathDesc::polygon(&[
                Point::new(0.0, 0.0),
                Point::new(4.0, 0.0),
                Point::new(4.0, 4.0),
            ]));
            let black = backend.create_paint(PaintDesc::solid(Color::BLACK));
            backend.state(StateOp::SetPaint(black));
            backend.destroy_path(path);
            backend.draw(DrawOp::FillPath(path));
        });
        assert!(rgba.iter().all(|b| *b == 255));
    }

    #[test]
    fn png_has_signature() {
        let path = std::env::temp_dir().join("relief_imaging_vello_cpu_signature.png");
        let rgba = render_to_rgba(2, 2, Color::WHITE, |_| {});
        write_png(&path, &rgba, 2, 2).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
