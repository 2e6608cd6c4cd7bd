// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use kurbo::Rect;
use log::{debug, warn};
use peniko::Color;
use relief_imaging_pdf::PdfBackend;
use relief_imaging_svg::SvgBackend;
use relief_imaging_tikz::TikzBackend;
use relief_imaging_vello_cpu::{encode_png, render_to_rgba};
use relief_matrix::Matrix;
use relief_mesh::Mesh;
use relief_view3d::Camera;

use crate::bounds::union_bounds;
use crate::render::fit_to_width;
use crate::{ExportError, ExportFormat, ExportOptions, Scene};

/// Face outline width in points.
const STROKE_WIDTH: f64 = 0.5;

/// Exports `matrix` as seen by `camera` to `path`.
///
/// The format follows the file extension (see [`ExportFormat::from_path`]).
/// The display transforms in `options` are applied to a copy of the matrix.
/// The output file is created before anything is rendered; if that fails,
/// nothing is rendered.
pub fn export_to_file(
    path: &Path,
    matrix: &Matrix,
    camera: &Camera,
    options: &ExportOptions,
) -> Result<(), ExportError> {
    let format = output_format(path)?;
    let scene = prepare_scene(matrix, camera, options).ok_or(ExportError::Empty)?;
    let frame = scene.bounds().ok_or(ExportError::Empty)?;
    write_scene(path, format, &scene, frame, options)
}

/// Exports every matrix of a series to numbered files next to `path`.
///
/// All files share one frame, the union of every view, so consecutive images
/// line up. The first file uses `path` as given when its name contains a
/// number; see [`numbered_path`] for the naming. Empty matrices are skipped.
/// Returns the paths written, in order.
pub fn export_series(
    path: &Path,
    matrices: &[Matrix],
    camera: &Camera,
    options: &ExportOptions,
) -> Result<Vec<PathBuf>, ExportError> {
    let format = output_format(path)?;
    let mut scenes: Vec<Scene> = matrices
        .iter()
        .enumerate()
        .filter_map(|(i, m)| {
            let scene = prepare_scene(m, camera, options);
            if scene.is_none() {
                warn!("skipping empty matrix {i} of the series");
            }
            scene
        })
        .collect();

    let plot =
        union_bounds(scenes.iter().filter_map(Scene::plot_bounds)).ok_or(ExportError::Empty)?;
    for scene in &mut scenes {
        scene.layout_colorbar(plot);
    }
    let frame =
        union_bounds(scenes.iter().filter_map(Scene::bounds)).ok_or(ExportError::Empty)?;

    let mut written = Vec::with_capacity(scenes.len());
    for (i, scene) in scenes.iter().enumerate() {
        let target = numbered_path(path, i);
        write_scene(&target, format, scene, frame, options)?;
        written.push(target);
    }
    Ok(written)
}

/// Name of the `index`-th file of a series based on `path`.
///
/// The first run of digits in the file name is incremented by `index`,
/// keeping its zero padding: `frame007.svg` becomes `frame008.svg` for index
/// 1. Names without digits get `-N` (counting from 1) before the extension:
/// `plot.svg` becomes `plot-1.svg`, `plot-2.svg` and so on.
#[must_use]
pub fn numbered_path(path: &Path, index: usize) -> PathBuf {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return path.to_path_buf();
    };
    let new_name = increment_digit_run(name, index).unwrap_or_else(|| {
        let (stem, ext) = match name.rfind('.') {
            Some(dot) if dot > 0 => name.split_at(dot),
            _ => (name, ""),
        };
        format!("{stem}-{}{ext}", index + 1)
    });
    path.with_file_name(new_name)
}

fn increment_digit_run(name: &str, index: usize) -> Option<String> {
    let start = name.find(|c: char| c.is_ascii_digit())?;
    let len = name[start..]
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(name.len() - start);
    let digits = &name[start..start + len];
    let number: u64 = digits.parse().ok()?;
    let next = number.checked_add(u64::try_from(index).ok()?)?;
    Some(format!(
        "{}{next:0len$}{}",
        &name[..start],
        &name[start + len..]
    ))
}

fn output_format(path: &Path) -> Result<ExportFormat, ExportError> {
    ExportFormat::from_path(path).ok_or_else(|| {
        warn!("unsupported export format: {}", path.display());
        ExportError::UnsupportedFormat {
            path: path.to_path_buf(),
        }
    })
}

fn prepare_scene(matrix: &Matrix, camera: &Camera, options: &ExportOptions) -> Option<Scene> {
    let mut matrix = matrix.clone();
    matrix.apply_transforms(options.transforms);
    if matrix.is_empty() {
        return None;
    }
    let mesh = Mesh::generate(&matrix, &options.mesh_params());
    Some(Scene::build(&mesh, &camera.projector(), options))
}

fn write_scene(
    path: &Path,
    format: ExportFormat,
    scene: &Scene,
    frame: Rect,
    options: &ExportOptions,
) -> Result<(), ExportError> {
    write_file(path, |out| match format {
        ExportFormat::Png => {
            let pixels_per_point = options.dpi / 72.0;
            let width = pixel_extent(options.width * pixels_per_point);
            let (transform, size) = fit_to_width(frame, f64::from(width));
            let height = pixel_extent(size.height);
            debug!("rendering {} as {width}x{height} PNG", path.display());
            let rgba = render_to_rgba(width, height, Color::WHITE, |backend| {
                scene.draw(backend, transform, STROKE_WIDTH * pixels_per_point, false);
            });
            encode_png(out, &rgba, width.into(), height.into()).map_err(|source| {
                warn!("cannot encode {}: {source}", path.display());
                ExportError::Png {
                    path: path.to_path_buf(),
                    source,
                }
            })
        }
        ExportFormat::Svg => {
            let (transform, size) = fit_to_width(frame, options.width);
            debug!("rendering {} at {}x{} pt", path.display(), size.width, size.height);
            let mut backend = SvgBackend::default();
            scene.draw(&mut backend, transform, STROKE_WIDTH, true);
            out.write_all(backend.to_svg(size.width, size.height).as_bytes())
                .map_err(|source| io_error(path, source))
        }
        ExportFormat::Pdf => {
            let (transform, size) = fit_to_width(frame, options.width);
            debug!("rendering {} at {}x{} pt", path.display(), size.width, size.height);
            let mut backend = PdfBackend::default();
            scene.draw(&mut backend, transform, STROKE_WIDTH, true);
            out.write_all(&backend.to_pdf(size.width, size.height))
                .map_err(|source| io_error(path, source))
        }
        ExportFormat::Tikz => {
            let (transform, size) = fit_to_width(frame, options.width);
            debug!("rendering {} at {}x{} pt", path.display(), size.width, size.height);
            let mut backend = TikzBackend::default();
            scene.draw(&mut backend, transform, STROKE_WIDTH, true);
            out.write_all(
                backend
                    .to_tikz(size.width, size.height, options.standalone)
                    .as_bytes(),
            )
            .map_err(|source| io_error(path, source))
        }
    })
}

/// Creates `path` and fills it through `write`.
///
/// The file is created before `write` runs. If writing or flushing fails, the
/// partial file is removed again.
fn write_file(
    path: &Path,
    write: impl FnOnce(&mut BufWriter<File>) -> Result<(), ExportError>,
) -> Result<(), ExportError> {
    let file = File::create(path).map_err(|source| io_error(path, source))?;
    let mut out = BufWriter::new(file);
    let result = write(&mut out)
        .and_then(|()| out.flush().map_err(|source| io_error(path, source)));
    if result.is_err() {
        drop(out);
        match fs::remove_file(path) {
            Ok(()) => debug!("removed partial output {}", path.display()),
            Err(err) => warn!("cannot remove partial output {}: {err}", path.display()),
        }
    }
    result
}

fn io_error(path: &Path, source: io::Error) -> ExportError {
    warn!("cannot write {}: {source}", path.display());
    ExportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "clamped to the u16 range first"
)]
fn pixel_extent(v: f64) -> u16 {
    if v.is_finite() {
        v.round().clamp(1.0, f64::from(u16::MAX)) as u16
    } else {
        1
    }
}
