// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `relief`: export matrix files as 3D histograms.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use kurbo::Size;
use log::info;
use relief_export::{ColorbarOptions, ExportOptions, export_series, export_to_file};
use relief_matrix::{Document, MatrixTransforms};
use relief_mesh::ColorPalette;
use relief_view3d::{Camera, EulerAngles};

/// Viewport the camera is set up for; exports are scaled to `--width`.
const VIEW_SIZE: Size = Size::new(600.0, 600.0);

#[derive(Parser, Debug)]
#[command(
    name = "relief",
    version,
    about = "Render a numeric matrix as a 3D histogram and export it"
)]
struct Args {
    /// Matrix text file, or `-` for standard input.
    input: PathBuf,
    /// Output file; the extension picks the format (png, svg, pdf, tex).
    output: PathBuf,
    /// Export every matrix of the input to numbered files.
    #[arg(long)]
    all: bool,
    /// Index of the matrix to export when the input holds several.
    #[arg(long, default_value_t = 0)]
    index: usize,
    /// Group even rows and columns before odd ones.
    #[arg(long)]
    permute: bool,
    /// Multiply cells by (-1)^(row + column).
    #[arg(long)]
    alternate_signs: bool,
    /// Flip the checkerboard used by --alternate-signs.
    #[arg(long)]
    shift: bool,
    /// Compress magnitudes logarithmically.
    #[arg(long)]
    log_scale: bool,
    /// Replace values with their magnitude.
    #[arg(long)]
    absolute: bool,
    /// Replace values with their sign.
    #[arg(long)]
    signum: bool,
    /// Use a grayscale palette.
    #[arg(long)]
    grayscale: bool,
    /// Face opacity in [0, 1].
    #[arg(long, default_value_t = 1.0)]
    alpha: f64,
    /// Output width in points.
    #[arg(long, default_value_t = 500.0)]
    width: f64,
    /// Resolution of PNG output.
    #[arg(long, default_value_t = 72.0)]
    dpi: f64,
    /// Drop faces hidden behind a single nearer face.
    #[arg(long)]
    hidden_face_removal: bool,
    /// Wrap TikZ output in a standalone document.
    #[arg(long)]
    standalone: bool,
    /// Do not draw the colour legend.
    #[arg(long)]
    no_colorbar: bool,
    /// Legend gap as a fraction of the plot height; negative puts it left.
    #[arg(long, allow_negative_numbers = true)]
    colorbar_offset: Option<f64>,
    /// Camera azimuth in degrees.
    #[arg(long, allow_negative_numbers = true, default_value_t = Camera::DEFAULT_ANGLES.azimuth)]
    azimuth: f64,
    /// Camera elevation in degrees.
    #[arg(long, allow_negative_numbers = true, default_value_t = Camera::DEFAULT_ANGLES.elevation)]
    elevation: f64,
    /// Camera tilt in degrees.
    #[arg(long, allow_negative_numbers = true, default_value_t = Camera::DEFAULT_ANGLES.tilt)]
    tilt: f64,
    /// Zoom level, clamped to [-12, 12].
    #[arg(long, allow_negative_numbers = true, default_value_t = 0)]
    zoom: i32,
}

impl Args {
    fn transforms(&self) -> MatrixTransforms {
        let mut t = MatrixTransforms::empty();
        t.set(MatrixTransforms::PERMUTE, self.permute);
        t.set(MatrixTransforms::ALTERNATE_SIGNS, self.alternate_signs);
        t.set(MatrixTransforms::SHIFT, self.shift);
        t.set(MatrixTransforms::LOG_SCALE, self.log_scale);
        t.set(MatrixTransforms::ABSOLUTE, self.absolute);
        t.set(MatrixTransforms::SIGNUM, self.signum);
        t
    }

    fn export_options(&self) -> ExportOptions {
        let defaults = ColorbarOptions::default();
        ExportOptions {
            width: self.width,
            dpi: self.dpi,
            standalone: self.standalone,
            hidden_face_removal: self.hidden_face_removal,
            colorbar: ColorbarOptions {
                visible: !self.no_colorbar,
                offset: self.colorbar_offset.unwrap_or(defaults.offset),
                ..defaults
            },
            palette: if self.grayscale {
                ColorPalette::Grayscale
            } else {
                ColorPalette::Standard
            },
            alpha: self.alpha.clamp(0.0, 1.0),
            transforms: self.transforms(),
            ..ExportOptions::default()
        }
    }

    fn camera(&self) -> Camera {
        let mut camera = Camera::new(VIEW_SIZE);
        camera.set_angles(EulerAngles::new(self.azimuth, self.elevation, self.tilt));
        camera.set_zoom_level(self.zoom);
        camera
    }

    fn open_input(&self) -> anyhow::Result<Box<dyn BufRead>> {
        if self.input.as_os_str() == "-" {
            return Ok(Box::new(io::stdin().lock()));
        }
        let file = File::open(&self.input)
            .with_context(|| format!("cannot open {}", self.input.display()))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut document = Document::from_reader(args.open_input()?)
        .with_context(|| format!("cannot read {}", args.input.display()))?;
    if document.is_empty() {
        bail!("{} contains no matrix", args.input.display());
    }
    let options = args.export_options();
    let camera = args.camera();

    if args.all {
        let written = export_series(&args.output, document.matrices(), &camera, &options)
            .context("export failed")?;
        info!("wrote {} files", written.len());
        return Ok(());
    }

    if !document.select(args.index) {
        bail!(
            "matrix index {} is out of range, the input holds {}",
            args.index,
            document.len()
        );
    }
    let Some(matrix) = document.current() else {
        bail!("{} contains no matrix", args.input.display());
    };
    export_to_file(&args.output, matrix, &camera, &options).context("export failed")?;
    info!(
        "wrote {} ({}x{} matrix {} of {})",
        args.output.display(),
        matrix.rows(),
        matrix.columns(),
        document.current_index() + 1,
        document.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_onto_options() {
        let args = Args::try_parse_from([
            "relief",
            "in.txt",
            "out.svg",
            "--alternate-signs",
            "--shift",
            "--log-scale",
            "--grayscale",
            "--alpha",
            "2",
            "--no-colorbar",
            "--colorbar-offset",
            "-0.2",
        ])
        .unwrap();
        let options = args.export_options();
        assert_eq!(
            options.transforms,
            MatrixTransforms::ALTERNATE_SIGNS | MatrixTransforms::SHIFT | MatrixTransforms::LOG_SCALE
        );
        assert_eq!(options.palette, ColorPalette::Grayscale);
        assert_eq!(options.alpha, 1.0);
        assert!(!options.colorbar.visible);
        assert_eq!(options.colorbar.offset, -0.2);
    }

    #[test]
    fn camera_defaults_and_overrides() {
        let args = Args::try_parse_from(["relief", "in.txt", "out.png"]).unwrap();
        assert_eq!(args.camera().zoom_level(), 0);
        assert_eq!(args.export_options().width, 500.0);

        let args = Args::try_parse_from([
            "relief",
            "in.txt",
            "out.png",
            "--elevation",
            "-30",
            "--zoom",
            "40",
        ])
        .unwrap();
        assert_eq!(args.elevation, -30.0);
        assert_eq!(args.camera().zoom_level(), Camera::MAX_ZOOM_LEVEL);
    }
}
