// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::path::Path;

use relief_matrix::MatrixTransforms;
use relief_mesh::{ColorPalette, MeshParams};

use crate::ColorbarOptions;

/// Output formats understood by the exporter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Raster image, `.png`.
    Png,
    /// Scalable vector graphics, `.svg`.
    Svg,
    /// Single page document, `.pdf`.
    Pdf,
    /// TikZ picture source, `.tex`.
    Tikz,
}

impl ExportFormat {
    /// Picks the format from the file extension, ignoring case.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png),
            "svg" => Some(Self::Svg),
            "pdf" => Some(Self::Pdf),
            "tex" => Some(Self::Tikz),
            _ => None,
        }
    }
}

/// Settings for one export.
///
/// `width` is in points (1/72 inch). Vector formats use it directly; PNG
/// output is `width * dpi / 72` pixels wide. The height always follows the
/// aspect ratio of the drawn content.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportOptions {
    /// Output width in points.
    pub width: f64,
    /// Raster resolution for PNG output.
    pub dpi: f64,
    /// Wrap TikZ output in a compilable `standalone` document.
    pub standalone: bool,
    /// Drop faces that are completely hidden behind a nearer one.
    pub hidden_face_removal: bool,
    /// Colour legend placement.
    pub colorbar: ColorbarOptions,
    /// Face and legend colours.
    pub palette: ColorPalette,
    /// Face opacity in `[0, 1]`.
    pub alpha: f64,
    /// Height tolerance below which walls are dropped.
    pub z_epsilon: f64,
    /// Display transforms applied to a copy of the matrix before meshing.
    pub transforms: MatrixTransforms,
}

impl Default for ExportOptions {
    fn default() -> Self {
        let mesh = MeshParams::default();
        Self {
            width: 500.0,
            dpi: 72.0,
            standalone: false,
            hidden_face_removal: false,
            colorbar: ColorbarOptions::default(),
            palette: mesh.palette,
            alpha: mesh.alpha,
            z_epsilon: mesh.z_epsilon,
            transforms: MatrixTransforms::empty(),
        }
    }
}

impl ExportOptions {
    /// Mesh parameters derived from these options.
    #[must_use]
    pub fn mesh_params(&self) -> MeshParams {
        MeshParams {
            alpha: self.alpha,
            z_epsilon: self.z_epsilon,
            palette: self.palette,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_follow_the_extension() {
        assert_eq!(ExportFormat::from_path(Path::new("a.png")), Some(ExportFormat::Png));
        assert_eq!(ExportFormat::from_path(Path::new("a.SVG")), Some(ExportFormat::Svg));
        assert_eq!(ExportFormat::from_path(Path::new("dir/a.pdf")), Some(ExportFormat::Pdf));
        assert_eq!(ExportFormat::from_path(Path::new("a.tex")), Some(ExportFormat::Tikz));
        assert_eq!(ExportFormat::from_path(Path::new("a.jpg")), None);
        assert_eq!(ExportFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn mesh_params_mirror_the_options() {
        let options = ExportOptions {
            alpha: 0.5,
            palette: ColorPalette::Grayscale,
            ..ExportOptions::default()
        };
        let params = options.mesh_params();
        assert_eq!(params.alpha, 0.5);
        assert_eq!(params.palette, ColorPalette::Grayscale);
        assert_eq!(params.z_epsilon, MeshParams::default().z_epsilon);
    }
}
