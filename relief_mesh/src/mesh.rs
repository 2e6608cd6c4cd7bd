// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use log::debug;
use relief_matrix::Matrix;
use relief_view3d::Vec3;

use crate::{ColorPalette, Face, FacePlane};

/// Inputs to mesh generation besides the matrix itself.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshParams {
    /// Opacity applied to every face, in `[0, 1]`.
    pub alpha: f64,
    /// Walls whose z bounds are both within this distance of 0, or whose height
    /// is within it, are dropped.
    pub z_epsilon: f64,
    /// Palette used to colour faces.
    pub palette: ColorPalette,
}

impl Default for MeshParams {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            z_epsilon: 1e-9,
            palette: ColorPalette::Standard,
        }
    }
}

/// Face list derived from a [`Matrix`].
///
/// The first `rows * columns` faces are the top faces in row‑major cell
/// order; the walls follow, row scan first, then column scan.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    faces: Vec<Face>,
    top_faces: usize,
    value_range: Option<(f64, f64)>,
    z_range: (f64, f64),
    z_scale: f64,
    params: MeshParams,
}

impl Mesh {
    /// Builds the mesh for `matrix`.
    ///
    /// Heights are scaled by `1 / (max - min)` so the tallest span is one unit;
    /// a constant or empty matrix uses a scale of `1`.
    #[must_use]
    pub fn generate(matrix: &Matrix, params: &MeshParams) -> Self {
        let value_range = matrix.value_range();
        let z_scale = match value_range {
            Some((min, max)) if max > min => 1.0 / (max - min),
            _ => 1.0,
        };
        let (min, max) = value_range.unwrap_or((0.0, 0.0));
        let mut mesh = Self {
            faces: Vec::with_capacity(
                3 * matrix.values().len() + 2 * (matrix.rows() + matrix.columns()),
            ),
            top_faces: 0,
            value_range,
            z_range: (min * z_scale, max * z_scale),
            z_scale,
            params: *params,
        };
        if matrix.is_empty() {
            return mesh;
        }

        mesh.push_top_faces(matrix);
        mesh.top_faces = mesh.faces.len();
        mesh.push_row_walls(matrix);
        mesh.push_column_walls(matrix);

        debug!(
            "generated {} faces ({} top) for a {}x{} matrix",
            mesh.faces.len(),
            mesh.top_faces,
            matrix.rows(),
            matrix.columns()
        );
        mesh
    }

    /// All faces.
    #[must_use]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// One face per cell, in row‑major order.
    #[must_use]
    pub fn top_faces(&self) -> &[Face] {
        &self.faces[..self.top_faces]
    }

    /// Silhouette walls.
    #[must_use]
    pub fn side_faces(&self) -> &[Face] {
        &self.faces[self.top_faces..]
    }

    /// Number of faces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// Returns `true` if the mesh has no faces.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Smallest and largest cell value of the source matrix.
    #[must_use]
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.value_range
    }

    /// Value range after z‑scaling.
    #[must_use]
    pub fn z_range(&self) -> (f64, f64) {
        self.z_range
    }

    /// Factor applied to cell values to obtain heights.
    #[must_use]
    pub fn z_scale(&self) -> f64 {
        self.z_scale
    }

    /// Parameters the mesh was generated with.
    #[must_use]
    pub fn params(&self) -> &MeshParams {
        &self.params
    }

    /// Retracts the most recently appended face.
    pub fn remove_last_face(&mut self) -> Option<Face> {
        let face = self.faces.pop()?;
        self.top_faces = self.top_faces.min(self.faces.len());
        Some(face)
    }

    fn push_face(
        &mut self,
        plane: FacePlane,
        origin: Vec3,
        d1: f64,
        d2: f64,
        z: f64,
        cell: Option<(usize, usize)>,
    ) {
        let hue = z - self.z_range.0;
        self.faces.push(Face {
            vertices: Face::axis_aligned(plane, origin, d1, d2),
            color: self.params.palette.color(hue, self.params.alpha),
            hue,
            plane,
            cell,
        });
    }

    /// Appends a wall between heights `z0` and `z1`, coloured by `color_z`,
    /// and retracts it again if it would be invisible.
    fn push_wall(
        &mut self,
        plane: FacePlane,
        at: (f64, f64),
        extent: f64,
        z0: f64,
        z1: f64,
        color_z: f64,
    ) {
        let origin = Vec3::new(at.0, at.1, z0);
        self.push_face(plane, origin, extent, z1 - z0, color_z, None);
        let eps = self.params.z_epsilon;
        if (z0.abs() <= eps && z1.abs() <= eps) || (z1 - z0).abs() <= eps {
            self.remove_last_face();
        }
    }

    fn push_top_faces(&mut self, matrix: &Matrix) {
        let (dx, dy) = cell_size(matrix);
        for cell in matrix.iter() {
            let z = cell.value * self.z_scale;
            let x = cell.column as f64 * dx - 0.5;
            let y = 0.5 - cell.row as f64 * dy - dy;
            let origin = Vec3::new(x, y, z);
            self.push_face(FacePlane::XY, origin, dx, dy, z, Some((cell.row, cell.column)));
        }
    }

    /// Walls in the YZ plane, scanning each row left to right.
    fn push_row_walls(&mut self, matrix: &Matrix) {
        let (dx, dy) = cell_size(matrix);
        for row in 0..matrix.rows() {
            let y = 0.5 - row as f64 * dy - dy;
            let heights = (0..matrix.columns()).map(|c| (c as f64 * dx - 0.5, matrix.get(row, c)));
            self.scan_walls(FacePlane::YZ, heights, |x| (x, y), dy, (0.5, y));
        }
    }

    /// Walls in the XZ plane, scanning each column top to bottom.
    fn push_column_walls(&mut self, matrix: &Matrix) {
        let (dx, dy) = cell_size(matrix);
        for column in 0..matrix.columns() {
            let x = column as f64 * dx - 0.5;
            let heights = (0..matrix.rows()).map(|r| (0.5 - r as f64 * dy, matrix.get(r, column)));
            self.scan_walls(FacePlane::XZ, heights, |y| (x, y), dx, (x, -0.5));
        }
    }

    /// Emits the walls of one scan line.
    ///
    /// `cells` yields the wall position along the scan and the cell value.
    /// The first cell gets a wall from 0, a sign change gets one wall from 0 to
    /// each neighbour, same‑signed neighbours share one wall spanning the
    /// difference, and the line is closed with a wall from 0 to the last
    /// height at `end`.
    fn scan_walls(
        &mut self,
        plane: FacePlane,
        cells: impl Iterator<Item = (f64, Option<f64>)>,
        place: impl Fn(f64) -> (f64, f64),
        extent: f64,
        end: (f64, f64),
    ) {
        let mut last: Option<f64> = None;
        for (pos, value) in cells {
            let Some(value) = value else { break };
            let zc = value * self.z_scale;
            let at = place(pos);
            match last {
                None => self.push_wall(plane, at, extent, 0.0, zc, zc),
                Some(zl) if zc * zl < 0.0 => {
                    self.push_wall(plane, at, extent, 0.0, zc, zc);
                    self.push_wall(plane, at, extent, 0.0, zl, zl);
                }
                Some(zl) => {
                    let color_z = if zc.abs() > zl.abs() { zc } else { zl };
                    self.push_wall(plane, at, extent, zl, zc, color_z);
                }
            }
            last = Some(zc);
        }
        if let Some(zl) = last {
            self.push_wall(plane, end, extent, 0.0, zl, zl);
        }
    }
}

fn cell_size(matrix: &Matrix) -> (f64, f64) {
    (1.0 / matrix.columns() as f64, 1.0 / matrix.rows() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh_of(rows: usize, columns: usize, values: &[f64]) -> Mesh {
        let m = Matrix::from_vec(rows, columns, values.to_vec()).unwrap();
        Mesh::generate(&m, &MeshParams::default())
    }

    fn extent(values: [f64; 4]) -> (f64, f64) {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (min, max)
    }

    fn count(mesh: &Mesh, plane: FacePlane) -> usize {
        mesh.side_faces().iter().filter(|f| f.plane == plane).count()
    }

    #[test]
    fn top_faces_tile_the_unit_square() {
        let values = [1.0, -2.0, 3.0, 0.5, 2.0, 2.0, 2.0, 2.0, -1.0, 0.0, 4.0, 1.0];
        let mesh = mesh_of(3, 4, &values);
        let tops = mesh.top_faces();
        assert_eq!(tops.len(), 12);

        let mut seen = std::collections::HashSet::new();
        let mut area = 0.0;
        for face in tops {
            assert_eq!(face.plane, FacePlane::XY);
            let (row, col) = face.cell.unwrap();
            assert!(seen.insert((row, col)));

            let (x0, x1) = extent(face.vertices.map(|v| v.x));
            let (y0, y1) = extent(face.vertices.map(|v| v.y));
            assert!((x0 - (col as f64 / 4.0 - 0.5)).abs() < 1e-12);
            assert!((y1 - (0.5 - row as f64 / 3.0)).abs() < 1e-12);
            assert!(x0 >= -0.5 - 1e-12 && x1 <= 0.5 + 1e-12);
            assert!(y0 >= -0.5 - 1e-12 && y1 <= 0.5 + 1e-12);
            area += (x1 - x0) * (y1 - y0);
        }
        assert!((area - 1.0).abs() < 1e-12);
    }

    #[test]
    fn single_cell_has_four_walls() {
        let mesh = mesh_of(1, 1, &[5.0]);
        assert_eq!(mesh.top_faces().len(), 1);
        assert_eq!(mesh.side_faces().len(), 4);
        assert_eq!(count(&mesh, FacePlane::YZ), 2);
        assert_eq!(count(&mesh, FacePlane::XZ), 2);
        assert_eq!(mesh.z_scale(), 1.0);
        assert_eq!(mesh.top_faces()[0].vertices[0].z, 5.0);
    }

    #[test]
    fn equal_neighbours_share_no_internal_wall() {
        let mesh = mesh_of(1, 3, &[2.0, 2.0, 2.0]);
        // Leading and closing wall only.
        assert_eq!(count(&mesh, FacePlane::YZ), 2);
        // Each one-cell column is closed on both sides.
        assert_eq!(count(&mesh, FacePlane::XZ), 6);
    }

    #[test]
    fn same_sign_step_emits_one_wall() {
        let mesh = mesh_of(1, 2, &[1.0, 3.0]);
        let walls: Vec<_> = mesh.side_faces().iter().filter(|f| f.plane == FacePlane::YZ).collect();
        assert_eq!(walls.len(), 3);
        // The step wall spans the two heights and takes the taller colour.
        let step = walls[1];
        let zs = step.vertices.map(|v| v.z);
        assert!(zs.contains(&0.5) && zs.contains(&1.5));
        assert!((step.hue - (1.5 - 0.5)).abs() < 1e-12);
    }

    #[test]
    fn sign_change_splits_at_zero() {
        let mesh = mesh_of(1, 3, &[1.0, -1.0, 1.0]);
        let walls: Vec<_> = mesh.side_faces().iter().filter(|f| f.plane == FacePlane::YZ).collect();
        // Leading, two sign changes of two walls each, closing.
        assert_eq!(walls.len(), 6);
        for wall in &walls {
            let zs = wall.vertices.map(|v| v.z);
            assert!(zs.iter().any(|&z| z == 0.0), "wall straddles z = 0: {zs:?}");
        }
    }

    #[test]
    fn flat_cells_produce_no_walls() {
        let mesh = mesh_of(2, 2, &[0.0, 0.0, 0.0, 0.0]);
        assert_eq!(mesh.top_faces().len(), 4);
        assert!(mesh.side_faces().is_empty());
    }

    #[test]
    fn walls_within_epsilon_are_dropped() {
        let m = Matrix::from_vec(1, 2, vec![1.0, 1.0 + 1e-4]).unwrap();
        let params = MeshParams {
            z_epsilon: 1e-3,
            ..MeshParams::default()
        };
        // Heights are scaled first, so this step is one unit tall and stays.
        let mesh = Mesh::generate(&m, &params);
        assert_eq!(count(&mesh, FacePlane::YZ), 3);

        let flat = Matrix::from_vec(1, 2, vec![0.5, 0.5]).unwrap();
        let mesh = Mesh::generate(&flat, &params);
        assert_eq!(count(&mesh, FacePlane::YZ), 2);
    }

    #[test]
    fn hues_span_the_unit_interval() {
        let mesh = mesh_of(2, 2, &[-3.0, 1.0, 0.0, 5.0]);
        let hues: Vec<f64> = mesh.top_faces().iter().map(|f| f.hue).collect();
        assert!((hues[0] - 0.0).abs() < 1e-12);
        assert!((hues[3] - 1.0).abs() < 1e-12);
        assert!(mesh.faces().iter().all(|f| (-1e-12..=1.0 + 1e-12).contains(&f.hue)));
        assert_eq!(mesh.value_range(), Some((-3.0, 5.0)));
    }

    #[test]
    fn alpha_and_palette_reach_face_colours() {
        let m = Matrix::from_vec(1, 2, vec![0.0, 1.0]).unwrap();
        let params = MeshParams {
            alpha: 0.25,
            palette: ColorPalette::Grayscale,
            ..MeshParams::default()
        };
        let mesh = Mesh::generate(&m, &params);
        let top = mesh.top_faces();
        assert_eq!(top[0].color.components, [0.0, 0.0, 0.0, 0.25]);
        assert_eq!(top[1].color.components, [1.0, 1.0, 1.0, 0.25]);
    }

    #[test]
    fn empty_matrix_gives_empty_mesh() {
        let mesh = Mesh::generate(&Matrix::new(), &MeshParams::default());
        assert!(mesh.is_empty());
        assert_eq!(mesh.value_range(), None);
        assert_eq!(mesh.z_scale(), 1.0);
    }

    #[test]
    fn remove_last_face_pops_in_constant_time() {
        let mut mesh = mesh_of(1, 1, &[1.0]);
        let n = mesh.len();
        let last = *mesh.faces().last().unwrap();
        assert_eq!(mesh.remove_last_face(), Some(last));
        assert_eq!(mesh.len(), n - 1);
        while mesh.remove_last_face().is_some() {}
        assert!(mesh.top_faces().is_empty());
        assert_eq!(mesh.remove_last_face(), None);
    }
}
