// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use log::debug;
use relief_matrix::Matrix;

use crate::{ColorPalette, Mesh, MeshParams};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct MeshKey {
    revision: u64,
    alpha: u64,
    z_epsilon: u64,
    palette: ColorPalette,
}

impl MeshKey {
    fn new(matrix: &Matrix, params: &MeshParams) -> Self {
        Self {
            revision: matrix.revision(),
            alpha: params.alpha.to_bits(),
            z_epsilon: params.z_epsilon.to_bits(),
            palette: params.palette,
        }
    }
}

/// Memoized [`Mesh`] for one matrix at a time.
///
/// The mesh is rebuilt when the matrix revision or any [`MeshParams`] field
/// differs from the last build, and reused otherwise.
#[derive(Clone, Debug, Default)]
pub struct MeshCache {
    entry: Option<(MeshKey, Mesh)>,
    builds: u64,
}

impl MeshCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the mesh for `matrix` and `params`, rebuilding it if stale.
    pub fn get(&mut self, matrix: &Matrix, params: &MeshParams) -> &Mesh {
        let key = MeshKey::new(matrix, params);
        if self.entry.as_ref().is_none_or(|(k, _)| *k != key) {
            debug!("rebuilding mesh for matrix revision {}", key.revision);
            self.builds += 1;
            self.entry = None;
        }
        let (_, mesh) = self
            .entry
            .get_or_insert_with(|| (key, Mesh::generate(matrix, params)));
        mesh
    }

    /// Returns `true` if a [`MeshCache::get`] with these inputs would reuse the
    /// cached mesh.
    #[must_use]
    pub fn is_fresh(&self, matrix: &Matrix, params: &MeshParams) -> bool {
        self.entry
            .as_ref()
            .is_some_and(|(k, _)| *k == MeshKey::new(matrix, params))
    }

    /// Drops the cached mesh.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Number of meshes built so far.
    #[must_use]
    pub fn builds(&self) -> u64 {
        self.builds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn reuses_until_matrix_changes() {
        let mut m = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let params = MeshParams::default();
        let mut cache = MeshCache::new();

        let n = cache.get(&m, &params).len();
        assert_eq!(cache.get(&m, &params).len(), n);
        assert_eq!(cache.builds(), 1);
        assert!(cache.is_fresh(&m, &params));

        m.set(0, 0, -1.0).unwrap();
        assert!(!cache.is_fresh(&m, &params));
        let mesh = cache.get(&m, &params);
        assert_eq!(mesh.value_range(), Some((-1.0, 4.0)));
        assert_eq!(cache.builds(), 2);
    }

    #[test]
    fn params_are_part_of_the_key() {
        let m = Matrix::from_vec(1, 2, vec![1.0, 2.0]).unwrap();
        let mut cache = MeshCache::new();
        let mut params = MeshParams::default();
        let _ = cache.get(&m, &params);

        params.alpha = 0.5;
        let _ = cache.get(&m, &params);
        params.palette = ColorPalette::Grayscale;
        let _ = cache.get(&m, &params);
        params.z_epsilon = 0.1;
        let _ = cache.get(&m, &params);
        let _ = cache.get(&m, &params);
        assert_eq!(cache.builds(), 4);

        cache.invalidate();
        let _ = cache.get(&m, &params);
        assert_eq!(cache.builds(), 5);
    }

    #[test]
    fn transforms_invalidate_through_revision() {
        let mut m = Matrix::from_vec(1, 2, vec![1.0, 2.0]).unwrap();
        let params = MeshParams::default();
        let mut cache = MeshCache::new();
        let _ = cache.get(&m, &params);
        m.log_scale();
        assert!(!cache.is_fresh(&m, &params));
    }
}
