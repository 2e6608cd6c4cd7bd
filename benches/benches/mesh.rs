// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use relief_matrix::Matrix;
use relief_mesh::{Mesh, MeshCache, MeshParams};

#[derive(Clone)]
struct Lcg(u64);

impl Lcg {
    fn next_f64(&mut self) -> f64 {
        // Numerical Recipes LCG parameters.
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 11) as f64 / (1_u64 << 53) as f64
    }
}

/// Values in [-1, 1), so roughly half the neighbours change sign.
fn signed_matrix(n: usize, seed: u64) -> Matrix {
    let mut rng = Lcg(seed);
    Matrix::from_fn(n, n, |_, _| 2.0 * rng.next_f64() - 1.0)
}

fn bench_mesh(c: &mut Criterion) {
    let mut group = c.benchmark_group("relief_mesh");
    let params = MeshParams::default();

    for &n in &[16_usize, 64, 256] {
        let signed = signed_matrix(n, 0x5EED_0000_0000_0001);
        group.bench_function(format!("generate_signed(n={n})"), |b| {
            b.iter(|| black_box(Mesh::generate(black_box(&signed), &params)));
        });

        let flat = Matrix::from_fn(n, n, |_, _| 1.0);
        group.bench_function(format!("generate_flat(n={n})"), |b| {
            b.iter(|| black_box(Mesh::generate(black_box(&flat), &params)));
        });

        let mut cache = MeshCache::new();
        let _ = cache.get(&signed, &params);
        group.bench_function(format!("cache_hit(n={n})"), |b| {
            b.iter(|| black_box(cache.get(&signed, &params).len()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_mesh);
criterion_main!(benches);
