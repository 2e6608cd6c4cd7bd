// Copyright 2025 the Relief Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use kurbo::Size;
use relief_export::{ExportOptions, Scene, project_faces, remove_hidden_faces};
use relief_matrix::Matrix;
use relief_mesh::Mesh;
use relief_view3d::Camera;

fn ramp(n: usize) -> Matrix {
    Matrix::from_fn(n, n, |r, c| ((r * 7 + c * 3) % 11) as f64 - 5.0)
}

fn bench_scene(c: &mut Criterion) {
    let mut group = c.benchmark_group("relief_export");
    group.sample_size(30);

    let camera = Camera::new(Size::new(800.0, 800.0));
    let projector = camera.projector();
    let options = ExportOptions::default();
    let culled = ExportOptions {
        hidden_face_removal: true,
        ..ExportOptions::default()
    };

    for &n in &[16_usize, 48] {
        let mesh = Mesh::generate(&ramp(n), &options.mesh_params());

        group.bench_function(format!("project_and_sort(n={n})"), |b| {
            b.iter(|| black_box(project_faces(mesh.faces(), &projector)));
        });

        group.bench_function(format!("hidden_face_removal(n={n})"), |b| {
            b.iter_batched(
                || project_faces(mesh.faces(), &projector),
                |mut faces| {
                    remove_hidden_faces(&mut faces);
                    black_box(faces);
                },
                BatchSize::LargeInput,
            );
        });

        group.bench_function(format!("scene_build_culled(n={n})"), |b| {
            b.iter(|| black_box(Scene::build(&mesh, &projector, &culled)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_scene);
criterion_main!(benches);
