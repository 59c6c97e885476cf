//! Benchmarks for the shrinkwrap projector.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use glam::{Affine3A, Vec3};

use conform::config::ResolvedTolerance;
use conform::decal::{Bvh, LinearScan, Triangle, project, subdivide};
use conform::resources::primitives::{PlaneOptions, SphereOptions, create_plane, create_sphere};
use conform::resources::{Material, Mesh};

fn sphere_triangles(segments: u32) -> Vec<Triangle> {
    create_sphere(SphereOptions {
        radius: 1.0,
        width_segments: segments * 2,
        height_segments: segments,
    })
    .triangles()
    .map(|[a, b, c]| Triangle::new(a, b, c))
    .collect()
}

fn patch() -> Mesh {
    let geometry = subdivide(
        &create_plane(PlaneOptions {
            width: 0.5,
            height: 0.5,
            ..Default::default()
        }),
        3,
        2000,
    );
    Mesh::new("PrintArea", geometry, Material::new("PrintArea"))
        .with_world_matrix(Affine3A::from_translation(Vec3::new(0.0, 0.0, 1.05)))
}

fn bench_projection(c: &mut Criterion) {
    let tolerance = ResolvedTolerance {
        margin: 0.15,
        epsilon: 5e-4,
        max_distance: None,
    };
    let mut group = c.benchmark_group("shrinkwrap");

    for segments in [16u32, 64, 128] {
        let triangles = sphere_triangles(segments);
        let linear = LinearScan::new(triangles.clone());
        let bvh = Bvh::build(triangles.clone());

        group.bench_with_input(BenchmarkId::new("linear", triangles.len()), &linear, |b, index| {
            b.iter(|| {
                let mut mesh = patch();
                project(&mut mesh, index, &tolerance).ok();
                black_box(mesh)
            });
        });
        group.bench_with_input(BenchmarkId::new("bvh", triangles.len()), &bvh, |b, index| {
            b.iter(|| {
                let mut mesh = patch();
                project(&mut mesh, index, &tolerance).ok();
                black_box(mesh)
            });
        });
    }
    group.finish();
}

fn bench_bvh_build(c: &mut Criterion) {
    let triangles = sphere_triangles(128);
    c.bench_function("bvh_build_128", |b| {
        b.iter(|| Bvh::build(black_box(triangles.clone())));
    });
}

criterion_group!(benches, bench_projection, bench_bvh_build);
criterion_main!(benches);
