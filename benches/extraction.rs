//! Benchmarks for isosurface extraction.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use glam::Vec3;
use isomarch::prelude::*;

fn sphere_field(resolution: usize) -> GridScalarField {
    GridScalarField::from_fn(
        [resolution, resolution, resolution],
        Vec3::ZERO,
        Vec3::splat(1.0 / (resolution - 1) as f32),
        |p| (p - Vec3::splat(0.5)).length(),
    )
    .expect("valid grid")
}

fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");

    for resolution in [32usize, 64] {
        let field = sphere_field(resolution);
        let cells = field.cell_count() as u64;
        group.throughput(Throughput::Elements(cells));

        group.bench_with_input(
            BenchmarkId::new("sequential", resolution),
            &field,
            |b, field| {
                let mut mc = MarchingCubes::new(field, 0.35);
                mc.set_execution(Execution::Sequential);
                b.iter(|| {
                    mc.extract().expect("extraction");
                    black_box(mc.num_total_vertices())
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("parallel", resolution),
            &field,
            |b, field| {
                let mut mc = MarchingCubes::new(field, 0.35);
                mc.set_execution(Execution::Parallel);
                b.iter(|| {
                    mc.extract().expect("extraction");
                    black_box(mc.num_total_vertices())
                })
            },
        );
    }

    group.finish();
}

fn bench_isovalue_sweep(c: &mut Criterion) {
    let field = sphere_field(48);
    let mut mc = MarchingCubes::new(&field, 0.1);

    c.bench_function("isovalue_sweep_48", |b| {
        b.iter(|| {
            for step in 1..=5 {
                mc.set_isovalue(step as f32 * 0.08);
                mc.extract().expect("extraction");
                black_box(mc.num_total_vertices());
            }
        })
    });
}

criterion_group!(benches, bench_extraction, bench_isovalue_sweep);
criterion_main!(benches);
