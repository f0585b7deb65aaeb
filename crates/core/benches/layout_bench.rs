//! Benchmarks for swivel layouts.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use swivel_core::{ConfigRevision, LayoutConfig, LayoutEngine, ModuleSpec, RecordingKernel};

fn layout_benchmark(c: &mut Criterion) {
    let engine = LayoutEngine::new(LayoutConfig::reference(ConfigRevision::V0_4))
        .expect("reference configuration is valid");

    c.bench_function("layout_reference_use", |b| {
        b.iter(|| black_box(engine.compute(black_box("use"))))
    });

    c.bench_function("layout_reference_catalog", |b| {
        b.iter(|| black_box(engine.compute_catalog()))
    });

    c.bench_function("emit_reference_use", |b| {
        b.iter(|| {
            let mut kernel = RecordingKernel::new();
            let result = swivel_core::build_pose(&engine, "use", &mut kernel);
            black_box((result, kernel))
        })
    });
}

fn grid_benchmark(c: &mut Criterion) {
    let config = (0..10).fold(LayoutConfig::reference(ConfigRevision::V0_4), |config, i| {
        config.with_module(ModuleSpec::new(
            format!("G_{}", i + 1),
            400.0,
            300.0,
            250.0,
            250.0 * i as f64 + 200.0,
            1240.0,
        ))
    });
    let engine = LayoutEngine::new(config).expect("grid configuration is valid");

    c.bench_function("layout_16_modules_catalog", |b| {
        b.iter(|| black_box(engine.compute_catalog()))
    });
}

criterion_group!(benches, layout_benchmark, grid_benchmark);
criterion_main!(benches);
