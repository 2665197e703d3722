//! Criterion benchmarks for Metropolis sweeps and energy measurement.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use phyz_gauge::{Action, FiniteGroup, GaugeField, InitPolicy};

fn make_field(size: usize, dims: usize, group: FiniteGroup) -> GaugeField {
    GaugeField::seeded(
        &vec![size; dims],
        group,
        Action::delta(),
        0.8,
        InitPolicy::Random,
        1,
    )
    .unwrap()
}

fn bench_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("sweep");
    for &(size, dims) in &[(8, 3), (6, 4)] {
        let mut field = make_field(size, dims, FiniteGroup::cyclic(2).unwrap());
        group.bench_with_input(
            BenchmarkId::new("z2", format!("{}^{}", size, dims)),
            &(),
            |b, _| b.iter(|| field.sweep(1)),
        );

        let mut field = make_field(size, dims, FiniteGroup::quaternion());
        group.bench_with_input(
            BenchmarkId::new("q8", format!("{}^{}", size, dims)),
            &(),
            |b, _| b.iter(|| field.sweep(1)),
        );
    }
    group.finish();
}

fn bench_energy(c: &mut Criterion) {
    let field = make_field(8, 4, FiniteGroup::quaternion());
    c.bench_function("total_energy 8^4 q8", |b| b.iter(|| field.total_energy()));
}

criterion_group!(benches, bench_sweep, bench_energy);
criterion_main!(benches);
