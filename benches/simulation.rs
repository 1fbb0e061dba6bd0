//! Simulation benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cardiopulmonary_sim::lungs::Dissociation;
use cardiopulmonary_sim::{GasPair, Parameters, Simulation, SimulationConfig};

fn bench_evaluate(c: &mut Criterion) {
    let mut sim = Simulation::new(Parameters::default(), SimulationConfig::default()).expect("default run is valid");

    c.bench_function("evaluate", |b| b.iter(|| black_box(sim.evaluate())));
}

fn bench_one_second(c: &mut Criterion) {
    let config = SimulationConfig {
        duration_s: 1.0,
        ..Default::default()
    };

    let mut group = c.benchmark_group("simulated_second");
    group.sample_size(10);
    group.bench_function("closed_loop", |b| {
        b.iter(|| {
            let mut sim = Simulation::new(Parameters::default(), black_box(config.clone())).expect("valid config");
            sim.run().expect("run succeeds")
        })
    });
    group.finish();
}

fn bench_dissociation_inverse(c: &mut Criterion) {
    let curves = Dissociation::new(&Parameters::default().lung_gas);
    let content = curves.content(GasPair { o2: 40.0, co2: 46.0 });

    c.bench_function("dissociation_inverse", |b| {
        b.iter(|| curves.partial_pressures(black_box(content)))
    });
}

criterion_group!(benches, bench_evaluate, bench_one_second, bench_dissociation_inverse);
criterion_main!(benches);
