use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::black_box;
use criterion::criterion_group;
use criterion::criterion_main;

use atomlife::config::PhysicsConfig;
use atomlife::physics::{Engine, ParticleSet, TickOrdering};
use atomlife::resources::SharedRng;
use atomlife::{Dimensions, SimulationConfig};

fn engine(particle_count: usize, ordering: TickOrdering, dimensions: Dimensions) -> Engine {
    let mut config: PhysicsConfig = SimulationConfig::default().physics;
    config.particle_count = particle_count;
    config.ordering = ordering;
    config.dimensions = dimensions;
    config.initial_speed = 0.5;

    let mut rng = SharedRng::from_seed(42);
    let particles = ParticleSet::initialize(&config, &mut *rng);
    Engine::new(&config, particles).unwrap()
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_tick");

    let particle_counts = [60, 150, 300, 500];

    for ordering in [TickOrdering::Phased, TickOrdering::Interleaved] {
        for &count in &particle_counts {
            let mut engine = engine(count, ordering, Dimensions::Two);
            let id = BenchmarkId::new(format!("{ordering:?}").to_lowercase(), count);

            group.bench_with_input(id, &count, |b, _| {
                b.iter(|| black_box(engine.tick()));
            });
        }
    }

    group.finish();
}

fn bench_tick_3d(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_tick_3d");

    for &count in &[150, 500] {
        let mut engine = engine(count, TickOrdering::Phased, Dimensions::Three);

        group.bench_with_input(BenchmarkId::new("phased", count), &count, |b, _| {
            b.iter(|| black_box(engine.tick()));
        });
    }

    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let engine = engine(500, TickOrdering::Phased, Dimensions::Two);

    c.bench_function("snapshot_500", |b| b.iter(|| black_box(engine.snapshot())));
}

criterion_group!(benches, bench_tick, bench_tick_3d, bench_snapshot);
criterion_main!(benches);
