//! Benchmarks for the MAP-Elites engine.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use enemy_generator::{
    compute::evolution::{GenomeRng, run},
    enemy::{DifficultyEvaluator, enemy_search_space},
    schema::{BlendAlpha, EvolutionConfig},
};

fn bench_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("evolution_run");

    for generations in [50, 200, 1000] {
        let config = EvolutionConfig {
            seed: 0,
            generations,
            initial_population: 10,
            mutation_chance: 30,
            crossover_chance: 70,
            ..Default::default()
        };
        let evaluator = DifficultyEvaluator::new(&config.search_space).unwrap();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_generations", generations)),
            &generations,
            |b, _| {
                b.iter(|| run(black_box(config.clone()), &evaluator).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_operators(c: &mut Criterion) {
    let mut group = c.benchmark_group("operators");
    let space = enemy_search_space();
    let mut rng = GenomeRng::new(42);
    let p1 = rng.random_genome(&space);
    let p2 = rng.random_genome(&space);

    group.bench_function("crossover", |b| {
        b.iter(|| rng.crossover(&space, black_box(&p1), black_box(&p2), BlendAlpha::Resampled));
    });
    group.bench_function("mutation", |b| {
        b.iter(|| rng.mutate(&space, black_box(&p1), 30));
    });

    group.finish();
}

criterion_group!(benches, bench_run, bench_operators);
criterion_main!(benches);
