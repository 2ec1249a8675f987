//! Benchmarks for the transition engine and rule evaluation.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;

use life_ga::{
    compute::{
        Grid,
        evolution::{FitnessEvaluator, RuleRng},
        step,
    },
    schema::{Encoding, Rule, living_index, pattern_index},
};

/// Step that copies the whole grid first and overwrites it cell by cell.
fn step_full_copy(grid: &Grid, rule: &Rule) -> Grid {
    let mut next = grid.to_rows();
    for (row, line) in next.iter_mut().enumerate() {
        for (col, cell) in line.iter_mut().enumerate() {
            let neighbourhood = grid.neighbourhood(row, col);
            let current = grid.get(row, col);
            let key = match rule.encoding() {
                Encoding::Living => living_index(current, neighbourhood.iter().sum()),
                Encoding::Pattern => pattern_index(current, &neighbourhood),
            };
            *cell = rule.next_state(key, current);
        }
    }
    Grid::from_rows(next).unwrap()
}

fn bench_step(c: &mut Criterion) {
    let mut rng = RuleRng::new(7);
    let rules = [
        ("living", rng.random_rule(Encoding::Living)),
        ("pattern", rng.random_rule(Encoding::Pattern)),
    ];

    for (name, rule) in &rules {
        let mut group = c.benchmark_group(format!("step_{name}"));

        for size in [32, 64, 128, 256] {
            let grid = Grid::random(size, size, &mut StdRng::seed_from_u64(70)).unwrap();
            let label = format!("{}x{}", size, size);

            group.bench_with_input(BenchmarkId::new("fresh_buffer", &label), &grid, |b, grid| {
                b.iter(|| step(black_box(grid), rule));
            });
            group.bench_with_input(BenchmarkId::new("full_copy", &label), &grid, |b, grid| {
                b.iter(|| step_full_copy(black_box(grid), rule));
            });
        }

        group.finish();
    }
}

fn bench_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate_100_steps");
    let evaluator = FitnessEvaluator::new(100);
    let rule = Rule::conway();

    for size in [50, 100] {
        let grid = Grid::random(size, size, &mut StdRng::seed_from_u64(70)).unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", size, size)),
            &grid,
            |b, grid| {
                b.iter(|| evaluator.evaluate(&rule, black_box(grid)));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_step, bench_evaluation);
criterion_main!(benches);
