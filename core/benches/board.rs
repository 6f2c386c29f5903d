use std::hint::black_box;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use minebot_core::*;

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    for (name, config) in [
        ("default", GameConfig::default()),
        ("intermediate", GameConfig::intermediate()),
        ("expert", GameConfig::expert()),
    ] {
        let mut generator = RandomBoardGenerator::new(20261019);
        group.bench_function(name, |b| b.iter(|| black_box(generator.generate(config))));
    }
    group.finish();
}

fn bench_flood_fill(c: &mut Criterion) {
    // a single mine in the corner, the first reveal opens the whole board
    let grid = Grid::from_mine_coords((16, 30), &[(15, 29)]).unwrap();
    c.bench_function("reveal.flood_fill.open_board", |b| {
        b.iter_batched(
            || RevealState::new(grid.size()),
            |mut revealed| black_box(reveal(&grid, &mut revealed, (0, 0))),
            BatchSize::SmallInput,
        );
    });
}

fn bench_training_cycle(c: &mut Criterion) {
    c.bench_function("training.random_agent.100_episodes", |b| {
        b.iter_batched(
            || {
                let controller = EpisodeController::new(
                    GameConfig::default(),
                    RandomBoardGenerator::new(1),
                    PlayVariant::Autonomous,
                )
                .unwrap();
                TrainingLoop::new(controller, RandomAgent::new(1), RewardPolicy::default())
            },
            |mut training| black_box(training.run_episodes(100)),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_generate, bench_flood_fill, bench_training_cycle);
criterion_main!(benches);
