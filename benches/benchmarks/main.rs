use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use itertools::Itertools as _;
use rand::{SeedableRng, rngs::StdRng};
use tile_match::{
    board::{Grid, generator::Generator, matches::find_matches, test_utils},
    engine::resolve::resolve,
    slide::{Direction, SlideGame},
};

/// Random boards with matches left in, across every supported kind count.
fn generate_grids(count: usize) -> Vec<(Grid, u8)> {
    let mut rng = StdRng::seed_from_u64(0);

    (3..=6u8)
        .cartesian_product(0..count)
        .map(|(kinds, _)| {
            let grid = test_utils::random_grid(&mut rng, 8, kinds);
            (grid, kinds)
        })
        .collect()
}

fn bench_detect(c: &mut Criterion) {
    const COUNT: usize = 100;

    let mut group = c.benchmark_group("detect");
    let grids = generate_grids(COUNT);
    group.throughput(Throughput::Elements(grids.len() as u64));

    group.bench_function("find_matches", |b| {
        b.iter(|| {
            for (grid, _) in &grids {
                black_box(find_matches(grid));
            }
        });
    });

    group.bench_function("generate", |b| {
        let generator = Generator::new(8, 6, 64);
        let mut rng = StdRng::seed_from_u64(1);
        b.iter(|| black_box(generator.generate(&mut rng)));
    });
}

fn bench_resolve(c: &mut Criterion) {
    const COUNT: usize = 100;

    let mut group = c.benchmark_group("resolve");
    let grids = generate_grids(COUNT);
    group.throughput(Throughput::Elements(grids.len() as u64));

    group.bench_function("cascade", |b| {
        let mut rng = StdRng::seed_from_u64(2);
        b.iter(|| {
            for (grid, kinds) in &grids {
                let mut grid = grid.clone();
                let initial = find_matches(&grid);
                black_box(resolve(&mut grid, initial, *kinds, &mut rng));
            }
        });
    });
}

fn bench_slide(c: &mut Criterion) {
    let mut group = c.benchmark_group("slide");
    let mut rng = StdRng::seed_from_u64(3);
    let games = (0..1000).map(|_| SlideGame::new(&mut rng)).collect_vec();
    let moves = (games.len() * Direction::ALL.len()) as u64;
    group.throughput(Throughput::Elements(moves));

    group.bench_function("all_directions", |b| {
        b.iter(|| {
            for game in &games {
                for direction in Direction::ALL {
                    black_box(game.clone().slide(direction));
                }
            }
        });
    });
}

criterion_group!(benches, bench_detect, bench_resolve, bench_slide);
criterion_main!(benches);
