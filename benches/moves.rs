use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use lib::chess::{Game, Position};

const POSITIONS: &[(&str, &str)] = &[
    (
        "initial",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    ),
    (
        "kiwipete",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    ),
    (
        "endgame",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    ),
];

fn bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("benches");

    for &(name, fen) in POSITIONS {
        let pos: Position = fen.parse().unwrap();

        group.bench_function(format!("moves/{name}"), |b| b.iter(|| pos.moves()));
        group.bench_function(format!("perft/{name}"), |b| b.iter(|| pos.perft(2)));

        let game = Game::from(pos.clone());
        let moves = pos.moves();
        group.bench_function(format!("play/{name}"), |b| {
            b.iter_batched_ref(
                || (game.clone(), moves.iter().cycle()),
                |(game, moves)| moves.next().map(|&m| game.play(m)),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench);
criterion_main!(benches);
