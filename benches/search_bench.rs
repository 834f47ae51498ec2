use criterion::{criterion_group, criterion_main, Criterion};

use rampart::board::perft::perft;
use rampart::board::Position;
use rampart::config::Settings;
use rampart::search::{Search, SearchLimits};

fn bench_perft(c: &mut Criterion) {
    rampart::init();
    c.bench_function("perft_start_4", |b| {
        let mut pos = Position::new();
        b.iter(|| perft(&mut pos, 4));
    });
    c.bench_function("perft_kiwipete_3", |b| {
        let mut pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        b.iter(|| perft(&mut pos, 3));
    });
}

fn bench_search(c: &mut Criterion) {
    rampart::init();
    c.bench_function("search_middlegame_depth_6", |b| {
        let pos = Position::from_fen(
            "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
        )
        .unwrap();
        b.iter(|| {
            let mut search = Search::with_settings(Settings {
                hash_mb: 16,
                ..Settings::default()
            });
            let limits = SearchLimits {
                depth: Some(6),
                ..SearchLimits::default()
            };
            search.start(&pos, limits).unwrap();
            search.wait_until_done();
            search.last_result().unwrap().best_move
        });
    });
}

criterion_group!(benches, bench_perft, bench_search);
criterion_main!(benches);
