use criterion::{black_box, criterion_group, criterion_main, Criterion};
use penney_sim::card::Matchup;
use penney_sim::simulation::aggregate::aggregate;
use penney_sim::simulation::generate::generate;
use penney_sim::simulation::scoring::score;

fn benchmark_single_game(c: &mut Criterion) {
    let (decks, _) = generate(12345, 1, 26).expect("Failed to generate deck");
    let matchup = Matchup::all().next().expect("at least one matchup");

    c.bench_function("score_single_game", |b| {
        b.iter(|| score(black_box(&decks[0]), black_box(matchup)))
    });
}

fn benchmark_aggregate(c: &mut Criterion) {
    let (decks, _) = generate(12345, 1000, 26).expect("Failed to generate decks");

    c.bench_function("aggregate_1000_decks", |b| {
        b.iter(|| aggregate(black_box(&decks)))
    });
}

fn benchmark_generate(c: &mut Criterion) {
    c.bench_function("generate_1000_decks", |b| {
        b.iter(|| generate(black_box(12345), black_box(1000), black_box(26)))
    });
}

criterion_group!(benches, benchmark_single_game, benchmark_aggregate, benchmark_generate);
criterion_main!(benches);
