//! Sampler, reel builder and easing benchmarks

use cf_roulette::{
    CaseBook, DecoyPolicy, PreviewFallback, SequenceBuilder, WeightedSampler, phased_progress,
};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn bench_sample(c: &mut Criterion) {
    let book = CaseBook::standard();
    let case = book.case("random").expect("standard book has a random case");
    let sampler = WeightedSampler::new(&case.weights, &book.catalog).expect("valid case");
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    c.bench_function("sample_reward", |b| {
        b.iter(|| black_box(sampler.sample(&mut rng)));
    });
}

fn bench_build_spin(c: &mut Criterion) {
    let book = CaseBook::standard();
    let case = book.case("legendary").expect("standard book has a legendary case");
    let sampler = WeightedSampler::new(&case.weights, &book.catalog).expect("valid case");
    let policy = DecoyPolicy::default();
    let builder = SequenceBuilder::new(&book.catalog, &policy, PreviewFallback::default());
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let winner = sampler.sample(&mut rng);

    c.bench_function("build_spin_50", |b| {
        b.iter(|| black_box(builder.build_spin(&winner, 50, &mut rng)));
    });
}

fn bench_easing(c: &mut Criterion) {
    let samples: Vec<f64> = (0..=1000).map(|i| i as f64 / 1000.0).collect();

    c.bench_function("phased_progress_1001", |b| {
        b.iter(|| {
            let sum: f64 = samples.iter().map(|t| phased_progress(black_box(*t))).sum();
            black_box(sum)
        })
    });
}

criterion_group!(benches, bench_sample, bench_build_spin, bench_easing);
criterion_main!(benches);
