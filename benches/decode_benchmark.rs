use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hmmtagger::{Dataset, SmoothOpt, TrainOpt};

fn decode_benchmark(c: &mut Criterion) {
    let ds = Dataset::from_path("tests/data/sample.tsv").expect("failed to read dataset");
    let mut model = hmmtagger::train(&ds, TrainOpt::default());
    model.smooth(&SmoothOpt::default());
    let tagger = model.tagger();

    let short = ["Die", "Katze", "ist", "grün", "."];
    c.bench_function("decode_short", |b| {
        b.iter(|| tagger.decode(black_box(&short[..])))
    });

    let long: Vec<&str> = ["Der", "Hund", "schläft", ",", "die", "Katze", "ist", "klein", "."]
        .iter()
        .copied()
        .cycle()
        .take(200)
        .collect();
    c.bench_function("decode_long", |b| {
        b.iter(|| tagger.decode(black_box(long.as_slice())))
    });

    c.bench_function("tagger_new", |b| b.iter(|| black_box(model.tagger())));
}

criterion_group!(benchmarks, decode_benchmark);
criterion_main!(benchmarks);
