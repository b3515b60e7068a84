//! Benchmarks for index and search throughput.
//!
//! The realistic corpus repeats a handful of waveform shapes (spike, steps,
//! triangle, dip) with additive noise, which is close to the metrics
//! workload the index is designed for.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use simbank::{Document, LSHIndex, LSHParams, SearchOptions, SignFilter};

const VECTOR_LENGTH: usize = 60;

fn bench_params() -> LSHParams {
    LSHParams {
        vector_length: VECTOR_LENGTH,
        ..LSHParams::default()
    }
}

fn waveforms() -> Vec<Vec<f64>> {
    let n = VECTOR_LENGTH;
    let mut spike = vec![0.0; n];
    spike[n / 2] = 1.0;

    let mut rising_step = vec![0.0; n];
    let mut lowering_step = vec![0.0; n];
    for i in n / 2..n {
        rising_step[i] = 1.0;
        lowering_step[i] = -1.0;
    }

    let mut triangle = vec![0.0; n];
    let mut dip = vec![0.0; n];
    for i in n / 4..n / 2 {
        triangle[i] = (i - n / 4) as f64;
        dip[i] = -((i - n / 4) as f64);
    }
    for i in n / 2..3 * n / 4 {
        triangle[i] = -((i - n / 2) as f64) + 1.0;
        dip[i] = (i - n / 2) as f64 - 1.0;
    }

    vec![spike, rising_step, lowering_step, triangle, dip]
}

fn noisy_corpus(num_docs: usize, seed: u64) -> Vec<Document> {
    let shapes = waveforms();
    let mut rng = StdRng::seed_from_u64(seed);
    (0..num_docs)
        .map(|i| {
            let mut vec = shapes[i % shapes.len()].clone();
            for x in vec.iter_mut() {
                *x += rng.random::<f64>();
            }
            Document::new(i as u64, 0, vec)
        })
        .collect()
}

fn bench_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("index");
    group.throughput(Throughput::Elements(1));

    let docs = noisy_corpus(100_000, 42);
    let mut next = 0;
    let index = LSHIndex::new(bench_params()).unwrap();
    group.bench_function("single_document", |b| {
        b.iter(|| {
            let mut doc = docs[next % docs.len()].clone();
            doc.uid = next as u64;
            next += 1;
            index.index(black_box(doc)).unwrap();
        })
    });
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(20);

    let index = LSHIndex::new(bench_params()).unwrap();
    for doc in noisy_corpus(10_000, 42) {
        index.index(doc).unwrap();
    }
    let query = Document::new(0, 0, waveforms()[1].clone());

    let positive = SearchOptions {
        sign_filter: SignFilter::Pos,
        ..SearchOptions::default()
    };
    group.bench_function("positive", |b| {
        b.iter(|| {
            index
                .search(black_box(&query), black_box(&positive))
                .unwrap()
        })
    });

    let broad = SearchOptions {
        num_to_return: 1000,
        threshold: 0.65,
        ..SearchOptions::default()
    };
    group.bench_function("broad_threshold", |b| {
        b.iter(|| index.search(black_box(&query), black_box(&broad)).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_index, bench_search);
criterion_main!(benches);
