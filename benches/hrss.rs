use criterion::{criterion_group, criterion_main, Criterion};
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;
use std::hint::black_box;

fn bench_keypair(c: &mut Criterion) {
    let mut rng = ChaCha20Rng::from_seed([0u8; 32]);
    c.bench_function("keypair", |b| {
        b.iter(|| black_box(hrss::keypair(&mut rng)))
    });
}

fn bench_encapsulate(c: &mut Criterion) {
    let mut rng = ChaCha20Rng::from_seed([1u8; 32]);
    let (pk, _sk) = hrss::keypair(&mut rng);
    c.bench_function("encapsulate", |b| {
        b.iter(|| black_box(hrss::encapsulate(black_box(&pk), &mut rng)))
    });
}

fn bench_decapsulate(c: &mut Criterion) {
    let mut rng = ChaCha20Rng::from_seed([2u8; 32]);
    let (pk, sk) = hrss::keypair(&mut rng);
    let (ct, _key) = hrss::encapsulate(&pk, &mut rng);
    c.bench_function("decapsulate", |b| {
        b.iter(|| black_box(hrss::decapsulate(black_box(&sk), black_box(ct.as_bytes()))))
    });
}

criterion_group!(benches, bench_keypair, bench_encapsulate, bench_decapsulate);
criterion_main!(benches);
