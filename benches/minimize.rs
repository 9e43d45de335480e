use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use transducers::{random::random_machine, Kind};

fn minimize(c: &mut Criterion) {
    let mut group = c.benchmark_group("minimize");
    for kind in [Kind::Mealy, Kind::Moore] {
        for size in [50, 200, 800] {
            let mut rng = fastrand::Rng::with_seed(size as u64);
            let mm = random_machine(&mut rng, kind, size, 4, 3);
            group.bench_with_input(BenchmarkId::new(kind.to_string(), size), &mm, |b, mm| {
                b.iter(|| black_box(mm.minimize().unwrap()))
            });
        }
    }
    group.finish();
}

criterion_group!(benches, minimize);
criterion_main!(benches);
