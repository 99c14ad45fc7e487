use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{DVec2, DVec3};
use minisam_lie::{SE2, SE3, SO2, SO3};
use rand::Rng;

const DATA_SIZE: usize = 1000;

fn random_vec3(rng: &mut impl Rng) -> DVec3 {
    DVec3::new(rng.random(), rng.random(), rng.random())
}

fn bench_so2_se2(c: &mut Criterion) {
    let mut group = c.benchmark_group("so2_se2");
    let mut rng = rand::rng();

    let thetas: Vec<f64> = (0..DATA_SIZE).map(|_| rng.random()).collect();
    let tangents: Vec<DVec3> = (0..DATA_SIZE).map(|_| random_vec3(&mut rng)).collect();
    let poses: Vec<SE2> = tangents.iter().map(|&v| SE2::exp(v)).collect();

    group.bench_function(BenchmarkId::new("so2_exp", DATA_SIZE), |b| {
        b.iter(|| {
            for theta in thetas.iter() {
                std::hint::black_box(SO2::exp(std::hint::black_box(*theta)));
            }
        })
    });

    group.bench_function(BenchmarkId::new("se2_exp", DATA_SIZE), |b| {
        b.iter(|| {
            for tangent in tangents.iter() {
                std::hint::black_box(SE2::exp(std::hint::black_box(*tangent)));
            }
        })
    });

    group.bench_function(BenchmarkId::new("se2_log", DATA_SIZE), |b| {
        b.iter(|| {
            for pose in poses.iter() {
                std::hint::black_box(std::hint::black_box(*pose).log());
            }
        })
    });

    group.bench_function(BenchmarkId::new("se2_act", DATA_SIZE), |b| {
        let p = DVec2::new(1.0, -2.0);
        b.iter(|| {
            for pose in poses.iter() {
                std::hint::black_box(*pose * std::hint::black_box(p));
            }
        })
    });

    group.finish();
}

fn bench_so3(c: &mut Criterion) {
    let mut group = c.benchmark_group("so3");
    let mut rng = rand::rng();

    let omegas: Vec<DVec3> = (0..DATA_SIZE).map(|_| random_vec3(&mut rng)).collect();
    let rots: Vec<SO3> = omegas.iter().map(|&v| SO3::exp(v)).collect();

    group.bench_function(BenchmarkId::new("exp", DATA_SIZE), |b| {
        b.iter(|| {
            for omega in omegas.iter() {
                std::hint::black_box(SO3::exp(std::hint::black_box(*omega)));
            }
        })
    });

    group.bench_function(BenchmarkId::new("log", DATA_SIZE), |b| {
        b.iter(|| {
            for rot in rots.iter() {
                std::hint::black_box(std::hint::black_box(*rot).log());
            }
        })
    });

    group.bench_function(BenchmarkId::new("compose", DATA_SIZE), |b| {
        b.iter(|| {
            for pair in rots.windows(2) {
                std::hint::black_box(pair[0] * pair[1]);
            }
        })
    });

    group.finish();
}

fn bench_se3(c: &mut Criterion) {
    let mut group = c.benchmark_group("se3");
    let mut rng = rand::rng();

    let tangents: Vec<[f64; 6]> = (0..DATA_SIZE)
        .map(|_| std::array::from_fn(|_| rng.random()))
        .collect();
    let poses: Vec<SE3> = tangents.iter().map(|&v| SE3::exp(v)).collect();

    group.bench_function(BenchmarkId::new("exp", DATA_SIZE), |b| {
        b.iter(|| {
            for tangent in tangents.iter() {
                std::hint::black_box(SE3::exp(std::hint::black_box(*tangent)));
            }
        })
    });

    group.bench_function(BenchmarkId::new("log", DATA_SIZE), |b| {
        b.iter(|| {
            for pose in poses.iter() {
                std::hint::black_box(std::hint::black_box(*pose).log());
            }
        })
    });

    group.bench_function(BenchmarkId::new("inverse", DATA_SIZE), |b| {
        b.iter(|| {
            for pose in poses.iter() {
                std::hint::black_box(std::hint::black_box(*pose).inverse());
            }
        })
    });

    group.bench_function(BenchmarkId::new("adj", DATA_SIZE), |b| {
        b.iter(|| {
            for pose in poses.iter() {
                std::hint::black_box(std::hint::black_box(*pose).adj());
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_so2_se2, bench_so3, bench_se3);
criterion_main!(benches);
