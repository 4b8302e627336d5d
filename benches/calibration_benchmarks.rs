use affine_calibration::{
    CalibrationModel, CalibrationSolver, Matrix, PoseSample, pseudo_inverse, six_face_directions,
};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use nalgebra::{Matrix3, Vector3};
use rand::prelude::*;
use rand_pcg::Pcg64;

/// Diagonally dominant square matrix, always invertible
fn generate_matrix(rng: &mut Pcg64, n: usize) -> Matrix {
    let mut m = Matrix::zeros(n, n);
    for i in 0..n {
        for j in 0..n {
            let value = if i == j {
                rng.random_range(2.0f32..4.0)
            } else {
                rng.random_range(-1.0f32..1.0) / n as f32
            };
            m.set(i, j, value).unwrap();
        }
    }
    m
}

fn generate_model() -> CalibrationModel {
    CalibrationModel::new(
        Matrix3::new(
            1.02, 0.01, -0.01, //
            -0.02, 0.97, 0.02, //
            0.01, -0.01, 1.04,
        ),
        Vector3::new(0.03, -0.02, 0.05),
    )
}

// Pre-generated poses to eliminate RNG overhead during benchmarks
fn generate_poses(count: usize, seed: u64) -> Vec<PoseSample> {
    let mut rng = Pcg64::seed_from_u64(seed);
    let model = generate_model();
    let inverse = model.linear_map().try_inverse().unwrap();

    let mut directions = six_face_directions().to_vec();
    while directions.len() < count {
        let v: Vector3<f32> = Vector3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        );
        if v.norm() > 0.1 {
            directions.push(v.normalize());
        }
    }

    directions
        .into_iter()
        .map(|expected| {
            let noise: Vector3<f32> = Vector3::new(
                rng.random_range(-0.002..0.002),
                rng.random_range(-0.002..0.002),
                rng.random_range(-0.002..0.002),
            );
            PoseSample::new(expected, inverse * (expected - model.offset()) + noise)
        })
        .collect()
}

/// Benchmark Gauss-Jordan inversion at several sizes
fn bench_invert(c: &mut Criterion) {
    let mut rng = Pcg64::seed_from_u64(1);
    let mut group = c.benchmark_group("matrix_inverse");

    for n in [3, 4, 8] {
        let m = generate_matrix(&mut rng, n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &m, |b, m| {
            b.iter(|| black_box(m.inverse().unwrap()))
        });
    }

    group.finish();
}

/// Benchmark the pseudo-inverse of the augmented raw matrix shape
fn bench_pseudo_inverse(c: &mut Criterion) {
    let mut rng = Pcg64::seed_from_u64(2);
    let mut group = c.benchmark_group("pseudo_inverse");

    for poses in [6, 12, 50] {
        let mut m = Matrix::zeros(4, poses);
        for j in 0..poses {
            for i in 0..3 {
                m.set(i, j, rng.random_range(-1.0..1.0)).unwrap();
            }
            m.set(3, j, 1.0).unwrap();
        }
        group.bench_with_input(BenchmarkId::from_parameter(poses), &m, |b, m| {
            b.iter(|| black_box(pseudo_inverse(m).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark the full least-squares solve
fn bench_solve(c: &mut Criterion) {
    let solver = CalibrationSolver::new();
    let mut group = c.benchmark_group("calibration_solve");

    for count in [6, 12, 50] {
        let poses = generate_poses(count, 3);
        group.bench_with_input(BenchmarkId::from_parameter(count), &poses, |b, poses| {
            b.iter(|| black_box(solver.solve(poses).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark runtime correction of a single reading
fn bench_apply(c: &mut Criterion) {
    let model = generate_model();
    let raw = Vector3::new(0.02, -0.03, 0.98);

    c.bench_function("calibration_apply", |b| {
        b.iter(|| black_box(model.apply_vector3(black_box(raw))))
    });
}

/// Benchmark a batch of corrections, as done for a buffered sensor read
fn bench_apply_batch(c: &mut Criterion) {
    let model = generate_model();
    let readings: Vec<Vector3<f32>> = generate_poses(100, 4)
        .into_iter()
        .map(|pose| pose.measured)
        .collect();

    c.bench_function("calibration_apply_batch_100", |b| {
        b.iter(|| {
            for &raw in &readings {
                black_box(model.apply_vector3(raw));
            }
        })
    });
}

/// Benchmark the text persistence round trip
fn bench_persistence(c: &mut Criterion) {
    let model = generate_model();
    let text = model.to_text();

    c.bench_function("calibration_to_text", |b| b.iter(|| black_box(model.to_text())));
    c.bench_function("calibration_parse", |b| {
        b.iter(|| black_box(CalibrationModel::parse(black_box(&text)).unwrap()))
    });
}

criterion_group!(
    benches,
    bench_invert,
    bench_pseudo_inverse,
    bench_solve,
    bench_apply,
    bench_apply_batch,
    bench_persistence
);

criterion_main!(benches);
