//! Benchmarks for the Levenberg-Marquardt fitter and the linear solver.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lmmc_rs::models::enzyme;
use lmmc_rs::utils::gauss_jordan;
use lmmc_rs::{DataSet, Deviations, FitProblem, LevenbergMarquardt, ParameterMask};
use ndarray::{array, Array1, Array2};

fn bench_michaelis_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("michaelis_fit");

    for n in [5, 20, 100] {
        let s: Vec<f64> = (1..=n).map(|i| 20.0 * i as f64 / n as f64).collect();
        let data = DataSet::from_points(&s).unwrap();
        // deterministic wobble instead of random noise
        let observed: Array1<f64> = data
            .evaluate(&enzyme::MICHAELIS, &[10.0, 5.0])
            .iter()
            .enumerate()
            .map(|(i, y)| y + 0.05 * ((i as f64) * 1.7).sin())
            .collect();
        let problem = FitProblem::new(&enzyme::MICHAELIS, &data, &observed)
            .unwrap()
            .with_deviations(Deviations::Uniform(0.05))
            .unwrap();
        let lm = LevenbergMarquardt::new();
        let mask = ParameterMask::all_free(2);
        let guess = array![8.0, 3.0];

        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| lm.fit(black_box(&problem), black_box(&guess), &mask))
        });
    }

    group.finish();
}

fn bench_gauss_jordan(c: &mut Criterion) {
    let mut group = c.benchmark_group("gauss_jordan_invert");

    for n in [2, 4, 8, 16] {
        // diagonally dominant, so always invertible
        let a = Array2::from_shape_fn((n, n), |(i, j)| {
            if i == j {
                n as f64 + 1.0
            } else {
                1.0 / (1.0 + (i + 2 * j) as f64)
            }
        });

        group.bench_with_input(BenchmarkId::from_parameter(n), &a, |b, a| {
            b.iter(|| gauss_jordan::invert(black_box(a)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_michaelis_fit, bench_gauss_jordan);
criterion_main!(benches);
