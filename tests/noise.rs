//! Statistical checks of the noise streams.

use lmmc_rs::noise::{repetition_seeds, MinStd, NoiseGenerator, NoiseSource, RandUniform};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

fn draws<N: NoiseSource>(noise: &mut N, n: usize) -> Vec<f64> {
    (0..n).map(|_| noise.next_deviate()).collect()
}

fn fraction_within(samples: &[f64], k: f64) -> f64 {
    samples.iter().filter(|x| x.abs() <= k).count() as f64 / samples.len() as f64
}

#[test]
fn test_polar_deviates_follow_the_normal_law() {
    let samples = draws(&mut NoiseGenerator::seeded(2024), 20_000);

    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (samples.len() - 1) as f64;
    assert!(mean.abs() < 0.03, "mean = {}", mean);
    assert!((var - 1.0).abs() < 0.05, "variance = {}", var);

    // 68.27% and 95.45% of the mass
    assert!((fraction_within(&samples, 1.0) - 0.6827).abs() < 0.015);
    assert!((fraction_within(&samples, 2.0) - 0.9545).abs() < 0.01);
}

#[test]
fn test_polar_over_chacha_uniforms() {
    let mut noise = NoiseGenerator::new(RandUniform(ChaCha8Rng::seed_from_u64(5)));
    let samples = draws(&mut noise, 20_000);
    assert!((fraction_within(&samples, 1.0) - 0.6827).abs() < 0.015);
}

#[test]
fn test_minstd_drives_rand_distr() {
    let mut rng = MinStd::seed_from_u64(31);
    let normal = Normal::new(3.0, 0.5).unwrap();
    let samples: Vec<f64> = (0..20_000).map(|_| normal.sample(&mut rng)).collect();
    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    assert!((mean - 3.0).abs() < 0.02, "mean = {}", mean);
}

#[test]
fn test_streams_are_reproducible_and_distinct() {
    let seeds = repetition_seeds(10, 2);
    let a = draws(&mut NoiseGenerator::seeded(seeds[0]), 100);
    let b = draws(&mut NoiseGenerator::seeded(repetition_seeds(10, 1)[0]), 100);
    let c = draws(&mut NoiseGenerator::seeded(seeds[1]), 100);
    assert_eq!(a, b);
    assert_ne!(a, c);
}
