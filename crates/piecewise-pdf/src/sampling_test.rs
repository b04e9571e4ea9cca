use rand::SeedableRng;
use rand_chacha::ChaChaRng;

use crate::sampling::{
    sample_categorical, sample_gaussian, sample_power_law, sample_truncated_exponential,
};

#[test]
fn sample_gaussian_produces_reasonable_values() {
    let mut rng = ChaChaRng::seed_from_u64(42);

    let samples: Vec<f64> = (0..2000)
        .map(|_| sample_gaussian(&mut rng, 5.0, 1.0))
        .collect();
    let mean: f64 = samples.iter().sum::<f64>() / samples.len() as f64;
    assert!(
        (mean - 5.0).abs() < 0.1,
        "Mean {} should be close to 5.0",
        mean
    );

    let variance: f64 =
        samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / samples.len() as f64;
    let std_dev = variance.sqrt();
    assert!(
        (std_dev - 1.0).abs() < 0.1,
        "Std dev {} should be close to 1.0",
        std_dev
    );
}

#[test]
fn sample_power_law_respects_bounds() {
    let mut rng = ChaChaRng::seed_from_u64(42);

    for alpha in [-2.35, -1.0, 0.0, 1.5] {
        for _ in 0..200 {
            let sample = sample_power_law(0.5, 10.0, alpha, &mut rng);
            assert!(
                (0.5..=10.0).contains(&sample),
                "Sample {} outside [0.5, 10] for alpha {}",
                sample,
                alpha
            );
        }
    }
}

#[test]
fn sample_power_law_log_slope_has_log_uniform_median() {
    let mut rng = ChaChaRng::seed_from_u64(7);

    let mut samples: Vec<f64> = (0..4001)
        .map(|_| sample_power_law(1.0, 100.0, -1.0, &mut rng))
        .collect();
    samples.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let median = samples[2000];

    // x^-1 is uniform in log x, so the median sits at sqrt(1 * 100)
    assert!(
        (median - 10.0).abs() < 1.5,
        "Median {} should be close to 10",
        median
    );
}

#[test]
fn truncated_exponential_stays_in_range_and_favours_low_end() {
    let mut rng = ChaChaRng::seed_from_u64(3);

    let samples: Vec<f64> = (0..2000)
        .map(|_| sample_truncated_exponential(2.0, 12.0, 1.0, &mut rng))
        .collect();
    assert!(samples.iter().all(|&x| (2.0..=12.0).contains(&x)));

    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    // Mean of an untruncated exponential offset by 2 is 3; truncation at 12 barely matters
    assert!((mean - 3.0).abs() < 0.1, "Mean {} should be near 3", mean);
}

#[test]
fn categorical_skips_zero_weights() {
    let mut rng = ChaChaRng::seed_from_u64(11);
    let weights = [0.0, 0.25, 0.0, 0.75];

    let mut counts = [0usize; 4];
    for _ in 0..4000 {
        let i = sample_categorical(&weights, &mut rng).unwrap();
        counts[i] += 1;
    }
    assert_eq!(counts[0], 0);
    assert_eq!(counts[2], 0);
    let frac = counts[3] as f64 / 4000.0;
    assert!((frac - 0.75).abs() < 0.03, "fraction {} should be ~0.75", frac);

    assert_eq!(sample_categorical(&[0.0, 0.0], &mut rng), None);
}
