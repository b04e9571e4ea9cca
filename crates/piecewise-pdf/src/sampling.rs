//! Random variate helpers shared by the segment samplers.

use std::f64::consts::PI;

use rand::Rng;
use rand_chacha::ChaChaRng;

/// Uniform deviate on (0, 1], safe to pass to `ln`.
pub fn uniform_open(rng: &mut ChaChaRng) -> f64 {
    1.0 - rng.random::<f64>()
}

/// Sample from a Gaussian (normal) distribution using Box-Muller transform
///
/// # Arguments
/// * `rng` - Random number generator
/// * `mean` - Mean of the distribution
/// * `std_dev` - Standard deviation
pub fn sample_gaussian(rng: &mut ChaChaRng, mean: f64, std_dev: f64) -> f64 {
    let u1 = uniform_open(rng);
    let u2: f64 = rng.random();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    mean + std_dev * z
}

/// Sample from a power-law distribution
///
/// Samples from p(x) ∝ x^α between x_min and x_max using inverse transform
/// sampling. The α = −1 case has a logarithmic CDF and is inverted as
/// x = x_min · (x_max/x_min)^u.
pub fn sample_power_law(x_min: f64, x_max: f64, alpha: f64, rng: &mut ChaChaRng) -> f64 {
    let u: f64 = rng.random();
    let alpha1 = alpha + 1.0;
    if alpha1.abs() < 1e-12 {
        return x_min * (x_max / x_min).powf(u);
    }
    let lo = x_min.powf(alpha1);
    let hi = x_max.powf(alpha1);
    (lo + u * (hi - lo)).powf(1.0 / alpha1).clamp(x_min, x_max)
}

/// Sample from an exponential p(x) ∝ e^(−x/scale) truncated to [x_min, x_max]
pub fn sample_truncated_exponential(
    x_min: f64,
    x_max: f64,
    scale: f64,
    rng: &mut ChaChaRng,
) -> f64 {
    let u: f64 = rng.random();
    let span = -(-(x_max - x_min) / scale).exp_m1();
    (x_min - scale * (-u * span).ln_1p()).clamp(x_min, x_max)
}

/// Pick an index with probability proportional to `weights`.
///
/// Walks the cumulative weights until the uniform threshold is passed.
/// Zero-weight entries are never selected. Returns `None` if every weight
/// is zero.
pub fn sample_categorical(weights: &[f64], rng: &mut ChaChaRng) -> Option<usize> {
    let total: f64 = weights.iter().sum();
    if !(total > 0.0) {
        return None;
    }
    let threshold = rng.random::<f64>() * total;
    let mut cumulative = 0.0;
    let mut last_nonzero = None;
    for (i, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        cumulative += w;
        last_nonzero = Some(i);
        if threshold < cumulative {
            return Some(i);
        }
    }
    // Rounding can leave the threshold a hair above the final sum
    last_nonzero
}
