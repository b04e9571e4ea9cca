//! Special functions for closed-form segment integrals.

use statrs::function::gamma::{checked_gamma_ui, gamma};

pub use statrs::function::erf::{erf, erfc, erfc_inv};

/// Upper incomplete gamma function Γ(s, x) for any real shape `s`.
///
/// Positive shapes go straight to `statrs`. Non-positive shapes use the
/// downward recurrence Γ(s, x) = (Γ(s + 1, x) − xˢ e⁻ˣ) / s until the
/// shape reaches zero, where Γ(0, x) = E₁(x).
pub fn upper_gamma(s: f64, x: f64) -> f64 {
    if x.is_infinite() {
        return 0.0;
    }
    if x <= 0.0 {
        return if s > 0.0 { gamma(s) } else { f64::INFINITY };
    }
    if s > 0.0 {
        return checked_gamma_ui(s, x).unwrap_or(f64::NAN);
    }
    if s == 0.0 {
        return exp_integral_e1(x);
    }
    (upper_gamma(s + 1.0, x) - x.powf(s) * (-x).exp()) / s
}

/// Exponential integral E₁(x) for x > 0.
pub fn exp_integral_e1(x: f64) -> f64 {
    const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;
    const MAX_TERMS: usize = 200;

    if x <= 0.0 {
        return f64::INFINITY;
    }
    if x <= 1.0 {
        // Power series
        let mut sum = 0.0;
        let mut term = 1.0;
        for k in 1..MAX_TERMS {
            let k = k as f64;
            term *= -x / k;
            let delta = -term / k;
            sum += delta;
            if delta.abs() < 1e-17 * sum.abs() {
                break;
            }
        }
        -EULER_GAMMA - x.ln() + sum
    } else {
        // Continued fraction (modified Lentz)
        let tiny = 1e-300;
        let mut b = x + 1.0;
        let mut c = 1.0 / tiny;
        let mut d = 1.0 / b;
        let mut h = d;
        for i in 1..MAX_TERMS {
            let a = -((i * i) as f64);
            b += 2.0;
            d = 1.0 / (a * d + b);
            c = b + a / c;
            let del = c * d;
            h *= del;
            if (del - 1.0).abs() < 1e-16 {
                break;
            }
        }
        h * (-x).exp()
    }
}
