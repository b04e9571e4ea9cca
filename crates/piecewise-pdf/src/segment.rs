//! Analytic distribution segments.
//!
//! Every segment carries its own normalization so that its density
//! integrates to one over `[x_min, x_max]`. Relative weights between
//! segments are the business of [`crate::PiecewisePdf`].

use std::f64::consts::{LN_10, PI, SQRT_2};

use rand::Rng;
use rand_chacha::ChaChaRng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{PdfError, Result};
use crate::sampling::{
    sample_gaussian, sample_power_law, sample_truncated_exponential, uniform_open,
};
use crate::special::{erf, erfc, erfc_inv, upper_gamma};

/// Rejection loops give up after this many proposals
const MAX_REJECTION_TRIES: usize = 10_000;

/// The analytic form of a segment and its shape parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SegmentKind {
    /// p(x) ∝ x^slope
    PowerLaw { slope: f64 },
    /// p(x) ∝ exp(−(x − mean)² / 2σ²)
    Normal { mean: f64, dispersion: f64 },
    /// p(x) ∝ exp(−(log x − log mean)² / 2σ²) / x, with σ in dex
    Lognormal { mean: f64, dispersion: f64 },
    /// p(x) ∝ exp(−x / scale)
    Exponential { scale: f64 },
    /// p(x) ∝ x^slope exp(−x / cutoff)
    Schechter { slope: f64, cutoff: f64 },
}

impl SegmentKind {
    /// Builds a kind from a type name and a flat parameter list, the form a
    /// distribution-file reader hands over.
    pub fn from_name(name: &str, params: &[f64]) -> Result<Self> {
        let expect = |kind: &'static str, n: usize| -> Result<()> {
            if params.len() == n {
                Ok(())
            } else {
                Err(PdfError::ParameterCount {
                    kind,
                    expected: n,
                    found: params.len(),
                })
            }
        };

        match name.to_ascii_lowercase().as_str() {
            "powerlaw" | "power_law" => {
                expect("powerlaw", 1)?;
                Ok(Self::PowerLaw { slope: params[0] })
            }
            "normal" => {
                expect("normal", 2)?;
                Ok(Self::Normal {
                    mean: params[0],
                    dispersion: params[1],
                })
            }
            "lognormal" => {
                expect("lognormal", 2)?;
                Ok(Self::Lognormal {
                    mean: params[0],
                    dispersion: params[1],
                })
            }
            "exponential" => {
                expect("exponential", 1)?;
                Ok(Self::Exponential { scale: params[0] })
            }
            "schechter" => {
                expect("schechter", 2)?;
                Ok(Self::Schechter {
                    slope: params[0],
                    cutoff: params[1],
                })
            }
            _ => Err(PdfError::UnknownSegmentType(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::PowerLaw { .. } => "powerlaw",
            Self::Normal { .. } => "normal",
            Self::Lognormal { .. } => "lognormal",
            Self::Exponential { .. } => "exponential",
            Self::Schechter { .. } => "schechter",
        }
    }

    /// Unnormalized shape function.
    fn shape(&self, x: f64) -> f64 {
        match *self {
            Self::PowerLaw { slope } => x.powf(slope),
            Self::Normal { mean, dispersion } => {
                (-(x - mean).powi(2) / (2.0 * dispersion * dispersion)).exp()
            }
            Self::Lognormal { mean, dispersion } => {
                let s = dispersion * LN_10;
                (-(x.ln() - mean.ln()).powi(2) / (2.0 * s * s)).exp() / x
            }
            Self::Exponential { scale } => (-x / scale).exp(),
            Self::Schechter { slope, cutoff } => x.powf(slope) * (-x / cutoff).exp(),
        }
    }

    /// ∫ₐᵇ shape(x) dx, for a ≤ b inside the domain.
    fn shape_integral(&self, a: f64, b: f64) -> f64 {
        match *self {
            Self::PowerLaw { slope } => power_integral(a, b, slope),
            Self::Normal { mean, dispersion } => {
                let z = |x: f64| (x - mean) / (dispersion * SQRT_2);
                dispersion * (PI / 2.0).sqrt() * erf_diff(z(a), z(b))
            }
            Self::Lognormal { mean, dispersion } => {
                let s = dispersion * LN_10;
                let mu = mean.ln();
                let z = |x: f64| (x.ln() - mu) / (s * SQRT_2);
                s * (PI / 2.0).sqrt() * erf_diff(z(a), z(b))
            }
            Self::Exponential { scale } => scale * ((-a / scale).exp() - (-b / scale).exp()),
            Self::Schechter { slope, cutoff } => {
                cutoff.powf(slope + 1.0)
                    * (upper_gamma(slope + 1.0, a / cutoff) - upper_gamma(slope + 1.0, b / cutoff))
            }
        }
    }

    /// ∫ₐᵇ x·shape(x) dx, for a ≤ b inside the domain.
    fn shape_moment(&self, a: f64, b: f64) -> f64 {
        match *self {
            Self::PowerLaw { slope } => power_integral(a, b, slope + 1.0),
            Self::Normal { mean, dispersion } => {
                let var = dispersion * dispersion;
                mean * self.shape_integral(a, b) + var * (self.shape(a) - self.shape(b))
            }
            Self::Lognormal { mean, dispersion } => {
                // Substituting y = ln x turns x·p(x)dx into a shifted Gaussian in y
                let s = dispersion * LN_10;
                let mu = mean.ln();
                let z = |x: f64| (x.ln() - mu - s * s) / (s * SQRT_2);
                (mu + 0.5 * s * s).exp() * s * (PI / 2.0).sqrt() * erf_diff(z(a), z(b))
            }
            Self::Exponential { scale } => {
                scale * (a + scale) * (-a / scale).exp() - scale * (b + scale) * (-b / scale).exp()
            }
            Self::Schechter { slope, cutoff } => {
                cutoff.powf(slope + 2.0)
                    * (upper_gamma(slope + 2.0, a / cutoff) - upper_gamma(slope + 2.0, b / cutoff))
            }
        }
    }
}

/// erf(zb) − erf(za), taken through erfc on either tail so it does not
/// cancel to zero far from the mean.
fn erf_diff(za: f64, zb: f64) -> f64 {
    if za >= 0.0 {
        erfc(za) - erfc(zb)
    } else if zb <= 0.0 {
        erfc(-zb) - erfc(-za)
    } else {
        erf(zb) - erf(za)
    }
}

/// ∫ₐᵇ x^p dx with the logarithmic case at p = −1.
fn power_integral(a: f64, b: f64, p: f64) -> f64 {
    let p1 = p + 1.0;
    if p1.abs() < 1e-12 {
        (b / a).ln()
    } else {
        (b.powf(p1) - a.powf(p1)) / p1
    }
}

/// One analytic piece of a piecewise distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SegmentSpec", into = "SegmentSpec")]
pub struct Segment {
    x_min: f64,
    x_max: f64,
    kind: SegmentKind,
    norm: f64,
}

#[derive(Serialize, Deserialize)]
struct SegmentSpec {
    x_min: f64,
    x_max: f64,
    #[serde(flatten)]
    kind: SegmentKind,
}

impl TryFrom<SegmentSpec> for Segment {
    type Error = PdfError;

    fn try_from(spec: SegmentSpec) -> Result<Self> {
        Segment::new(spec.x_min, spec.x_max, spec.kind)
    }
}

impl From<Segment> for SegmentSpec {
    fn from(seg: Segment) -> Self {
        SegmentSpec {
            x_min: seg.x_min,
            x_max: seg.x_max,
            kind: seg.kind,
        }
    }
}

impl Segment {
    /// Creates a normalized segment, validating the domain and parameters.
    pub fn new(x_min: f64, x_max: f64, kind: SegmentKind) -> Result<Self> {
        let invalid = |reason: &str| PdfError::InvalidSegment {
            kind: kind.name(),
            x_min,
            x_max,
            reason: reason.to_string(),
        };

        if !x_min.is_finite() || !x_max.is_finite() {
            return Err(invalid("domain must be finite"));
        }
        if x_min >= x_max {
            return Err(invalid("x_min must be below x_max"));
        }

        match kind {
            SegmentKind::PowerLaw { slope } => {
                if !slope.is_finite() {
                    return Err(invalid("slope must be finite"));
                }
                if x_min < 0.0 || (x_min == 0.0 && slope < 0.0) {
                    return Err(invalid("power law needs x_min > 0 for a negative slope"));
                }
            }
            SegmentKind::Normal { mean, dispersion } => {
                if !mean.is_finite() || !(dispersion > 0.0) || !dispersion.is_finite() {
                    return Err(invalid("dispersion must be positive"));
                }
            }
            SegmentKind::Lognormal { mean, dispersion } => {
                if !(mean > 0.0) || !(dispersion > 0.0) || !dispersion.is_finite() {
                    return Err(invalid("mean and dispersion must be positive"));
                }
                if x_min <= 0.0 {
                    return Err(invalid("lognormal needs x_min > 0"));
                }
            }
            SegmentKind::Exponential { scale } => {
                if !(scale > 0.0) || !scale.is_finite() {
                    return Err(invalid("scale must be positive"));
                }
            }
            SegmentKind::Schechter { slope, cutoff } => {
                if !slope.is_finite() || !(cutoff > 0.0) || !cutoff.is_finite() {
                    return Err(invalid("cutoff must be positive"));
                }
                if x_min < 0.0 || (x_min == 0.0 && slope < 0.0) {
                    return Err(invalid("schechter needs x_min > 0 for a negative slope"));
                }
            }
        }

        let area = kind.shape_integral(x_min, x_max);
        if !(area > 0.0) || !area.is_finite() {
            return Err(invalid("density does not integrate to a positive finite value"));
        }

        Ok(Self {
            x_min,
            x_max,
            kind,
            norm: 1.0 / area,
        })
    }

    pub fn x_min(&self) -> f64 {
        self.x_min
    }

    pub fn x_max(&self) -> f64 {
        self.x_max
    }

    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    /// Normalized density; zero outside the segment.
    pub fn density(&self, x: f64) -> f64 {
        if x < self.x_min || x > self.x_max {
            return 0.0;
        }
        self.norm * self.kind.shape(x)
    }

    /// Density at the lower edge
    pub fn min_value(&self) -> f64 {
        self.density(self.x_min)
    }

    /// Density at the upper edge
    pub fn max_value(&self) -> f64 {
        self.density(self.x_max)
    }

    /// Clips `[a, b]` to the segment, or `None` if they do not overlap.
    pub fn overlap(&self, a: f64, b: f64) -> Option<(f64, f64)> {
        if a > b || b < self.x_min || a > self.x_max {
            return None;
        }
        Some((a.max(self.x_min), b.min(self.x_max)))
    }

    fn domain_error(&self, a: f64, b: f64) -> PdfError {
        PdfError::Domain {
            a,
            b,
            x_min: self.x_min,
            x_max: self.x_max,
        }
    }

    /// ∫ p(x) dx over `[a, b] ∩ [x_min, x_max]`.
    pub fn integral(&self, a: f64, b: f64) -> Result<f64> {
        let (lo, hi) = self.overlap(a, b).ok_or_else(|| self.domain_error(a, b))?;
        Ok(self.clipped_integral(lo, hi))
    }

    /// ∫ x·p(x) dx over `[a, b] ∩ [x_min, x_max]`.
    pub fn expectation(&self, a: f64, b: f64) -> Result<f64> {
        let (lo, hi) = self.overlap(a, b).ok_or_else(|| self.domain_error(a, b))?;
        Ok(self.clipped_moment(lo, hi))
    }

    pub(crate) fn clipped_integral(&self, lo: f64, hi: f64) -> f64 {
        if lo >= hi {
            return 0.0;
        }
        if lo == self.x_min && hi == self.x_max {
            return 1.0;
        }
        (self.norm * self.kind.shape_integral(lo, hi)).max(0.0)
    }

    pub(crate) fn clipped_moment(&self, lo: f64, hi: f64) -> f64 {
        if lo >= hi {
            return 0.0;
        }
        (self.norm * self.kind.shape_moment(lo, hi)).max(0.0)
    }

    /// One deviate from the whole segment.
    pub fn draw(&self, rng: &mut ChaChaRng) -> f64 {
        self.draw_clipped(self.x_min, self.x_max, rng)
    }

    /// `n` independent deviates from the whole segment.
    pub fn draw_n(&self, n: usize, rng: &mut ChaChaRng) -> Vec<f64> {
        (0..n).map(|_| self.draw(rng)).collect()
    }

    /// One deviate from the segment truncated to `[a, b]`.
    pub fn draw_in(&self, a: f64, b: f64, rng: &mut ChaChaRng) -> Result<f64> {
        let (lo, hi) = self.overlap(a, b).ok_or_else(|| self.domain_error(a, b))?;
        Ok(self.draw_clipped(lo, hi, rng))
    }

    pub(crate) fn draw_clipped(&self, lo: f64, hi: f64, rng: &mut ChaChaRng) -> f64 {
        if lo >= hi {
            return lo;
        }
        match self.kind {
            SegmentKind::PowerLaw { slope } => sample_power_law(lo, hi, slope, rng),
            SegmentKind::Exponential { scale } => sample_truncated_exponential(lo, hi, scale, rng),
            SegmentKind::Normal { mean, dispersion } => {
                draw_truncated_gaussian(mean, dispersion, lo, hi, rng)
            }
            SegmentKind::Lognormal { mean, dispersion } => {
                let y = draw_truncated_gaussian(mean.ln(), dispersion * LN_10, lo.ln(), hi.ln(), rng);
                y.exp().clamp(lo, hi)
            }
            SegmentKind::Schechter { slope, cutoff } => {
                draw_schechter(slope, cutoff, lo, hi, rng)
            }
        }
    }
}

/// Gaussian truncated to `[lo, hi]`.
///
/// Plain rejection against the untruncated Gaussian. If the window sits so
/// far in a tail that rejection stalls, falls back to inverting the CDF.
fn draw_truncated_gaussian(mean: f64, sigma: f64, lo: f64, hi: f64, rng: &mut ChaChaRng) -> f64 {
    for _ in 0..MAX_REJECTION_TRIES {
        let x = sample_gaussian(rng, mean, sigma);
        if (lo..=hi).contains(&x) {
            return x;
        }
    }
    warn!(mean, sigma, lo, hi, "gaussian rejection stalled; inverting CDF");
    // Work in the tail on the far side of the mean so the CDF keeps precision
    if hi < mean {
        return 2.0 * mean - draw_gaussian_upper_tail(mean, sigma, 2.0 * mean - hi, 2.0 * mean - lo, rng);
    }
    draw_gaussian_upper_tail(mean, sigma, lo, hi, rng)
}

fn draw_gaussian_upper_tail(mean: f64, sigma: f64, lo: f64, hi: f64, rng: &mut ChaChaRng) -> f64 {
    let survival = |x: f64| erfc((x - mean) / (sigma * SQRT_2));
    let (s_lo, s_hi) = (survival(lo), survival(hi));
    let u = s_hi + rng.random::<f64>() * (s_lo - s_hi);
    if !(u > 0.0) {
        return lo;
    }
    (mean + sigma * SQRT_2 * erfc_inv(u)).clamp(lo, hi)
}

/// Schechter deviate by rejection.
///
/// For a falling power law the proposal is x^slope and the acceptance is the
/// exponential cutoff relative to its value at `lo`. For a rising power law
/// the proposal is the truncated exponential and the acceptance is
/// (x/hi)^slope.
fn draw_schechter(slope: f64, cutoff: f64, lo: f64, hi: f64, rng: &mut ChaChaRng) -> f64 {
    let mut x = lo;
    for _ in 0..MAX_REJECTION_TRIES {
        let accept = if slope < 0.0 {
            x = sample_power_law(lo, hi, slope, rng);
            (-(x - lo) / cutoff).exp()
        } else {
            x = sample_truncated_exponential(lo, hi, cutoff, rng);
            (x / hi).powf(slope)
        };
        if uniform_open(rng) <= accept {
            return x;
        }
    }
    warn!(slope, cutoff, lo, hi, "schechter rejection stalled");
    x
}
