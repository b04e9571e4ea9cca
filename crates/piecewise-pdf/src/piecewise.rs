//! Composite distribution over an ordered set of weighted segments.

use rand_chacha::ChaChaRng;
use serde::{Deserialize, Serialize};

use crate::error::{PdfError, Result};
use crate::sampling::sample_categorical;
use crate::segment::{Segment, SegmentKind};

/// How a population draw decides when it has reached its target sum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMethod {
    /// Keep or drop the final draw, whichever lands closer to the target
    #[default]
    StopNearest,
    /// Drop the draw that would exceed the target
    StopBefore,
    /// Keep the draw that exceeds the target
    StopAfter,
    /// Keep or drop the final draw on a fair coin flip
    #[serde(rename = "stop_50")]
    Stop50,
    /// Draw the expected number of objects, rounded
    Number,
    /// Draw a Poisson-distributed number of objects
    Poisson,
    /// Overshoot, sort, then drop the largest objects while that helps
    SortedSampling,
}

/// A probability distribution assembled from weighted [`Segment`]s.
///
/// Weights always sum to one. An optional overall normalization scales
/// the density and every integral, which lets the same type describe a
/// star formation history (integrating to the mass formed) as well as a
/// unit-normalized mass function.
///
/// A sub-range `[stochastic_min, stochastic_max]` marks the part of the
/// domain sampled object by object. Everything outside it is left to the
/// caller to treat as a continuum.
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewisePdf {
    segments: Vec<Segment>,
    weights: Vec<f64>,
    x_min: f64,
    x_max: f64,
    stochastic_min: f64,
    stochastic_max: f64,
    method: SamplingMethod,
    normalization: f64,

    // Cached with unit normalization
    integral_total: f64,
    moment_total: f64,
    integral_restricted: f64,
    moment_restricted: f64,
    restricted_weights: Vec<f64>,
}

impl PiecewisePdf {
    /// Builds a distribution from segments that share breakpoints.
    ///
    /// `breakpoints` has one more entry than `kinds`. Weights are chosen so
    /// the composite density is continuous at every interior breakpoint.
    pub fn from_breakpoints(breakpoints: &[f64], kinds: &[SegmentKind]) -> Result<Self> {
        if kinds.is_empty() {
            return Err(PdfError::Empty);
        }
        if breakpoints.len() != kinds.len() + 1 {
            return Err(PdfError::BreakpointCount {
                segments: kinds.len(),
                expected: kinds.len() + 1,
                found: breakpoints.len(),
            });
        }
        if let Some(index) = breakpoints.windows(2).position(|w| !(w[0] < w[1])) {
            return Err(PdfError::NonIncreasingBreakpoints { index: index + 1 });
        }

        let segments = kinds
            .iter()
            .enumerate()
            .map(|(i, kind)| Segment::new(breakpoints[i], breakpoints[i + 1], *kind))
            .collect::<Result<Vec<_>>>()?;

        // w[i] · p[i](x_b) = w[i-1] · p[i-1](x_b) at every breakpoint x_b
        let mut weights = Vec::with_capacity(segments.len());
        weights.push(1.0);
        for i in 1..segments.len() {
            let below = segments[i - 1].max_value();
            let above = segments[i].min_value();
            if !(above > 0.0) || !below.is_finite() {
                return Err(PdfError::Discontinuous { index: i });
            }
            weights.push(weights[i - 1] * below / above);
        }

        Self::from_parts(segments, weights)
    }

    /// Builds a distribution from segments with explicit relative weights.
    ///
    /// Segments may overlap or leave gaps; no continuity is imposed.
    pub fn from_weighted_segments(segments: Vec<(Segment, f64)>) -> Result<Self> {
        let (segments, weights) = segments.into_iter().unzip();
        Self::from_parts(segments, weights)
    }

    pub fn from_segment(segment: Segment) -> Result<Self> {
        Self::from_parts(vec![segment], vec![1.0])
    }

    fn from_parts(segments: Vec<Segment>, weights: Vec<f64>) -> Result<Self> {
        if segments.is_empty() {
            return Err(PdfError::Empty);
        }
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(PdfError::InvalidWeights);
        }
        let sum: f64 = weights.iter().sum();
        if !(sum > 0.0) || !sum.is_finite() {
            return Err(PdfError::InvalidWeights);
        }
        let weights: Vec<f64> = weights.iter().map(|w| w / sum).collect();

        let x_min = segments
            .iter()
            .map(Segment::x_min)
            .fold(f64::INFINITY, f64::min);
        let x_max = segments
            .iter()
            .map(Segment::x_max)
            .fold(f64::NEG_INFINITY, f64::max);

        let mut pdf = Self {
            segments,
            weights,
            x_min,
            x_max,
            stochastic_min: x_min,
            stochastic_max: x_max,
            method: SamplingMethod::default(),
            normalization: 1.0,
            integral_total: 0.0,
            moment_total: 0.0,
            integral_restricted: 0.0,
            moment_restricted: 0.0,
            restricted_weights: Vec::new(),
        };
        pdf.integral_total = pdf.unit_integral(x_min, x_max);
        pdf.moment_total = pdf.unit_moment(x_min, x_max);
        pdf.refresh_restricted();
        Ok(pdf)
    }

    /// Scales the density so it integrates to `normalization`, which must
    /// be finite and positive.
    pub fn with_normalization(mut self, normalization: f64) -> Result<Self> {
        if !normalization.is_finite() || normalization <= 0.0 {
            return Err(PdfError::InvalidNormalization(normalization));
        }
        self.normalization = normalization;
        Ok(self)
    }

    pub fn with_sampling_method(mut self, method: SamplingMethod) -> Self {
        self.method = method;
        self
    }

    pub fn set_sampling_method(&mut self, method: SamplingMethod) {
        self.method = method;
    }

    pub fn sampling_method(&self) -> SamplingMethod {
        self.method
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn x_min(&self) -> f64 {
        self.x_min
    }

    pub fn x_max(&self) -> f64 {
        self.x_max
    }

    pub fn stochastic_min(&self) -> f64 {
        self.stochastic_min
    }

    pub fn stochastic_max(&self) -> f64 {
        self.stochastic_max
    }

    pub fn normalization(&self) -> f64 {
        self.normalization
    }

    /// Restricts object-by-object sampling to `[min, max]`.
    pub fn set_stochastic_range(&mut self, min: f64, max: f64) -> Result<()> {
        if !(self.x_min <= min && min <= max && max <= self.x_max) {
            return Err(PdfError::StochasticRange {
                min,
                max,
                x_min: self.x_min,
                x_max: self.x_max,
            });
        }
        self.stochastic_min = min;
        self.stochastic_max = max;
        self.refresh_restricted();
        Ok(())
    }

    /// Restricts sampling to `[min, x_max]`.
    pub fn set_stochastic_min(&mut self, min: f64) -> Result<()> {
        self.set_stochastic_range(min, self.x_max)
    }

    pub fn clear_stochastic_range(&mut self) {
        self.stochastic_min = self.x_min;
        self.stochastic_max = self.x_max;
        self.refresh_restricted();
    }

    /// True if part of the domain lies outside the stochastic range.
    pub fn has_stochastic_range(&self) -> bool {
        self.stochastic_min > self.x_min || self.stochastic_max < self.x_max
    }

    fn refresh_restricted(&mut self) {
        let (lo, hi) = (self.stochastic_min, self.stochastic_max);
        self.restricted_weights = self.clipped_weights(lo, hi);
        self.integral_restricted = self.restricted_weights.iter().sum();
        self.moment_restricted = self.unit_moment(lo, hi);
    }

    /// Segment weights multiplied by each segment's probability in `[a, b]`.
    fn clipped_weights(&self, a: f64, b: f64) -> Vec<f64> {
        self.segments
            .iter()
            .zip(&self.weights)
            .map(|(seg, w)| match seg.overlap(a, b) {
                Some((lo, hi)) => w * seg.clipped_integral(lo, hi),
                None => 0.0,
            })
            .collect()
    }

    fn unit_integral(&self, a: f64, b: f64) -> f64 {
        self.clipped_weights(a, b).iter().sum()
    }

    fn unit_moment(&self, a: f64, b: f64) -> f64 {
        self.segments
            .iter()
            .zip(&self.weights)
            .filter_map(|(seg, w)| {
                seg.overlap(a, b)
                    .map(|(lo, hi)| w * seg.clipped_moment(lo, hi))
            })
            .sum()
    }

    /// Density at `x`, summed over every segment covering it.
    ///
    /// Segment intervals are half-open, `[x_min, x_max)`, so a shared
    /// breakpoint is counted once. The upper edge of the whole domain
    /// belongs to the last segment.
    pub fn density(&self, x: f64) -> f64 {
        let sum: f64 = self
            .segments
            .iter()
            .zip(&self.weights)
            .filter(|(seg, _)| {
                (x >= seg.x_min() && x < seg.x_max()) || (x == self.x_max && x == seg.x_max())
            })
            .map(|(seg, w)| w * seg.density(x))
            .sum();
        self.normalization * sum
    }

    /// Integral over the whole domain.
    pub fn integral(&self) -> f64 {
        self.normalization * self.integral_total
    }

    /// Integral over `[a, b]`; zero where it misses the domain.
    pub fn integral_between(&self, a: f64, b: f64) -> f64 {
        self.normalization * self.unit_integral(a, b)
    }

    /// Integral over the stochastic range.
    pub fn integral_restricted(&self) -> f64 {
        self.normalization * self.integral_restricted
    }

    /// Mean of x over the whole domain.
    pub fn expectation_value(&self) -> f64 {
        self.moment_total / self.integral_total
    }

    /// Mean of x over `[a, b]`; zero if the range carries no probability.
    pub fn expectation_between(&self, a: f64, b: f64) -> f64 {
        let integral = self.unit_integral(a, b);
        if integral > 0.0 {
            self.unit_moment(a, b) / integral
        } else {
            0.0
        }
    }

    /// Mean of x over the stochastic range.
    pub fn expectation_restricted(&self) -> f64 {
        if self.integral_restricted > 0.0 {
            self.moment_restricted / self.integral_restricted
        } else {
            0.0
        }
    }

    /// ∫ x·p(x) dx over `[a, b]`, including the normalization.
    pub fn moment_between(&self, a: f64, b: f64) -> f64 {
        self.normalization * self.unit_moment(a, b)
    }

    /// Fraction of objects that fall in the stochastic range.
    pub fn number_fraction_restricted(&self) -> f64 {
        self.integral_restricted / self.integral_total
    }

    /// Fraction of the total x-sum (mass, for an IMF) carried by objects in
    /// the stochastic range.
    pub fn mass_fraction_restricted(&self) -> f64 {
        (self.moment_restricted / self.moment_total).clamp(0.0, 1.0)
    }

    /// Fraction of the total x-sum carried by objects in `[a, b]`.
    pub fn mass_fraction(&self, a: f64, b: f64) -> f64 {
        (self.unit_moment(a, b) / self.moment_total).clamp(0.0, 1.0)
    }

    /// One deviate from the whole distribution.
    pub fn draw(&self, rng: &mut ChaChaRng) -> f64 {
        match self.pick(&self.weights, rng) {
            Some(seg) => seg.draw(rng),
            None => self.x_min,
        }
    }

    /// `n` independent deviates from the whole distribution.
    pub fn draw_many(&self, n: usize, rng: &mut ChaChaRng) -> Vec<f64> {
        (0..n).map(|_| self.draw(rng)).collect()
    }

    /// One deviate from the distribution truncated to `[a, b]`.
    ///
    /// Segments are re-weighted by their probability inside the window;
    /// segments entirely outside it are never chosen.
    pub fn draw_between(&self, a: f64, b: f64, rng: &mut ChaChaRng) -> Result<f64> {
        let weights = self.clipped_weights(a, b);
        let i = sample_categorical(&weights, rng).ok_or(PdfError::Domain {
            a,
            b,
            x_min: self.x_min,
            x_max: self.x_max,
        })?;
        self.segments[i].draw_in(a, b, rng)
    }

    /// One deviate from the stochastic range.
    pub fn draw_restricted(&self, rng: &mut ChaChaRng) -> f64 {
        if !self.has_stochastic_range() {
            return self.draw(rng);
        }
        let (lo, hi) = (self.stochastic_min, self.stochastic_max);
        match sample_categorical(&self.restricted_weights, rng) {
            Some(i) => {
                let seg = &self.segments[i];
                seg.draw_clipped(lo.max(seg.x_min()), hi.min(seg.x_max()), rng)
            }
            None => lo,
        }
    }

    fn pick(&self, weights: &[f64], rng: &mut ChaChaRng) -> Option<&Segment> {
        if self.segments.len() == 1 {
            return self.segments.first();
        }
        sample_categorical(weights, rng).map(|i| &self.segments[i])
    }
}
