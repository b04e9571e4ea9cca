//! Numerical integration of functions over an IMF-weighted mass range.
//!
//! The continuum (non-stochastic) part of a population has no individual
//! stars, so its alive mass, remnant mass, luminosity and yields are
//! integrals of per-star quantities against the number of stars per unit
//! mass. For a population of total birth mass `M`,
//!
//! ```text
//! dN/dm = M · p(m) / ∫ m p(m) dm
//! ```
//!
//! Quadrature uses a log-spaced grid with the trapezoid rule in `ln m`,
//! with the grid broken at every IMF segment edge.

use std::f64::consts::LN_10;

use piecewise_pdf::PiecewisePdf;
use serde::{Deserialize, Serialize};

use crate::intervals::split_at;

/// One quadrature point: a mass and the number of stars it stands for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuadratureNode {
    pub mass: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImfIntegrator {
    points_per_decade: usize,
}

impl Default for ImfIntegrator {
    fn default() -> Self {
        Self {
            points_per_decade: 64,
        }
    }
}

impl ImfIntegrator {
    pub fn new(points_per_decade: usize) -> Self {
        Self {
            points_per_decade: points_per_decade.max(4),
        }
    }

    pub fn points_per_decade(&self) -> usize {
        self.points_per_decade
    }

    /// The parts of the IMF domain outside its stochastic range.
    pub fn continuum_ranges(imf: &PiecewisePdf) -> Vec<(f64, f64)> {
        if !imf.has_stochastic_range() {
            return Vec::new();
        }
        [
            (imf.x_min(), imf.stochastic_min()),
            (imf.stochastic_max(), imf.x_max()),
        ]
        .into_iter()
        .filter(|(lo, hi)| lo < hi)
        .collect()
    }

    fn total_moment(imf: &PiecewisePdf) -> f64 {
        imf.moment_between(imf.x_min(), imf.x_max())
    }

    /// Number of stars in `[a, b]` for a population of `birth_mass`.
    pub fn number_between(imf: &PiecewisePdf, birth_mass: f64, a: f64, b: f64) -> f64 {
        birth_mass * imf.integral_between(a, b) / Self::total_moment(imf)
    }

    /// Birth mass of the stars in `[a, b]` for a population of `birth_mass`.
    pub fn mass_between(imf: &PiecewisePdf, birth_mass: f64, a: f64, b: f64) -> f64 {
        birth_mass * imf.moment_between(a, b) / Self::total_moment(imf)
    }

    /// Quadrature nodes covering `ranges`, clipped to the IMF domain.
    pub fn nodes(
        &self,
        imf: &PiecewisePdf,
        birth_mass: f64,
        ranges: &[(f64, f64)],
    ) -> Vec<QuadratureNode> {
        let moment = Self::total_moment(imf);
        if !(moment > 0.0) || birth_mass == 0.0 {
            return Vec::new();
        }
        let scale = birth_mass / moment;

        let clipped: Vec<(f64, f64)> = ranges
            .iter()
            .map(|&(lo, hi)| (lo.max(imf.x_min()), hi.min(imf.x_max())))
            .filter(|(lo, hi)| lo < hi)
            .collect();
        let edges: Vec<f64> = imf
            .segments()
            .iter()
            .flat_map(|s| [s.x_min(), s.x_max()])
            .collect();

        let mut nodes = Vec::new();
        for (lo, hi) in split_at(&clipped, &edges) {
            self.push_range(imf, scale, lo, hi, &mut nodes);
        }
        nodes
    }

    fn push_range(
        &self,
        imf: &PiecewisePdf,
        scale: f64,
        lo: f64,
        hi: f64,
        nodes: &mut Vec<QuadratureNode>,
    ) {
        let log_grid = lo > 0.0;
        let (span, n) = if log_grid {
            let span = (hi / lo).ln();
            let n = (span / LN_10 * self.points_per_decade as f64).ceil() as usize;
            (span, n.max(2))
        } else {
            (hi - lo, (self.points_per_decade * 4).max(2))
        };
        let h = span / n as f64;

        for i in 0..=n {
            let (mass, density) = if i == n {
                (hi, density_below(imf, hi))
            } else if log_grid {
                let m = lo * (i as f64 * h).exp();
                (m, imf.density(m))
            } else {
                let m = lo + i as f64 * h;
                (m, imf.density(m))
            };
            let end = if i == 0 || i == n { 0.5 } else { 1.0 };
            // Trapezoid in ln m picks up the Jacobian dm = m d(ln m)
            let jacobian = if log_grid { mass } else { 1.0 };
            nodes.push(QuadratureNode {
                mass,
                weight: end * h * jacobian * density * scale,
            });
        }
    }

    /// ∫ f(m) dN/dm dm over `ranges`.
    pub fn integrate(
        &self,
        imf: &PiecewisePdf,
        birth_mass: f64,
        ranges: &[(f64, f64)],
        f: impl Fn(f64) -> f64,
    ) -> f64 {
        self.nodes(imf, birth_mass, ranges)
            .iter()
            .map(|node| node.weight * f(node.mass))
            .sum()
    }
}

/// Density approached from below `x`, so the top of a sub-range never
/// reads the next segment's value at a shared breakpoint.
fn density_below(imf: &PiecewisePdf, x: f64) -> f64 {
    let sum: f64 = imf
        .segments()
        .iter()
        .zip(imf.weights())
        .filter(|(seg, _)| seg.x_min() < x && x <= seg.x_max())
        .map(|(seg, w)| w * seg.density(x))
        .sum();
    imf.normalization() * sum
}
