//! Spectral synthesis: turning stars into specific luminosities.

use std::fmt::Debug;
use std::sync::Arc;

use piecewise_pdf::PiecewisePdf;

use crate::integrator::ImfIntegrator;
use crate::intervals::intersect;
use crate::tracks::{StarState, StellarTrackModel};

/// Planck constant (erg s)
const PLANCK_H: f64 = 6.626_070_15e-27;
/// Speed of light (cm/s)
const SPEED_OF_LIGHT: f64 = 2.997_924_58e10;
/// Boltzmann constant (erg/K)
const BOLTZMANN_K: f64 = 1.380_649e-16;
/// Stefan-Boltzmann constant (erg s⁻¹ cm⁻² K⁻⁴)
const STEFAN_BOLTZMANN: f64 = 5.670_374_419e-5;
const ANGSTROM_CM: f64 = 1.0e-8;

/// Computes specific luminosities (L☉/Å) on a fixed wavelength grid.
pub trait SpectralSynthesis: Debug + Send + Sync {
    /// Wavelength grid in Å, ascending.
    fn wavelengths(&self) -> &[f64];

    /// Summed spectrum of individual stars.
    fn spectrum_discrete(&self, stars: &[StarState]) -> Vec<f64>;

    /// Bolometric luminosity (L☉) of the non-stochastic part of a
    /// population of total birth mass `birth_mass` at `age`.
    fn luminosity_continuum(&self, birth_mass: f64, age: f64) -> f64;

    /// Spectrum and bolometric luminosity of the non-stochastic part.
    fn spectrum_continuum(&self, birth_mass: f64, age: f64) -> (Vec<f64>, f64);
}

/// Trapezoid-rule integral of `y` over `x`.
pub fn trapezoid(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| 0.5 * (xs[1] - xs[0]) * (ys[0] + ys[1]))
        .sum()
}

/// Blackbody spectra scaled to each star's bolometric luminosity.
///
/// The continuum is integrated over the IMF outside its stochastic range,
/// restricted to masses still alive at the requested age.
#[derive(Debug, Clone)]
pub struct BlackbodySynthesis {
    wavelengths: Vec<f64>,
    imf: Arc<PiecewisePdf>,
    tracks: Arc<dyn StellarTrackModel>,
    integrator: ImfIntegrator,
}

impl BlackbodySynthesis {
    pub fn new(
        wavelengths: Vec<f64>,
        imf: Arc<PiecewisePdf>,
        tracks: Arc<dyn StellarTrackModel>,
        integrator: ImfIntegrator,
    ) -> Self {
        Self {
            wavelengths,
            imf,
            tracks,
            integrator,
        }
    }

    /// `n` wavelengths log-spaced over `[lambda_min, lambda_max]` Å.
    pub fn log_grid(lambda_min: f64, lambda_max: f64, n: usize) -> Vec<f64> {
        let n = n.max(2);
        let step = (lambda_max / lambda_min).ln() / (n - 1) as f64;
        (0..n).map(|i| lambda_min * (i as f64 * step).exp()).collect()
    }

    /// L_λ (L☉/Å) of a blackbody with bolometric luminosity `luminosity`.
    pub fn blackbody(wavelength: f64, temperature: f64, luminosity: f64) -> f64 {
        let lambda = wavelength * ANGSTROM_CM;
        let x = PLANCK_H * SPEED_OF_LIGHT / (lambda * BOLTZMANN_K * temperature);
        if x > 700.0 {
            return 0.0;
        }
        let b_lambda = 2.0 * PLANCK_H * SPEED_OF_LIGHT * SPEED_OF_LIGHT
            / lambda.powi(5)
            / x.exp_m1();
        // πB/σT⁴ integrates to one over λ; per Å rather than per cm
        luminosity * std::f64::consts::PI * b_lambda * ANGSTROM_CM
            / (STEFAN_BOLTZMANN * temperature.powi(4))
    }

    fn add_star(&self, spectrum: &mut [f64], star: &StarState, weight: f64) {
        let (t, l) = (star.temperature(), star.luminosity());
        for (out, &lambda) in spectrum.iter_mut().zip(&self.wavelengths) {
            *out += weight * Self::blackbody(lambda, t, l);
        }
    }

    /// Weighted states of the alive continuum stars.
    fn continuum_states(&self, birth_mass: f64, age: f64) -> Vec<(f64, StarState)> {
        let alive = intersect(
            &ImfIntegrator::continuum_ranges(&self.imf),
            &self.tracks.alive_intervals(age),
        );
        // Stars below the tracks are unevolved and contribute no light
        let ranges = intersect(&alive, &[(self.tracks.min_mass(), f64::INFINITY)]);
        let nodes: Vec<_> = self
            .integrator
            .nodes(&self.imf, birth_mass, &ranges)
            .into_iter()
            .filter(|n| n.weight > 0.0 && n.mass >= self.tracks.min_mass())
            .collect();
        let masses: Vec<f64> = nodes.iter().map(|n| n.mass).collect();
        nodes
            .iter()
            .map(|n| n.weight)
            .zip(self.tracks.isochrone(age, &masses))
            .collect()
    }
}

impl SpectralSynthesis for BlackbodySynthesis {
    fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    fn spectrum_discrete(&self, stars: &[StarState]) -> Vec<f64> {
        let mut spectrum = vec![0.0; self.wavelengths.len()];
        for star in stars {
            self.add_star(&mut spectrum, star, 1.0);
        }
        spectrum
    }

    fn luminosity_continuum(&self, birth_mass: f64, age: f64) -> f64 {
        self.continuum_states(birth_mass, age)
            .iter()
            .map(|(w, s)| w * s.luminosity())
            .sum()
    }

    fn spectrum_continuum(&self, birth_mass: f64, age: f64) -> (Vec<f64>, f64) {
        let mut spectrum = vec![0.0; self.wavelengths.len()];
        let mut luminosity = 0.0;
        for (w, star) in self.continuum_states(birth_mass, age) {
            self.add_star(&mut spectrum, &star, w);
            luminosity += w * star.luminosity();
        }
        (spectrum, luminosity)
    }
}
