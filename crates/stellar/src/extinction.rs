//! Dust extinction.

use std::fmt::Debug;

use piecewise_pdf::PiecewisePdf;
use rand_chacha::ChaChaRng;

/// Reference wavelength of A_V (Å)
const V_BAND_WAVELENGTH: f64 = 5500.0;

pub trait ExtinctionModel: Debug + Send + Sync {
    /// Draws a V-band extinction in magnitudes.
    fn draw_av(&self, rng: &mut ChaChaRng) -> f64;

    /// Attenuates `l_lambda` by the extinction curve scaled to `av`.
    fn apply(&self, av: f64, wavelengths: &[f64], l_lambda: &[f64]) -> Vec<f64>;
}

/// A_λ = A_V (λ / 5500 Å)^(−exponent), with A_V drawn from a PDF.
#[derive(Debug, Clone)]
pub struct PowerLawExtinction {
    av: PiecewisePdf,
    exponent: f64,
}

impl PowerLawExtinction {
    pub fn new(av: PiecewisePdf, exponent: f64) -> Self {
        Self { av, exponent }
    }

    pub fn av_distribution(&self) -> &PiecewisePdf {
        &self.av
    }

    pub fn a_lambda(&self, av: f64, wavelength: f64) -> f64 {
        av * (wavelength / V_BAND_WAVELENGTH).powf(-self.exponent)
    }
}

impl ExtinctionModel for PowerLawExtinction {
    fn draw_av(&self, rng: &mut ChaChaRng) -> f64 {
        self.av.draw(rng)
    }

    fn apply(&self, av: f64, wavelengths: &[f64], l_lambda: &[f64]) -> Vec<f64> {
        wavelengths
            .iter()
            .zip(l_lambda)
            .map(|(&w, &l)| l * 10f64.powf(-0.4 * self.a_lambda(av, w)))
            .collect()
    }
}
