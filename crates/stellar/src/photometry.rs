//! Photometric filters.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::spectral::trapezoid;

/// Reduces a spectrum to one value per filter.
pub trait FilterSet: Debug + Send + Sync {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn names(&self) -> Vec<String>;

    /// One value per filter. Bolometric slots are left at zero for the
    /// caller to fill with the bolometric luminosity.
    fn photometry(&self, wavelengths: &[f64], l_lambda: &[f64]) -> Vec<f64>;

    fn is_bolometric(&self, index: usize) -> bool;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Band {
    /// Flat transmission over `[lambda_min, lambda_max]` Å
    Boxcar {
        name: String,
        lambda_min: f64,
        lambda_max: f64,
    },
    Bolometric,
}

impl Band {
    pub fn boxcar(name: &str, lambda_min: f64, lambda_max: f64) -> Self {
        Band::Boxcar {
            name: name.to_string(),
            lambda_min,
            lambda_max,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Band::Boxcar { name, .. } => name,
            Band::Bolometric => "Lbol",
        }
    }
}

/// Boxcar filters reporting the band-averaged L_λ (L☉/Å).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxcarFilters {
    bands: Vec<Band>,
}

impl BoxcarFilters {
    pub fn new(bands: Vec<Band>) -> Self {
        Self { bands }
    }

    /// Bolometric plus rough Johnson U, B, V.
    pub fn johnson() -> Self {
        Self::new(vec![
            Band::Bolometric,
            Band::boxcar("U", 3200.0, 4000.0),
            Band::boxcar("B", 3900.0, 4900.0),
            Band::boxcar("V", 5000.0, 5900.0),
        ])
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    fn band_average(wavelengths: &[f64], l_lambda: &[f64], lo: f64, hi: f64) -> f64 {
        let (x, y): (Vec<f64>, Vec<f64>) = wavelengths
            .iter()
            .zip(l_lambda)
            .filter(|&(&w, _)| w >= lo && w <= hi)
            .map(|(&w, &l)| (w, l))
            .unzip();
        if x.len() < 2 {
            return 0.0;
        }
        trapezoid(&x, &y) / (x[x.len() - 1] - x[0])
    }
}

impl FilterSet for BoxcarFilters {
    fn len(&self) -> usize {
        self.bands.len()
    }

    fn names(&self) -> Vec<String> {
        self.bands.iter().map(|b| b.name().to_string()).collect()
    }

    fn photometry(&self, wavelengths: &[f64], l_lambda: &[f64]) -> Vec<f64> {
        self.bands
            .iter()
            .map(|band| match band {
                Band::Boxcar {
                    lambda_min,
                    lambda_max,
                    ..
                } => Self::band_average(wavelengths, l_lambda, *lambda_min, *lambda_max),
                Band::Bolometric => 0.0,
            })
            .collect()
    }

    fn is_bolometric(&self, index: usize) -> bool {
        matches!(self.bands.get(index), Some(Band::Bolometric))
    }
}
