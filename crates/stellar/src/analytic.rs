//! Analytic power-law stellar tracks.
//!
//! Main-sequence luminosity and temperature follow piecewise mass
//! relations; the death mass falls as a power of age. Good enough to
//! exercise the synthesis engines without tabulated track files.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::tracks::{StarState, StellarTrackModel, WolfRayetType};

/// White dwarf / neutron star boundary in initial mass (M☉)
const NEUTRON_STAR_MIN_MASS: f64 = 8.0;
/// Neutron star / black hole boundary in initial mass (M☉)
const BLACK_HOLE_MIN_MASS: f64 = 20.0;
const NEUTRON_STAR_MASS: f64 = 1.4;
/// Fraction of initial mass surviving winds and core collapse
const BLACK_HOLE_MASS_FRACTION: f64 = 0.5;

/// Protosolar surface hydrogen fraction
const SURFACE_H: f64 = 0.7;
const SURFACE_C: f64 = 0.0024;
const SURFACE_N: f64 = 0.0007;

/// Stars cooler than this never count as Wolf-Rayet
const WR_MIN_LOG_TEFF: f64 = 4.4;
/// Guard for C/N ratios once nitrogen is burnt away
const ABUNDANCE_EPSILON: f64 = 1.0e-30;

/// Tracks with death mass `m_d(t) = coefficient · t^(−exponent)`.
///
/// With the defaults a 1 M☉ star lives 10 Gyr.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerLawTracks {
    pub coefficient: f64,
    pub exponent: f64,
    pub min_mass: f64,
    pub max_mass: f64,
    /// Minimum initial mass for a Wolf-Rayet phase
    pub wolf_rayet_mass: f64,
    /// Fraction of initial mass lost in winds by the end of life, reached
    /// by the most massive stars
    pub wind_loss: f64,
}

impl Default for PowerLawTracks {
    fn default() -> Self {
        Self {
            coefficient: 1.0e4,
            exponent: 0.4,
            min_mass: 0.1,
            max_mass: 120.0,
            wolf_rayet_mass: 25.0,
            wind_loss: 0.3,
        }
    }
}

impl PowerLawTracks {
    pub fn new(coefficient: f64, exponent: f64) -> Self {
        Self {
            coefficient,
            exponent,
            ..Self::default()
        }
    }

    /// Zero-age main sequence luminosity (L☉) and temperature (K).
    fn zams_properties(mass: f64) -> (f64, f64) {
        match mass {
            m if m > 30.0 => (3.0e4 * (m / 30.0).powf(3.5), 38000.0 * (m / 30.0).powf(0.2)),
            m if m > 8.0 => (1.0e3 * (m / 8.0).powf(3.5), 22000.0 * (m / 8.0).powf(0.2)),
            m if m > 2.0 => (25.0 * (m / 2.0).powf(3.5), 9000.0 * (m / 2.0).powf(0.2)),
            m if m > 0.8 => (m.powf(4.0), 5800.0 * m.powf(0.1)),
            m if m > 0.45 => (m.powf(2.3), 5800.0 * m.powf(0.1)),
            m => (m.powf(2.3), 2500.0 * (m / 0.08).powf(0.23)),
        }
    }

    fn wolf_rayet_type(&self, mass: f64, log_teff: f64, h: f64, c: f64, n: f64) -> WolfRayetType {
        if mass < self.wolf_rayet_mass || log_teff < WR_MIN_LOG_TEFF {
            return WolfRayetType::None;
        }
        if h > 0.4 {
            WolfRayetType::None
        } else if h > 0.1 {
            WolfRayetType::Wn
        } else {
            if n < ABUNDANCE_EPSILON {
                warn!(mass, n, "surface nitrogen vanished; guarding C/N ratio");
            }
            if c / (n + ABUNDANCE_EPSILON) < 10.0 {
                WolfRayetType::Wn
            } else {
                WolfRayetType::Wc
            }
        }
    }

    fn star_state(&self, mass: f64, age: f64) -> StarState {
        let lifetime = self.star_lifetime(mass);
        let f = (age / lifetime).clamp(0.0, 1.0);
        let (l_zams, t_zams) = Self::zams_properties(mass);

        // Stars brighten by ~half and cool slightly across the main sequence
        let luminosity = l_zams * (1.0 + 0.5 * f);
        let temperature = t_zams * (1.0 - 0.1 * f);
        let wind = self.wind_loss * (mass / self.max_mass).min(1.0);
        let current_mass = mass * (1.0 - wind * f);

        // Massive stars peel down to processed layers late in life
        let (h, c, n) = if mass >= self.wolf_rayet_mass {
            let h = SURFACE_H * (1.0 - f * f);
            let n = if h > 0.1 {
                SURFACE_N + 0.01 * (1.0 - h / SURFACE_H)
            } else {
                0.01 * h / 0.1
            };
            let c = if h > 0.1 {
                SURFACE_C
            } else {
                SURFACE_C + 0.4 * (0.1 - h) / 0.1
            };
            (h, c, n)
        } else {
            (SURFACE_H, SURFACE_C, SURFACE_N)
        };
        let log_teff = temperature.log10();

        StarState {
            initial_mass: mass,
            current_mass,
            log_luminosity: luminosity.log10(),
            log_teff,
            surface_h: h,
            surface_c: c,
            surface_n: n,
            wolf_rayet: self.wolf_rayet_type(mass, log_teff, h, c, n),
        }
    }
}

impl StellarTrackModel for PowerLawTracks {
    fn min_mass(&self) -> f64 {
        self.min_mass
    }

    fn max_mass(&self) -> f64 {
        self.max_mass
    }

    fn is_monotonic(&self) -> bool {
        true
    }

    fn death_mass(&self, age: f64) -> f64 {
        if age <= 0.0 {
            return f64::INFINITY;
        }
        self.coefficient * age.powf(-self.exponent)
    }

    fn remnant_mass(&self, mass: f64) -> f64 {
        match mass {
            m if m < NEUTRON_STAR_MIN_MASS => 0.109 * m + 0.394,
            m if m < BLACK_HOLE_MIN_MASS => NEUTRON_STAR_MASS,
            m => m * BLACK_HOLE_MASS_FRACTION,
        }
    }

    fn star_lifetime(&self, mass: f64) -> f64 {
        (mass / self.coefficient).powf(-1.0 / self.exponent)
    }

    fn isochrone(&self, age: f64, masses: &[f64]) -> Vec<StarState> {
        masses
            .iter()
            .filter(|&&m| m >= self.min_mass)
            .map(|&m| self.star_state(m, age))
            .collect()
    }
}
