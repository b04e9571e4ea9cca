use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};

/// Nominal solar luminosity in erg/s (IAU 2015 B3)
pub const SOLAR_LUMINOSITY_ERG_S: f64 = 3.828e33;

/// A bolometric luminosity in solar units.
///
/// Track models usually report `log10(L/L☉)`; use [`Luminosity::from_log10`]
/// to lift those values into a summable quantity.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Luminosity(f64); // Base unit: Solar Luminosities

impl Luminosity {
    pub fn zero() -> Self {
        Self(0.0)
    }

    pub fn from_solar_luminosities(value: f64) -> Self {
        Self(value)
    }

    /// Creates a luminosity from `log10(L/L☉)`.
    pub fn from_log10(log_l: f64) -> Self {
        Self(10f64.powf(log_l))
    }

    pub fn from_erg_per_second(value: f64) -> Self {
        Self(value / SOLAR_LUMINOSITY_ERG_S)
    }

    pub fn to_solar_luminosities(&self) -> f64 {
        self.0
    }

    pub fn to_erg_per_second(&self) -> f64 {
        self.0 * SOLAR_LUMINOSITY_ERG_S
    }

    /// `log10(L/L☉)`; negative infinity for a dark population.
    pub fn log10(&self) -> f64 {
        self.0.log10()
    }
}

impl Add for Luminosity {
    type Output = Luminosity;

    fn add(self, rhs: Luminosity) -> Luminosity {
        Luminosity(self.0 + rhs.0)
    }
}

impl AddAssign for Luminosity {
    fn add_assign(&mut self, rhs: Luminosity) {
        self.0 += rhs.0;
    }
}

impl Mul<f64> for Luminosity {
    type Output = Luminosity;

    fn mul(self, rhs: f64) -> Luminosity {
        Luminosity(self.0 * rhs)
    }
}

impl Sum for Luminosity {
    fn sum<I: Iterator<Item = Luminosity>>(iter: I) -> Luminosity {
        iter.fold(Luminosity::zero(), |acc, l| acc + l)
    }
}
