//! Nucleosynthetic yields.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::intervals::in_cuts;

/// An isotope tracked by a yield model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Isotope {
    pub name: String,
    /// Atomic number
    pub z: u32,
    /// Mass number
    pub a: u32,
    /// Mean lifetime in years; `None` for stable isotopes
    pub lifetime: Option<f64>,
}

impl Isotope {
    pub fn stable(name: &str, z: u32, a: u32) -> Self {
        Self {
            name: name.to_string(),
            z,
            a,
            lifetime: None,
        }
    }

    pub fn unstable(name: &str, z: u32, a: u32, lifetime: f64) -> Self {
        Self {
            name: name.to_string(),
            z,
            a,
            lifetime: Some(lifetime),
        }
    }

    pub fn is_stable(&self) -> bool {
        self.lifetime.is_none()
    }

    /// Surviving fraction after `elapsed` years.
    pub fn decay_factor(&self, elapsed: f64) -> f64 {
        match self.lifetime {
            Some(tau) => (-elapsed.max(0.0) / tau).exp(),
            None => 1.0,
        }
    }
}

/// Per-star ejecta by isotope.
pub trait YieldModel: Debug + Send + Sync {
    fn isotopes(&self) -> &[Isotope];

    fn isotope_count(&self) -> usize {
        self.isotopes().len()
    }

    /// Mass (M☉) of each isotope ejected over the life of a star of this
    /// initial mass, before any radioactive decay.
    fn yield_of(&self, mass: f64) -> Vec<f64>;

    /// Summed yields of stars with the given masses, each decayed for the
    /// matching time since that star died.
    fn yields(&self, masses: &[f64], decay_times: &[f64]) -> Vec<f64> {
        let isotopes = self.isotopes();
        let mut total = vec![0.0; isotopes.len()];
        for (&m, &dt) in masses.iter().zip(decay_times) {
            for ((sum, y), iso) in total.iter_mut().zip(self.yield_of(m)).zip(isotopes) {
                *sum += y * iso.decay_factor(dt);
            }
        }
        total
    }

    /// Sorted cut list of initial masses that end as supernovae.
    fn supernova_mass_range(&self) -> Vec<f64>;

    fn produces_supernova(&self, mass: f64) -> bool {
        in_cuts(&self.supernova_mass_range(), mass)
    }
}

/// Yields that scale linearly with initial mass inside a supernova window.
///
/// Stars outside the window (including those collapsing directly to black
/// holes above it) eject nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MassWindowYields {
    isotopes: Vec<Isotope>,
    /// Ejected mass per M☉ of initial mass, one entry per isotope
    coefficients: Vec<f64>,
    supernova_cuts: Vec<f64>,
}

impl MassWindowYields {
    pub fn new(isotopes: Vec<Isotope>, coefficients: Vec<f64>, supernova_cuts: Vec<f64>) -> Self {
        Self {
            isotopes,
            coefficients,
            supernova_cuts,
        }
    }

    /// A core-collapse set: supernovae from 8 to 40 M☉.
    pub fn core_collapse() -> Self {
        Self::new(
            vec![
                Isotope::stable("O16", 8, 16),
                Isotope::stable("Fe56", 26, 56),
                // Half-lives 6.08 d and 0.717 Myr
                Isotope::unstable("Ni56", 28, 56, 6.08 / 365.25 / std::f64::consts::LN_2),
                Isotope::unstable("Al26", 13, 26, 7.17e5 / std::f64::consts::LN_2),
            ],
            vec![0.05, 0.005, 0.004, 1.0e-5],
            vec![8.0, 40.0],
        )
    }
}

impl YieldModel for MassWindowYields {
    fn isotopes(&self) -> &[Isotope] {
        &self.isotopes
    }

    fn yield_of(&self, mass: f64) -> Vec<f64> {
        if self.produces_supernova(mass) {
            self.coefficients.iter().map(|c| c * mass).collect()
        } else {
            vec![0.0; self.coefficients.len()]
        }
    }

    fn supernova_mass_range(&self) -> Vec<f64> {
        self.supernova_cuts.clone()
    }
}
