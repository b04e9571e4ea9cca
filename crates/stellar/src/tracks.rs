//! Stellar evolutionary track contract.
//!
//! Masses are initial (birth) masses in M☉ and ages are in years unless a
//! field says otherwise.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::intervals::{cuts_to_intervals, in_cuts};

/// Wolf-Rayet subtype from surface abundances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WolfRayetType {
    #[default]
    None,
    /// Nitrogen-rich
    Wn,
    /// Carbon-rich
    Wc,
}

/// Present-day state of one star on an isochrone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StarState {
    pub initial_mass: f64,
    pub current_mass: f64,
    /// log10(L/L☉)
    pub log_luminosity: f64,
    /// log10(Teff/K)
    pub log_teff: f64,
    /// Surface mass fractions
    pub surface_h: f64,
    pub surface_c: f64,
    pub surface_n: f64,
    pub wolf_rayet: WolfRayetType,
}

impl StarState {
    pub fn luminosity(&self) -> f64 {
        10f64.powf(self.log_luminosity)
    }

    pub fn temperature(&self) -> f64 {
        10f64.powf(self.log_teff)
    }
}

/// A set of stellar evolutionary tracks.
///
/// Tracks are monotonic when every star above some death mass is dead and
/// every star below it alive. Otherwise the alive stars at a given age
/// form several disjoint mass intervals.
pub trait StellarTrackModel: Debug + Send + Sync {
    /// Smallest initial mass the tracks cover. Stars below it are treated
    /// as unevolved.
    fn min_mass(&self) -> f64;

    /// Largest initial mass the tracks cover.
    fn max_mass(&self) -> f64;

    fn is_monotonic(&self) -> bool;

    /// Initial mass above which stars have died by `age`.
    fn death_mass(&self, age: f64) -> f64;

    /// Sorted cut list of alive mass intervals at `age`: stars with masses
    /// in `[c[0], c[1]]`, `[c[2], c[3]]`, ... are alive.
    fn alive_mass_intervals(&self, age: f64) -> Vec<f64> {
        vec![0.0, self.death_mass(age)]
    }

    /// Remnant left by a star of this initial mass once it has died.
    fn remnant_mass(&self, mass: f64) -> f64;

    /// Lifetime of a star of this initial mass.
    fn star_lifetime(&self, mass: f64) -> f64;

    /// Present-day states of the given (alive) stars at `age`, in input
    /// order. Stars below [`min_mass`](Self::min_mass) are omitted.
    fn isochrone(&self, age: f64, masses: &[f64]) -> Vec<StarState>;

    fn is_alive(&self, mass: f64, age: f64) -> bool {
        if self.is_monotonic() {
            mass <= self.death_mass(age)
        } else {
            in_cuts(&self.alive_mass_intervals(age), mass)
        }
    }

    /// Remnant mass at `age`: zero while the star still lives.
    fn remnant_mass_at(&self, mass: f64, age: f64) -> f64 {
        if self.is_alive(mass, age) {
            0.0
        } else {
            self.remnant_mass(mass)
        }
    }

    /// Alive intervals at `age` as `(lo, hi)` pairs.
    fn alive_intervals(&self, age: f64) -> Vec<(f64, f64)> {
        if self.is_monotonic() {
            vec![(0.0, self.death_mass(age))]
        } else {
            cuts_to_intervals(&self.alive_mass_intervals(age))
        }
    }
}
