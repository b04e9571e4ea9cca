//! Lazily settled yields of individually tracked stars.
//!
//! Deaths are recorded as they happen but only turned into isotope masses
//! when yields are requested. At that point the yields already settled
//! decay for the time since the previous request, and each pending death
//! contributes its yield decayed from its own death time. The result does
//! not depend on how often yields are requested.

use serde::{Deserialize, Serialize};
use stellar::YieldModel;
use units::Time;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingDeath {
    pub mass: f64,
    pub death_time: Time,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YieldLedger {
    settled: Vec<f64>,
    settled_at: Time,
    pending: Vec<PendingDeath>,
}

impl YieldLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, mass: f64, death_time: Time) {
        self.pending.push(PendingDeath { mass, death_time });
    }

    pub fn pending(&self) -> &[PendingDeath] {
        &self.pending
    }

    /// Yields as of the last settlement, without decaying to a new time.
    pub fn settled(&self) -> &[f64] {
        &self.settled
    }

    /// Brings the ledger up to `now` and returns per-isotope yields.
    pub fn settle(&mut self, yields: &dyn YieldModel, now: Time) -> &[f64] {
        let isotopes = yields.isotopes();
        if self.settled.len() != isotopes.len() {
            self.settled = vec![0.0; isotopes.len()];
        }

        let elapsed = (now - self.settled_at).to_years();
        for (y, iso) in self.settled.iter_mut().zip(isotopes) {
            *y *= iso.decay_factor(elapsed);
        }

        if !self.pending.is_empty() {
            let (masses, decay_times): (Vec<f64>, Vec<f64>) = self
                .pending
                .drain(..)
                .map(|d| (d.mass, (now - d.death_time).to_years()))
                .unzip();
            for (y, fresh) in self.settled.iter_mut().zip(yields.yields(&masses, &decay_times)) {
                *y += fresh;
            }
        }

        self.settled_at = now;
        &self.settled
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
