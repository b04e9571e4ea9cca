//! A star cluster: one coeval population drawn from the IMF and aged.
//!
//! Stars inside the IMF's stochastic range are drawn one by one and kept
//! in an ascending mass list. The rest of the population is a continuum,
//! integrated over the IMF whenever a tally or output needs it.
//!
//! # Lifecycle
//!
//! ```text
//! Forming ──new/reset──▶ Alive ──age > lifetime──▶ Disrupted
//! ```
//!
//! Disrupted clusters keep advancing so their remnants and yields stay
//! current.

use std::sync::Arc;

use rand_chacha::ChaChaRng;
use serde::{Deserialize, Serialize};
use stellar::{StarState, trapezoid};
use tracing::{debug, info};
use units::{Luminosity, Mass, Time};

use crate::cache::ObservableCache;
use crate::error::{Result, SynthesisError};
use crate::model::{SynthesisModel, fill_bolometric};
use crate::record::{CLUSTER_RECORD_VERSION, ClusterRecord};
use crate::yield_ledger::YieldLedger;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterPhase {
    Forming,
    Alive,
    Disrupted,
}

#[derive(Debug, Clone)]
pub struct Cluster {
    id: u64,
    model: Arc<SynthesisModel>,
    phase: ClusterPhase,

    target_mass: Mass,
    stochastic_birth_mass: Mass,
    nonstochastic_birth_mass: Mass,
    formation_time: Time,
    time: Time,
    lifetime: Time,
    a_v: Option<f64>,

    /// Alive stochastic stars, ascending
    stars: Vec<f64>,
    /// Isochrone of `stars` at the current age
    states: Vec<StarState>,
    initial_star_count: usize,
    dead_star_count: usize,
    died_last_step: Vec<f64>,

    stochastic_alive_mass: Mass,
    nonstochastic_alive_mass: Mass,
    stochastic_remnant_mass: Mass,
    nonstochastic_remnant_mass: Mass,
    stochastic_supernovae: u64,
    total_supernovae: f64,

    ledger: YieldLedger,
    cache: ObservableCache,
}

impl Cluster {
    /// Forms a cluster of `target_mass` at `formation_time`.
    pub fn new(
        id: u64,
        target_mass: Mass,
        formation_time: Time,
        model: Arc<SynthesisModel>,
        rng: &mut ChaChaRng,
    ) -> Result<Self> {
        let target = target_mass.to_solar_masses();
        if !(target.is_finite() && target >= 0.0) {
            return Err(SynthesisError::Config(format!(
                "cluster target mass must be finite and non-negative, got {target}"
            )));
        }
        let mut cluster = Self {
            id,
            model,
            phase: ClusterPhase::Forming,
            target_mass,
            stochastic_birth_mass: Mass::zero(),
            nonstochastic_birth_mass: Mass::zero(),
            formation_time,
            time: formation_time,
            lifetime: Time::infinite(),
            a_v: None,
            stars: Vec::new(),
            states: Vec::new(),
            initial_star_count: 0,
            dead_star_count: 0,
            died_last_step: Vec::new(),
            stochastic_alive_mass: Mass::zero(),
            nonstochastic_alive_mass: Mass::zero(),
            stochastic_remnant_mass: Mass::zero(),
            nonstochastic_remnant_mass: Mass::zero(),
            stochastic_supernovae: 0,
            total_supernovae: 0.0,
            ledger: YieldLedger::new(),
            cache: ObservableCache::default(),
        };
        cluster.form(rng);
        Ok(cluster)
    }

    fn form(&mut self, rng: &mut ChaChaRng) {
        self.phase = ClusterPhase::Forming;
        let imf = Arc::clone(&self.model.imf);
        let target = self.target_mass.to_solar_masses();

        self.stars.clear();
        let drawn = imf.draw_population(target, rng, &mut self.stars);
        self.stars.sort_by(f64::total_cmp);
        self.stochastic_birth_mass = Mass::from_solar_masses(drawn);
        self.nonstochastic_birth_mass =
            Mass::from_solar_masses(target * (1.0 - imf.mass_fraction_restricted()));

        self.lifetime = match &self.model.cluster_lifetime {
            Some(pdf) => Time::from_years(pdf.draw(rng)),
            None => Time::infinite(),
        };
        self.a_v = self.model.extinction.as_ref().map(|e| e.draw_av(rng));

        self.time = self.formation_time;
        self.initial_star_count = self.stars.len();
        self.dead_star_count = 0;
        self.died_last_step.clear();
        self.stochastic_alive_mass = self.stochastic_birth_mass;
        self.nonstochastic_alive_mass = self.nonstochastic_birth_mass;
        self.stochastic_remnant_mass = Mass::zero();
        self.nonstochastic_remnant_mass = Mass::zero();
        self.stochastic_supernovae = 0;
        self.total_supernovae = 0.0;
        self.ledger.clear();
        self.states = self.model.tracks.isochrone(0.0, &self.stars);
        self.cache.clear();
        self.phase = ClusterPhase::Alive;

        debug!(
            id = self.id,
            target,
            stars = self.stars.len(),
            stochastic_mass = drawn,
            "cluster formed"
        );
    }

    /// Returns the cluster to its formation state at t = 0 with a freshly
    /// drawn population. The id is bumped unless `keep_id` is set.
    pub fn reset(&mut self, keep_id: bool, rng: &mut ChaChaRng) {
        if !keep_id {
            self.id += 1;
        }
        self.formation_time = Time::zero();
        self.form(rng);
    }

    /// Evolves the cluster to absolute time `time`.
    pub fn advance(&mut self, time: Time) -> Result<()> {
        if !time.is_finite() {
            return Err(SynthesisError::NonFiniteTime(time.to_years()));
        }
        if time < self.time {
            return Err(SynthesisError::TimeReversal {
                requested: time.to_years(),
                current: self.time.to_years(),
            });
        }
        if time == self.time {
            return Ok(());
        }

        let age = (time - self.formation_time).to_years();
        let tracks = Arc::clone(&self.model.tracks);

        self.died_last_step.clear();
        if tracks.is_monotonic() {
            let death_mass = tracks.death_mass(age);
            while let Some(&m) = self.stars.last() {
                if m <= death_mass {
                    break;
                }
                self.stars.pop();
                self.died_last_step.push(m);
            }
        } else {
            let intervals = tracks.alive_intervals(age);
            let (alive, dead) = partition_alive(&self.stars, &intervals);
            self.stars = alive;
            self.died_last_step = dead;
        }

        for &m in &self.died_last_step {
            self.stochastic_remnant_mass += Mass::from_solar_masses(tracks.remnant_mass(m));
            if self.model.produces_supernova(m) {
                self.stochastic_supernovae += 1;
            }
            if self.model.yields.is_some() {
                let death_time = self.formation_time + Time::from_years(tracks.star_lifetime(m));
                self.ledger.record(m, death_time);
            }
        }
        self.dead_star_count += self.died_last_step.len();
        self.time = time;

        self.states = tracks.isochrone(age, &self.stars);
        let untracked: f64 = self
            .stars
            .iter()
            .filter(|&&m| m < tracks.min_mass())
            .sum();
        let tracked: f64 = self.states.iter().map(|s| s.current_mass).sum();
        self.stochastic_alive_mass = Mass::from_solar_masses(untracked + tracked);

        self.total_supernovae = self.stochastic_supernovae as f64;
        if !self.nonstochastic_birth_mass.is_zero() {
            let population = self.target_mass.to_solar_masses();
            self.nonstochastic_alive_mass =
                Mass::from_solar_masses(self.model.continuum_alive_mass(population, age));
            self.nonstochastic_remnant_mass =
                Mass::from_solar_masses(self.model.continuum_remnant_mass(population, age));
            self.total_supernovae += self.model.continuum_supernovae(population, age);
        }

        if self.phase != ClusterPhase::Disrupted && Time::from_years(age) > self.lifetime {
            self.phase = ClusterPhase::Disrupted;
            info!(id = self.id, age, "cluster disrupted");
        }
        self.cache.clear();

        debug!(
            id = self.id,
            age,
            deaths = self.died_last_step.len(),
            alive = self.stars.len(),
            "cluster advanced"
        );
        Ok(())
    }

    /// Bolometric luminosity of the alive stars.
    pub fn luminosity(&mut self) -> Luminosity {
        if let Some(l) = self.cache.luminosity {
            return l;
        }
        let stochastic: f64 = self.states.iter().map(StarState::luminosity).sum();
        let continuum = if self.nonstochastic_birth_mass.is_zero() {
            0.0
        } else {
            self.model
                .continuum_luminosity(self.target_mass.to_solar_masses(), self.age().to_years())
        };
        let l = Luminosity::from_solar_luminosities(stochastic + continuum);
        self.cache.luminosity = Some(l);
        l
    }

    /// Specific luminosity (L☉/Å) on the spectral model's wavelength grid.
    pub fn spectrum(&mut self) -> Result<&[f64]> {
        let spectrum = match self.cache.spectrum.take() {
            Some(s) => s,
            None => {
                let spectra = Arc::clone(self.model.spectra()?);
                let mut spectrum = spectra.spectrum_discrete(&self.states);
                if !self.nonstochastic_birth_mass.is_zero() {
                    let (continuum, _) = spectra.spectrum_continuum(
                        self.target_mass.to_solar_masses(),
                        self.age().to_years(),
                    );
                    for (s, c) in spectrum.iter_mut().zip(continuum) {
                        *s += c;
                    }
                }
                spectrum
            }
        };
        Ok(self.cache.spectrum.insert(spectrum).as_slice())
    }

    /// Spectrum attenuated by this cluster's extinction draw.
    pub fn spectrum_extincted(&mut self) -> Result<&[f64]> {
        let extincted = match self.cache.spectrum_extincted.take() {
            Some(s) => s,
            None => {
                let extinction = Arc::clone(self.model.extinction()?);
                let spectra = Arc::clone(self.model.spectra()?);
                let av = self.a_v.unwrap_or(0.0);
                let spectrum = self.spectrum()?;
                extinction.apply(av, spectra.wavelengths(), spectrum)
            }
        };
        Ok(self.cache.spectrum_extincted.insert(extincted).as_slice())
    }

    /// Bolometric luminosity after extinction.
    pub fn luminosity_extincted(&mut self) -> Result<Luminosity> {
        let spectra = Arc::clone(self.model.spectra()?);
        let extincted = self.spectrum_extincted()?;
        Ok(Luminosity::from_solar_luminosities(trapezoid(
            spectra.wavelengths(),
            extincted,
        )))
    }

    pub fn photometry(&mut self) -> Result<&[f64]> {
        let photometry = match self.cache.photometry.take() {
            Some(p) => p,
            None => {
                let filters = Arc::clone(self.model.filters()?);
                let spectra = Arc::clone(self.model.spectra()?);
                let lbol = self.luminosity().to_solar_luminosities();
                let mut phot = filters.photometry(spectra.wavelengths(), self.spectrum()?);
                fill_bolometric(filters.as_ref(), &mut phot, lbol);
                phot
            }
        };
        Ok(self.cache.photometry.insert(photometry).as_slice())
    }

    pub fn photometry_extincted(&mut self) -> Result<&[f64]> {
        let photometry = match self.cache.photometry_extincted.take() {
            Some(p) => p,
            None => {
                let filters = Arc::clone(self.model.filters()?);
                let spectra = Arc::clone(self.model.spectra()?);
                let lbol = self.luminosity_extincted()?.to_solar_luminosities();
                let mut phot =
                    filters.photometry(spectra.wavelengths(), self.spectrum_extincted()?);
                fill_bolometric(filters.as_ref(), &mut phot, lbol);
                phot
            }
        };
        Ok(self.cache.photometry_extincted.insert(photometry).as_slice())
    }

    /// Mass (M☉) of each isotope ejected so far, after radioactive decay.
    pub fn yields(&mut self) -> Result<&[f64]> {
        let yields = match self.cache.yields.take() {
            Some(y) => y,
            None => {
                let model = Arc::clone(self.model.yield_model()?);
                let mut total = self.ledger.settle(model.as_ref(), self.time).to_vec();
                if !self.nonstochastic_birth_mass.is_zero() {
                    let continuum = self.model.continuum_yields(
                        self.target_mass.to_solar_masses(),
                        self.age().to_years(),
                    )?;
                    for (t, c) in total.iter_mut().zip(continuum) {
                        *t += c;
                    }
                }
                total
            }
        };
        Ok(self.cache.yields.insert(yields).as_slice())
    }

    pub fn to_record(&self) -> ClusterRecord {
        ClusterRecord {
            version: CLUSTER_RECORD_VERSION,
            id: self.id,
            phase: self.phase,
            target_mass: self.target_mass,
            stochastic_birth_mass: self.stochastic_birth_mass,
            nonstochastic_birth_mass: self.nonstochastic_birth_mass,
            formation_time: self.formation_time,
            time: self.time,
            lifetime: self.lifetime.is_finite().then_some(self.lifetime),
            a_v: self.a_v,
            stars: self.stars.clone(),
            initial_star_count: self.initial_star_count,
            dead_star_count: self.dead_star_count,
            died_last_step: self.died_last_step.clone(),
            stochastic_alive_mass: self.stochastic_alive_mass,
            nonstochastic_alive_mass: self.nonstochastic_alive_mass,
            stochastic_remnant_mass: self.stochastic_remnant_mass,
            nonstochastic_remnant_mass: self.nonstochastic_remnant_mass,
            stochastic_supernovae: self.stochastic_supernovae,
            total_supernovae: self.total_supernovae,
            yield_ledger: self.ledger.clone(),
        }
    }

    /// Rebuilds a cluster from a record against `model`.
    pub fn from_record(record: ClusterRecord, model: Arc<SynthesisModel>) -> Result<Self> {
        record.check_version()?;
        let age = (record.time - record.formation_time).to_years();
        let states = model.tracks.isochrone(age, &record.stars);
        Ok(Self {
            id: record.id,
            model,
            phase: record.phase,
            target_mass: record.target_mass,
            stochastic_birth_mass: record.stochastic_birth_mass,
            nonstochastic_birth_mass: record.nonstochastic_birth_mass,
            formation_time: record.formation_time,
            time: record.time,
            lifetime: record.lifetime.unwrap_or_else(Time::infinite),
            a_v: record.a_v,
            stars: record.stars,
            states,
            initial_star_count: record.initial_star_count,
            dead_star_count: record.dead_star_count,
            died_last_step: record.died_last_step,
            stochastic_alive_mass: record.stochastic_alive_mass,
            nonstochastic_alive_mass: record.nonstochastic_alive_mass,
            stochastic_remnant_mass: record.stochastic_remnant_mass,
            nonstochastic_remnant_mass: record.nonstochastic_remnant_mass,
            stochastic_supernovae: record.stochastic_supernovae,
            total_supernovae: record.total_supernovae,
            ledger: record.yield_ledger,
            cache: ObservableCache::default(),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn phase(&self) -> ClusterPhase {
        self.phase
    }

    pub fn is_disrupted(&self) -> bool {
        self.phase == ClusterPhase::Disrupted
    }

    pub fn model(&self) -> &Arc<SynthesisModel> {
        &self.model
    }

    pub fn target_mass(&self) -> Mass {
        self.target_mass
    }

    /// Stochastic stars actually drawn plus the continuum share.
    pub fn birth_mass(&self) -> Mass {
        self.stochastic_birth_mass + self.nonstochastic_birth_mass
    }

    pub fn stochastic_birth_mass(&self) -> Mass {
        self.stochastic_birth_mass
    }

    pub fn nonstochastic_birth_mass(&self) -> Mass {
        self.nonstochastic_birth_mass
    }

    pub fn formation_time(&self) -> Time {
        self.formation_time
    }

    pub fn time(&self) -> Time {
        self.time
    }

    pub fn age(&self) -> Time {
        self.time - self.formation_time
    }

    pub fn lifetime(&self) -> Time {
        self.lifetime
    }

    /// V-band extinction drawn at formation, if the model has extinction.
    pub fn a_v(&self) -> Option<f64> {
        self.a_v
    }

    pub fn alive_mass(&self) -> Mass {
        self.stochastic_alive_mass + self.nonstochastic_alive_mass
    }

    pub fn stochastic_alive_mass(&self) -> Mass {
        self.stochastic_alive_mass
    }

    pub fn nonstochastic_alive_mass(&self) -> Mass {
        self.nonstochastic_alive_mass
    }

    pub fn remnant_mass(&self) -> Mass {
        self.stochastic_remnant_mass + self.nonstochastic_remnant_mass
    }

    pub fn stochastic_remnant_mass(&self) -> Mass {
        self.stochastic_remnant_mass
    }

    pub fn nonstochastic_remnant_mass(&self) -> Mass {
        self.nonstochastic_remnant_mass
    }

    /// Alive plus remnant mass.
    pub fn stellar_mass(&self) -> Mass {
        self.alive_mass() + self.remnant_mass()
    }

    pub fn stochastic_stellar_mass(&self) -> Mass {
        self.stochastic_alive_mass + self.stochastic_remnant_mass
    }

    pub fn nonstochastic_stellar_mass(&self) -> Mass {
        self.nonstochastic_alive_mass + self.nonstochastic_remnant_mass
    }

    pub fn stochastic_supernovae(&self) -> u64 {
        self.stochastic_supernovae
    }

    /// Stochastic supernovae plus the expected continuum count.
    pub fn total_supernovae(&self) -> f64 {
        self.total_supernovae
    }

    /// Alive stochastic star masses, ascending.
    pub fn alive_stars(&self) -> &[f64] {
        &self.stars
    }

    pub fn stellar_states(&self) -> &[StarState] {
        &self.states
    }

    pub fn star_count(&self) -> usize {
        self.stars.len()
    }

    pub fn initial_star_count(&self) -> usize {
        self.initial_star_count
    }

    /// Stochastic stars dead since formation.
    pub fn dead_star_count(&self) -> usize {
        self.dead_star_count
    }

    pub fn died_last_step(&self) -> &[f64] {
        &self.died_last_step
    }

    pub fn max_star_mass(&self) -> Option<f64> {
        self.stars.last().copied()
    }
}

/// Splits ascending `stars` into those inside one of the sorted, disjoint
/// alive `intervals` and those outside every one.
pub(crate) fn partition_alive(stars: &[f64], intervals: &[(f64, f64)]) -> (Vec<f64>, Vec<f64>) {
    let mut alive = Vec::with_capacity(stars.len());
    let mut dead = Vec::new();
    let mut k = 0;
    for &m in stars {
        // Every interval before k ends below m; stars only grow, so k never
        // moves back
        while k < intervals.len() && intervals[k].1 < m {
            k += 1;
        }
        match intervals.get(k) {
            Some(&(lo, _)) if m >= lo => alive.push(m),
            _ => dead.push(m),
        }
    }
    (alive, dead)
}
