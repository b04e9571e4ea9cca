//! A galaxy: clusters and field stars formed from a star formation history.
//!
//! Each [`advance`](Galaxy::advance) forms the mass the history adds over
//! the step, corrected for how far the stars drawn so far overshot or
//! undershot their target. A fraction `cluster_fraction` of it goes into
//! clusters drawn from the cluster mass function, the rest into field
//! stars drawn straight from the IMF.
//!
//! Field stars outside the IMF's stochastic range are never drawn. Their
//! outputs come from the continuum, binned in formation time.

use std::sync::Arc;

use piecewise_pdf::PiecewisePdf;
use rand::Rng;
use rand_chacha::ChaChaRng;
use serde::{Deserialize, Serialize};
use stellar::StarState;
use tracing::debug;
use units::{Luminosity, Mass, Time};

use crate::cache::ObservableCache;
use crate::cluster::Cluster;
use crate::error::{Result, SynthesisError};
use crate::model::{SynthesisModel, fill_bolometric};
use crate::yield_ledger::YieldLedger;

pub const DEFAULT_SFH_TIME_BINS: usize = 64;

/// A star formed outside any cluster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldStar {
    pub mass: f64,
    pub birth_time: Time,
    pub death_time: Time,
}

#[derive(Debug, Clone)]
pub struct Galaxy {
    model: Arc<SynthesisModel>,
    cluster_mass_function: Option<PiecewisePdf>,
    star_formation_history: PiecewisePdf,
    cluster_fraction: f64,
    sfh_time_bins: usize,

    time: Time,
    target_mass: Mass,
    mass: Mass,
    alive_mass: Mass,
    cluster_mass: Mass,
    nonstochastic_field_mass: Mass,
    field_remnant_mass: Mass,
    field_supernovae: u64,
    next_cluster_id: u64,

    clusters: Vec<Cluster>,
    disrupted_clusters: Vec<Cluster>,
    /// Sorted by decreasing death time
    field_stars: Vec<FieldStar>,
    field_ledger: YieldLedger,
    cache: ObservableCache,
}

impl Galaxy {
    pub fn new(
        model: Arc<SynthesisModel>,
        cluster_mass_function: Option<PiecewisePdf>,
        star_formation_history: PiecewisePdf,
        cluster_fraction: f64,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&cluster_fraction) {
            return Err(SynthesisError::Config(format!(
                "cluster fraction must lie in [0, 1], got {cluster_fraction}"
            )));
        }
        if cluster_fraction > 0.0 && cluster_mass_function.is_none() {
            return Err(SynthesisError::Config(
                "clusters are formed but no cluster mass function was given".to_string(),
            ));
        }
        Ok(Self {
            model,
            cluster_mass_function,
            star_formation_history,
            cluster_fraction,
            sfh_time_bins: DEFAULT_SFH_TIME_BINS,
            time: Time::zero(),
            target_mass: Mass::zero(),
            mass: Mass::zero(),
            alive_mass: Mass::zero(),
            cluster_mass: Mass::zero(),
            nonstochastic_field_mass: Mass::zero(),
            field_remnant_mass: Mass::zero(),
            field_supernovae: 0,
            next_cluster_id: 0,
            clusters: Vec::new(),
            disrupted_clusters: Vec::new(),
            field_stars: Vec::new(),
            field_ledger: YieldLedger::new(),
            cache: ObservableCache::default(),
        })
    }

    /// Number of formation-time bins used for the continuum field stars.
    pub fn with_sfh_time_bins(mut self, bins: usize) -> Self {
        self.sfh_time_bins = bins.max(1);
        self
    }

    /// Back to t = 0 with nothing formed. Cluster ids restart from zero
    /// only if `reset_cluster_id` is set.
    pub fn reset(&mut self, reset_cluster_id: bool) {
        self.time = Time::zero();
        self.target_mass = Mass::zero();
        self.mass = Mass::zero();
        self.alive_mass = Mass::zero();
        self.cluster_mass = Mass::zero();
        self.nonstochastic_field_mass = Mass::zero();
        self.field_remnant_mass = Mass::zero();
        self.field_supernovae = 0;
        if reset_cluster_id {
            self.next_cluster_id = 0;
        }
        self.clusters.clear();
        self.disrupted_clusters.clear();
        self.field_stars.clear();
        self.field_ledger.clear();
        self.cache.clear();
    }

    /// Forms stars over `[self.time, time]` and evolves everything to `time`.
    pub fn advance(&mut self, time: Time, rng: &mut ChaChaRng) -> Result<()> {
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
        let (start, end) = (self.time, time);

        let new_mass = self
            .star_formation_history
            .integral_between(start.to_years(), end.to_years());
        // Carry forward the drift between mass drawn and mass targeted
        let mass_to_draw =
            new_mass + (self.target_mass - self.mass).to_solar_masses();
        self.target_mass += Mass::from_solar_masses(new_mass);

        let formed = self.form_clusters(mass_to_draw, start, end, rng)?;
        let field = self.form_field_stars(mass_to_draw, start, end, rng)?;

        for cluster in &mut self.clusters {
            self.alive_mass -= cluster.alive_mass();
            self.cluster_mass -= cluster.alive_mass();
            cluster.advance(end)?;
            self.alive_mass += cluster.alive_mass();
            self.cluster_mass += cluster.alive_mass();
        }
        for cluster in &mut self.disrupted_clusters {
            self.alive_mass -= cluster.alive_mass();
            cluster.advance(end)?;
            self.alive_mass += cluster.alive_mass();
        }

        let (disrupted, live): (Vec<Cluster>, Vec<Cluster>) = self
            .clusters
            .drain(..)
            .partition(Cluster::is_disrupted);
        self.clusters = live;
        let newly_disrupted = disrupted.len();
        for cluster in disrupted {
            self.cluster_mass -= cluster.alive_mass();
            self.disrupted_clusters.push(cluster);
        }

        let deaths = self.retire_field_stars(end);
        self.time = end;
        self.cache.clear();

        debug!(
            time = end.to_years(),
            new_mass,
            clusters_formed = formed,
            field_stars_formed = field,
            field_deaths = deaths,
            disrupted = newly_disrupted,
            "galaxy advanced"
        );
        Ok(())
    }

    fn form_clusters(
        &mut self,
        mass_to_draw: f64,
        start: Time,
        end: Time,
        rng: &mut ChaChaRng,
    ) -> Result<usize> {
        let goal = self.cluster_fraction * mass_to_draw;
        let Some(cmf) = &self.cluster_mass_function else {
            return Ok(0);
        };
        if !(goal > 0.0) {
            return Ok(0);
        }
        let mut masses = Vec::new();
        cmf.draw_population(goal, rng, &mut masses);

        for &m in &masses {
            let birth = self.draw_birth_time(start, end, rng)?;
            let cluster = Cluster::new(
                self.next_cluster_id,
                Mass::from_solar_masses(m),
                birth,
                Arc::clone(&self.model),
                rng,
            )?;
            self.next_cluster_id += 1;
            self.mass += cluster.birth_mass();
            self.alive_mass += cluster.alive_mass();
            self.cluster_mass += cluster.alive_mass();
            self.clusters.push(cluster);
        }
        Ok(masses.len())
    }

    fn form_field_stars(
        &mut self,
        mass_to_draw: f64,
        start: Time,
        end: Time,
        rng: &mut ChaChaRng,
    ) -> Result<usize> {
        let goal = (1.0 - self.cluster_fraction) * mass_to_draw;
        if !(goal > 0.0) {
            return Ok(0);
        }
        let imf = Arc::clone(&self.model.imf);
        let mut masses = Vec::new();
        let drawn = imf.draw_population(goal, rng, &mut masses);

        for &m in &masses {
            let birth_time = self.draw_birth_time(start, end, rng)?;
            let death_time = birth_time + Time::from_years(self.model.tracks.star_lifetime(m));
            self.field_stars.push(FieldStar {
                mass: m,
                birth_time,
                death_time,
            });
            self.alive_mass += Mass::from_solar_masses(m);
        }
        self.field_stars
            .sort_by(|a, b| b.death_time.to_years().total_cmp(&a.death_time.to_years()));

        let continuum = goal * (1.0 - imf.mass_fraction_restricted());
        self.nonstochastic_field_mass += Mass::from_solar_masses(continuum);
        self.mass += Mass::from_solar_masses(drawn + continuum);
        Ok(masses.len())
    }

    /// Birth time from the star formation history over `[start, end]`,
    /// uniform if the history forms nothing there.
    fn draw_birth_time(&self, start: Time, end: Time, rng: &mut ChaChaRng) -> Result<Time> {
        let (a, b) = (start.to_years(), end.to_years());
        if self.star_formation_history.integral_between(a, b) > 0.0 {
            Ok(Time::from_years(
                self.star_formation_history.draw_between(a, b, rng)?,
            ))
        } else {
            Ok(Time::from_years(a + (b - a) * rng.random::<f64>()))
        }
    }

    /// Removes field stars dead by `now`, returning how many died.
    fn retire_field_stars(&mut self, now: Time) -> usize {
        let mut deaths = 0;
        while let Some(star) = self.field_stars.last().copied() {
            if star.death_time >= now {
                break;
            }
            self.field_stars.pop();
            deaths += 1;
            self.alive_mass -= Mass::from_solar_masses(star.mass);
            self.field_remnant_mass +=
                Mass::from_solar_masses(self.model.tracks.remnant_mass(star.mass));
            if self.model.produces_supernova(star.mass) {
                self.field_supernovae += 1;
            }
            if self.model.yields.is_some() {
                self.field_ledger.record(star.mass, star.death_time);
            }
        }
        deaths
    }

    /// `(population mass, age)` of each formation-time bin of the continuum
    /// field population.
    fn continuum_field_bins(&self) -> Vec<(f64, f64)> {
        let field_fraction = 1.0 - self.cluster_fraction;
        let now = self.time.to_years();
        if field_fraction <= 0.0 || now <= 0.0 || !self.model.has_continuum() {
            return Vec::new();
        }
        let n = self.sfh_time_bins;
        (0..n)
            .filter_map(|i| {
                let t0 = now * i as f64 / n as f64;
                let t1 = now * (i + 1) as f64 / n as f64;
                let mass = field_fraction * self.star_formation_history.integral_between(t0, t1);
                (mass > 0.0).then_some((mass, now - 0.5 * (t0 + t1)))
            })
            .collect()
    }

    /// Present-day states of the alive stochastic field stars.
    fn field_states(&self) -> Vec<StarState> {
        self.field_stars
            .iter()
            .flat_map(|star| {
                let age = (self.time - star.birth_time).to_years();
                self.model.tracks.isochrone(age, &[star.mass])
            })
            .collect()
    }

    pub fn luminosity(&mut self) -> Luminosity {
        if let Some(l) = self.cache.luminosity {
            return l;
        }
        let mut total: Luminosity = self
            .clusters
            .iter_mut()
            .chain(self.disrupted_clusters.iter_mut())
            .map(Cluster::luminosity)
            .sum();
        total += self
            .field_states()
            .iter()
            .map(|s| Luminosity::from_solar_luminosities(s.luminosity()))
            .sum::<Luminosity>();
        for (mass, age) in self.continuum_field_bins() {
            total += Luminosity::from_solar_luminosities(
                self.model.continuum_luminosity(mass, age),
            );
        }
        self.cache.luminosity = Some(total);
        total
    }

    pub fn spectrum(&mut self) -> Result<&[f64]> {
        let spectrum = match self.cache.spectrum.take() {
            Some(s) => s,
            None => {
                let spectra = Arc::clone(self.model.spectra()?);
                let mut total = spectra.spectrum_discrete(&self.field_states());
                for cluster in self
                    .clusters
                    .iter_mut()
                    .chain(self.disrupted_clusters.iter_mut())
                {
                    add_into(&mut total, cluster.spectrum()?);
                }
                for (mass, age) in self.continuum_field_bins() {
                    let (continuum, _) = spectra.spectrum_continuum(mass, age);
                    add_into(&mut total, &continuum);
                }
                total
            }
        };
        Ok(self.cache.spectrum.insert(spectrum).as_slice())
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

    /// Isotope masses ejected by every cluster and field star so far.
    pub fn yields(&mut self) -> Result<&[f64]> {
        let yields = match self.cache.yields.take() {
            Some(y) => y,
            None => {
                let model = Arc::clone(self.model.yield_model()?);
                let mut total = self.field_ledger.settle(model.as_ref(), self.time).to_vec();
                for cluster in self
                    .clusters
                    .iter_mut()
                    .chain(self.disrupted_clusters.iter_mut())
                {
                    add_into(&mut total, cluster.yields()?);
                }
                for (mass, age) in self.continuum_field_bins() {
                    add_into(&mut total, &self.model.continuum_yields(mass, age)?);
                }
                total
            }
        };
        Ok(self.cache.yields.insert(yields).as_slice())
    }

    pub fn time(&self) -> Time {
        self.time
    }

    /// Mass the star formation history has called for so far.
    pub fn target_mass(&self) -> Mass {
        self.target_mass
    }

    /// Mass actually formed, stochastic and continuum.
    pub fn mass(&self) -> Mass {
        self.mass
    }

    /// Alive mass in clusters (live and disrupted) and stochastic field stars.
    pub fn alive_mass(&self) -> Mass {
        self.alive_mass
    }

    /// Alive mass in clusters that are not yet disrupted.
    pub fn cluster_mass(&self) -> Mass {
        self.cluster_mass
    }

    /// Field-star mass formed outside the IMF's stochastic range.
    pub fn nonstochastic_field_mass(&self) -> Mass {
        self.nonstochastic_field_mass
    }

    /// Remnants of stochastic field stars.
    pub fn field_remnant_mass(&self) -> Mass {
        self.field_remnant_mass
    }

    pub fn field_supernovae(&self) -> u64 {
        self.field_supernovae
    }

    pub fn cluster_fraction(&self) -> f64 {
        self.cluster_fraction
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn disrupted_clusters(&self) -> &[Cluster] {
        &self.disrupted_clusters
    }

    pub fn field_stars(&self) -> &[FieldStar] {
        &self.field_stars
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    pub fn disrupted_count(&self) -> usize {
        self.disrupted_clusters.len()
    }

    pub fn field_star_count(&self) -> usize {
        self.field_stars.len()
    }

    pub fn next_cluster_id(&self) -> u64 {
        self.next_cluster_id
    }
}

fn add_into(total: &mut [f64], part: &[f64]) {
    for (t, p) in total.iter_mut().zip(part) {
        *t += p;
    }
}
