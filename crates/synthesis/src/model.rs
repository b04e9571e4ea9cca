//! The collaborators shared by every cluster and galaxy in a run.
//!
//! A [`SynthesisModel`] bundles the IMF with the track, spectral, yield,
//! filter and extinction models, and knows how to integrate per-star
//! quantities over the non-stochastic (continuum) part of the IMF.
//!
//! Continuum helpers take `population_mass`, the total birth mass of the
//! population the continuum belongs to, stochastic part included. The IMF
//! integrator only counts the mass outside the stochastic range.

use std::sync::Arc;

use piecewise_pdf::PiecewisePdf;
use stellar::intervals::{complement, cuts_to_intervals, intersect, split_at};
use stellar::{
    ExtinctionModel, FilterSet, ImfIntegrator, SpectralSynthesis, StarState, StellarTrackModel,
    YieldModel,
};

use crate::error::{Result, SynthesisError};

#[derive(Debug, Clone)]
pub struct SynthesisModel {
    pub imf: Arc<PiecewisePdf>,
    pub tracks: Arc<dyn StellarTrackModel>,
    pub spectra: Option<Arc<dyn SpectralSynthesis>>,
    pub yields: Option<Arc<dyn YieldModel>>,
    pub filters: Option<Arc<dyn FilterSet>>,
    pub extinction: Option<Arc<dyn ExtinctionModel>>,
    /// Distribution of cluster lifetimes (yr); clusters live forever without it
    pub cluster_lifetime: Option<Arc<PiecewisePdf>>,
    pub integrator: ImfIntegrator,
}

impl SynthesisModel {
    pub fn new(imf: Arc<PiecewisePdf>, tracks: Arc<dyn StellarTrackModel>) -> Self {
        Self {
            imf,
            tracks,
            spectra: None,
            yields: None,
            filters: None,
            extinction: None,
            cluster_lifetime: None,
            integrator: ImfIntegrator::default(),
        }
    }

    pub fn with_spectra(mut self, spectra: Arc<dyn SpectralSynthesis>) -> Self {
        self.spectra = Some(spectra);
        self
    }

    pub fn with_yields(mut self, yields: Arc<dyn YieldModel>) -> Self {
        self.yields = Some(yields);
        self
    }

    pub fn with_filters(mut self, filters: Arc<dyn FilterSet>) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn with_extinction(mut self, extinction: Arc<dyn ExtinctionModel>) -> Self {
        self.extinction = Some(extinction);
        self
    }

    pub fn with_cluster_lifetime(mut self, lifetime: Arc<PiecewisePdf>) -> Self {
        self.cluster_lifetime = Some(lifetime);
        self
    }

    pub fn with_integrator(mut self, integrator: ImfIntegrator) -> Self {
        self.integrator = integrator;
        self
    }

    pub(crate) fn spectra(&self) -> Result<&Arc<dyn SpectralSynthesis>> {
        self.spectra
            .as_ref()
            .ok_or(SynthesisError::MissingCollaborator("spectral synthesis"))
    }

    pub(crate) fn yield_model(&self) -> Result<&Arc<dyn YieldModel>> {
        self.yields
            .as_ref()
            .ok_or(SynthesisError::MissingCollaborator("yield"))
    }

    pub(crate) fn filters(&self) -> Result<&Arc<dyn FilterSet>> {
        self.filters
            .as_ref()
            .ok_or(SynthesisError::MissingCollaborator("filter"))
    }

    pub(crate) fn extinction(&self) -> Result<&Arc<dyn ExtinctionModel>> {
        self.extinction
            .as_ref()
            .ok_or(SynthesisError::MissingCollaborator("extinction"))
    }

    /// Supernovae are only tracked when a yield model says which stars
    /// explode.
    pub fn produces_supernova(&self, mass: f64) -> bool {
        self.yields
            .as_ref()
            .is_some_and(|y| y.produces_supernova(mass))
    }

    pub fn has_continuum(&self) -> bool {
        self.imf.has_stochastic_range()
    }

    /// Continuum mass ranges still alive at `age`.
    pub fn alive_continuum(&self, age: f64) -> Vec<(f64, f64)> {
        intersect(
            &ImfIntegrator::continuum_ranges(&self.imf),
            &self.tracks.alive_intervals(age),
        )
    }

    /// Continuum mass ranges whose stars have died by `age`.
    pub fn dead_continuum(&self, age: f64) -> Vec<(f64, f64)> {
        let dead = complement(
            &self.tracks.alive_intervals(age),
            self.imf.x_min(),
            self.imf.x_max(),
        );
        intersect(&ImfIntegrator::continuum_ranges(&self.imf), &dead)
    }

    /// Quadrature weights and isochrone states of the alive continuum stars
    /// the tracks cover.
    fn tracked_continuum(&self, population_mass: f64, age: f64) -> (Vec<f64>, Vec<StarState>) {
        let tracked = intersect(
            &self.alive_continuum(age),
            &[(self.tracks.min_mass(), f64::INFINITY)],
        );
        let (weights, masses): (Vec<f64>, Vec<f64>) = self
            .integrator
            .nodes(&self.imf, population_mass, &tracked)
            .into_iter()
            .filter(|n| n.weight > 0.0 && n.mass >= self.tracks.min_mass())
            .map(|n| (n.weight, n.mass))
            .unzip();
        let states = self.tracks.isochrone(age, &masses);
        (weights, states)
    }

    /// Present-day mass of the alive continuum stars.
    pub fn continuum_alive_mass(&self, population_mass: f64, age: f64) -> f64 {
        // Stars below the tracks never evolve and keep their birth mass
        let untracked: f64 = intersect(&self.alive_continuum(age), &[(0.0, self.tracks.min_mass())])
            .iter()
            .map(|&(lo, hi)| ImfIntegrator::mass_between(&self.imf, population_mass, lo, hi))
            .sum();
        let (weights, states) = self.tracked_continuum(population_mass, age);
        let tracked: f64 = weights
            .iter()
            .zip(&states)
            .map(|(w, s)| w * s.current_mass)
            .sum();
        untracked + tracked
    }

    /// Remnant mass left by the continuum stars dead by `age`.
    pub fn continuum_remnant_mass(&self, population_mass: f64, age: f64) -> f64 {
        let dead = self.dead_continuum(age);
        self.integrator
            .integrate(&self.imf, population_mass, &dead, |m| {
                self.tracks.remnant_mass(m)
            })
    }

    /// Expected number of continuum supernovae by `age`.
    pub fn continuum_supernovae(&self, population_mass: f64, age: f64) -> f64 {
        let Some(yields) = &self.yields else {
            return 0.0;
        };
        let exploding = cuts_to_intervals(&yields.supernova_mass_range());
        intersect(&self.dead_continuum(age), &exploding)
            .iter()
            .map(|&(lo, hi)| ImfIntegrator::number_between(&self.imf, population_mass, lo, hi))
            .sum()
    }

    /// Continuum yields at `age`, each star's unstable isotopes decayed
    /// since its own death.
    pub fn continuum_yields(&self, population_mass: f64, age: f64) -> Result<Vec<f64>> {
        let yields = self.yield_model()?;
        let ranges = split_at(
            &self.dead_continuum(age),
            &yields.supernova_mass_range(),
        );
        let mut total = vec![0.0; yields.isotope_count()];
        for node in self.integrator.nodes(&self.imf, population_mass, &ranges) {
            if node.weight == 0.0 {
                continue;
            }
            let decay_time = age - self.tracks.star_lifetime(node.mass);
            let star = yields.yields(&[node.mass], &[decay_time]);
            for (sum, y) in total.iter_mut().zip(star) {
                *sum += node.weight * y;
            }
        }
        Ok(total)
    }

    /// Bolometric luminosity (L☉) of the alive continuum stars.
    pub fn continuum_luminosity(&self, population_mass: f64, age: f64) -> f64 {
        if let Some(spectra) = &self.spectra {
            return spectra.luminosity_continuum(population_mass, age);
        }
        let (weights, states) = self.tracked_continuum(population_mass, age);
        weights
            .iter()
            .zip(&states)
            .map(|(w, s)| w * s.luminosity())
            .sum()
    }

    pub fn continuum_spectrum(&self, population_mass: f64, age: f64) -> Result<(Vec<f64>, f64)> {
        Ok(self.spectra()?.spectrum_continuum(population_mass, age))
    }
}

/// Overwrites the bolometric slots of `photometry` with `lbol`.
pub(crate) fn fill_bolometric(filters: &dyn FilterSet, photometry: &mut [f64], lbol: f64) {
    for (i, value) in photometry.iter_mut().enumerate() {
        if filters.is_bolometric(i) {
            *value = lbol;
        }
    }
}
