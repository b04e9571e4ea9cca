use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use piecewise_pdf::{PdfDescription, PiecewisePdf, Segment, SegmentKind};
use rand::SeedableRng;
use rand_chacha::ChaChaRng;
use stellar::{
    BlackbodySynthesis, BoxcarFilters, ImfIntegrator, MassWindowYields, PowerLawExtinction,
    PowerLawTracks, StarState, StellarTrackModel,
};

use crate::model::SynthesisModel;

pub fn rng(seed: u64) -> ChaChaRng {
    ChaChaRng::seed_from_u64(seed)
}

/// Salpeter IMF on 0.08–120 M☉, sampled star by star above `stochastic_min`.
pub fn salpeter(stochastic_min: f64, stochastic_max: f64) -> PiecewisePdf {
    let mut imf = PdfDescription::salpeter(0.08, 120.0).build().unwrap();
    imf.set_stochastic_range(stochastic_min, stochastic_max).unwrap();
    imf
}

/// Flat distribution on `[lo, hi]`.
pub fn uniform(lo: f64, hi: f64) -> PiecewisePdf {
    PiecewisePdf::from_segment(Segment::new(lo, hi, SegmentKind::PowerLaw { slope: 0.0 }).unwrap())
        .unwrap()
}

/// Power-law tracks that count isochrone evaluations.
#[derive(Debug, Default)]
pub struct CountingTracks {
    inner: PowerLawTracks,
    calls: AtomicUsize,
}

impl CountingTracks {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl StellarTrackModel for CountingTracks {
    fn min_mass(&self) -> f64 {
        self.inner.min_mass()
    }

    fn max_mass(&self) -> f64 {
        self.inner.max_mass()
    }

    fn is_monotonic(&self) -> bool {
        true
    }

    fn death_mass(&self, age: f64) -> f64 {
        self.inner.death_mass(age)
    }

    fn remnant_mass(&self, mass: f64) -> f64 {
        self.inner.remnant_mass(mass)
    }

    fn star_lifetime(&self, mass: f64) -> f64 {
        self.inner.star_lifetime(mass)
    }

    fn isochrone(&self, age: f64, masses: &[f64]) -> Vec<StarState> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.isochrone(age, masses)
    }
}

/// Power-law tracks except that stars inside `band` never die, so the
/// alive masses split into two intervals once the death mass drops below
/// the band.
#[derive(Debug, Default)]
pub struct BandTracks {
    inner: PowerLawTracks,
    pub band: (f64, f64),
}

impl BandTracks {
    pub fn new(lo: f64, hi: f64) -> Self {
        Self {
            inner: PowerLawTracks::default(),
            band: (lo, hi),
        }
    }
}

impl StellarTrackModel for BandTracks {
    fn min_mass(&self) -> f64 {
        self.inner.min_mass()
    }

    fn max_mass(&self) -> f64 {
        self.inner.max_mass()
    }

    fn is_monotonic(&self) -> bool {
        false
    }

    fn death_mass(&self, age: f64) -> f64 {
        self.inner.death_mass(age)
    }

    fn alive_mass_intervals(&self, age: f64) -> Vec<f64> {
        let dm = self.death_mass(age);
        let (lo, hi) = self.band;
        if dm < lo {
            vec![0.0, dm, lo, hi]
        } else {
            vec![0.0, dm.max(hi)]
        }
    }

    fn remnant_mass(&self, mass: f64) -> f64 {
        self.inner.remnant_mass(mass)
    }

    fn star_lifetime(&self, mass: f64) -> f64 {
        if mass >= self.band.0 && mass <= self.band.1 {
            f64::INFINITY
        } else {
            self.inner.star_lifetime(mass)
        }
    }

    fn isochrone(&self, age: f64, masses: &[f64]) -> Vec<StarState> {
        self.inner.isochrone(age, masses)
    }
}

pub fn bare_model(imf: PiecewisePdf, tracks: Arc<dyn StellarTrackModel>) -> SynthesisModel {
    SynthesisModel::new(Arc::new(imf), tracks)
}

/// Every collaborator wired up on a coarse wavelength grid.
pub fn full_model(imf: PiecewisePdf, tracks: Arc<dyn StellarTrackModel>) -> SynthesisModel {
    let imf = Arc::new(imf);
    let integrator = ImfIntegrator::new(16);
    let spectra = BlackbodySynthesis::new(
        BlackbodySynthesis::log_grid(100.0, 1.0e5, 200),
        Arc::clone(&imf),
        Arc::clone(&tracks),
        integrator,
    );
    SynthesisModel::new(imf, tracks)
        .with_integrator(integrator)
        .with_spectra(Arc::new(spectra))
        .with_yields(Arc::new(MassWindowYields::core_collapse()))
        .with_filters(Arc::new(BoxcarFilters::johnson()))
        .with_extinction(Arc::new(PowerLawExtinction::new(uniform(0.1, 1.0), 1.0)))
}
