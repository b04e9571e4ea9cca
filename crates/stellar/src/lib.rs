//! Stellar collaborators for population synthesis.
//!
//! The traits here are the narrow contracts the cluster and galaxy engines
//! consume: evolutionary tracks, spectral synthesis, nucleosynthetic
//! yields, photometric filters and dust extinction. Each comes with a small
//! analytic reference implementation so the engines can run without
//! tabulated data.

pub mod analytic;
pub mod extinction;
pub mod integrator;
pub mod intervals;
pub mod photometry;
pub mod spectral;
pub mod tracks;
pub mod yields;

#[cfg(test)]
mod analytic_test;
#[cfg(test)]
mod extinction_test;
#[cfg(test)]
mod integrator_test;

pub use analytic::PowerLawTracks;
pub use extinction::{ExtinctionModel, PowerLawExtinction};
pub use integrator::{ImfIntegrator, QuadratureNode};
pub use photometry::{Band, BoxcarFilters, FilterSet};
pub use spectral::{BlackbodySynthesis, SpectralSynthesis, trapezoid};
pub use tracks::{StarState, StellarTrackModel, WolfRayetType};
pub use yields::{Isotope, MassWindowYields, YieldModel};
