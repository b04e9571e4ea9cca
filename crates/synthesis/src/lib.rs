//! Stochastic stellar population synthesis.
//!
//! [`Cluster`] draws a coeval population from the IMF and follows it as
//! stars die, leave remnants and eject yields. [`Galaxy`] forms clusters
//! and field stars from a star formation history and sums their outputs.
//! Both split the IMF into a stochastic range, sampled star by star, and a
//! continuum handled by integration over the IMF.
//!
//! Randomness is always passed in as a [`rand_chacha::ChaChaRng`], so a
//! fixed seed reproduces a run exactly.

mod cache;
pub mod cluster;
pub mod config;
pub mod error;
pub mod galaxy;
pub mod model;
pub mod record;
pub mod yield_ledger;

#[cfg(test)]
mod config_test;
#[cfg(test)]
mod test_support;
#[cfg(test)]
mod yield_ledger_test;

pub use cluster::{Cluster, ClusterPhase};
pub use config::{ExtinctionConfig, IntegrationConfig, SpectrumConfig, SynthesisConfig};
pub use error::{Result, SynthesisError};
pub use galaxy::{FieldStar, Galaxy};
pub use model::SynthesisModel;
pub use record::{CLUSTER_RECORD_VERSION, ClusterRecord};
pub use yield_ledger::{PendingDeath, YieldLedger};
