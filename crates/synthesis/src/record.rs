//! Versioned, structured snapshots of cluster state.
//!
//! A [`ClusterRecord`] carries everything needed to rebuild a
//! [`Cluster`](crate::Cluster) against the same model: the surviving star
//! list, tallies and the pending yield ledger. Cached outputs are not
//! stored; they are recomputed on demand after restoring.

use serde::{Deserialize, Serialize};
use units::{Mass, Time};

use crate::cluster::ClusterPhase;
use crate::error::{Result, SynthesisError};
use crate::yield_ledger::YieldLedger;

pub const CLUSTER_RECORD_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterRecord {
    pub version: u32,
    pub id: u64,
    pub phase: ClusterPhase,
    pub target_mass: Mass,
    pub stochastic_birth_mass: Mass,
    pub nonstochastic_birth_mass: Mass,
    pub formation_time: Time,
    pub time: Time,
    /// `None` for clusters that are never disrupted
    pub lifetime: Option<Time>,
    pub a_v: Option<f64>,
    /// Alive stochastic star masses, ascending
    pub stars: Vec<f64>,
    pub initial_star_count: usize,
    pub dead_star_count: usize,
    pub died_last_step: Vec<f64>,
    pub stochastic_alive_mass: Mass,
    pub nonstochastic_alive_mass: Mass,
    pub stochastic_remnant_mass: Mass,
    pub nonstochastic_remnant_mass: Mass,
    pub stochastic_supernovae: u64,
    pub total_supernovae: f64,
    pub yield_ledger: YieldLedger,
}

impl ClusterRecord {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let record: Self = serde_json::from_str(text)?;
        record.check_version()?;
        Ok(record)
    }

    pub fn check_version(&self) -> Result<()> {
        if self.version == CLUSTER_RECORD_VERSION {
            Ok(())
        } else {
            Err(SynthesisError::UnsupportedRecordVersion(self.version))
        }
    }
}
