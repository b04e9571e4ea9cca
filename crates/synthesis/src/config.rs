//! TOML configuration for a synthesis run.
//!
//! Every field has a default, so an empty file describes a Kroupa IMF
//! sampled star by star, analytic tracks and a blackbody spectral grid.
//!
//! ```toml
//! imf_stochastic_min = 1.0
//! cluster_fraction = 0.5
//! seed = 7
//!
//! [cluster_mass_function]
//! mode = "breakpoints"
//! breakpoints = [100.0, 1.0e7]
//! segments = [{ type = "power_law", slope = -2.0 }]
//!
//! [star_formation_history]
//! mode = "breakpoints"
//! breakpoints = [0.0, 1.0e9]
//! segments = [{ type = "power_law", slope = 0.0 }]
//! normalization = 1.0e9
//! ```

use std::fs;
use std::path::Path;
use std::sync::Arc;

use piecewise_pdf::{PdfDescription, PiecewisePdf, SamplingMethod};
use rand::SeedableRng;
use rand_chacha::ChaChaRng;
use serde::{Deserialize, Serialize};
use stellar::{
    BlackbodySynthesis, BoxcarFilters, ImfIntegrator, MassWindowYields, PowerLawExtinction,
    PowerLawTracks,
};

use crate::error::{Result, SynthesisError};
use crate::galaxy::Galaxy;
use crate::model::SynthesisModel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationConfig {
    #[serde(default = "IntegrationConfig::default_points_per_decade")]
    pub points_per_decade: usize,
    #[serde(default = "IntegrationConfig::default_sfh_time_bins")]
    pub sfh_time_bins: usize,
}

impl IntegrationConfig {
    fn default_points_per_decade() -> usize {
        64
    }
    fn default_sfh_time_bins() -> usize {
        64
    }
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            points_per_decade: Self::default_points_per_decade(),
            sfh_time_bins: Self::default_sfh_time_bins(),
        }
    }
}

/// Log-spaced wavelength grid (Å).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumConfig {
    #[serde(default = "SpectrumConfig::default_lambda_min")]
    pub lambda_min: f64,
    #[serde(default = "SpectrumConfig::default_lambda_max")]
    pub lambda_max: f64,
    #[serde(default = "SpectrumConfig::default_points")]
    pub points: usize,
}

impl SpectrumConfig {
    fn default_lambda_min() -> f64 {
        91.2
    }
    fn default_lambda_max() -> f64 {
        1.0e6
    }
    fn default_points() -> usize {
        1000
    }

    pub fn wavelengths(&self) -> Vec<f64> {
        BlackbodySynthesis::log_grid(self.lambda_min, self.lambda_max, self.points)
    }
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            lambda_min: Self::default_lambda_min(),
            lambda_max: Self::default_lambda_max(),
            points: Self::default_points(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtinctionConfig {
    /// Distribution of A_V (mag)
    pub av: PdfDescription,
    #[serde(default = "ExtinctionConfig::default_exponent")]
    pub exponent: f64,
}

impl ExtinctionConfig {
    fn default_exponent() -> f64 {
        1.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisConfig {
    #[serde(default = "SynthesisConfig::default_imf")]
    pub imf: PdfDescription,
    #[serde(default)]
    pub imf_stochastic_min: Option<f64>,
    #[serde(default)]
    pub imf_stochastic_max: Option<f64>,
    #[serde(default)]
    pub sampling: SamplingMethod,
    #[serde(default)]
    pub cluster_mass_function: Option<PdfDescription>,
    /// Cluster lifetimes in years
    #[serde(default)]
    pub cluster_lifetime: Option<PdfDescription>,
    /// Star formation rate in M☉/yr against time in years
    #[serde(default)]
    pub star_formation_history: Option<PdfDescription>,
    #[serde(default = "SynthesisConfig::default_cluster_fraction")]
    pub cluster_fraction: f64,
    #[serde(default)]
    pub integration: IntegrationConfig,
    #[serde(default)]
    pub tracks: PowerLawTracks,
    #[serde(default)]
    pub spectrum: SpectrumConfig,
    #[serde(default)]
    pub extinction: Option<ExtinctionConfig>,
    #[serde(default)]
    pub seed: u64,
}

impl SynthesisConfig {
    fn default_imf() -> PdfDescription {
        PdfDescription::kroupa()
    }
    fn default_cluster_fraction() -> f64 {
        1.0
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.cluster_fraction) {
            return Err(SynthesisError::Config(format!(
                "cluster_fraction must lie in [0, 1], got {}",
                self.cluster_fraction
            )));
        }
        if self.cluster_fraction > 0.0
            && self.star_formation_history.is_some()
            && self.cluster_mass_function.is_none()
        {
            return Err(SynthesisError::Config(
                "cluster_fraction > 0 needs a cluster_mass_function".to_string(),
            ));
        }
        if self.spectrum.points < 2 || !(self.spectrum.lambda_min < self.spectrum.lambda_max) {
            return Err(SynthesisError::Config(
                "spectrum grid needs at least two points over an increasing range".to_string(),
            ));
        }
        Ok(())
    }

    pub fn rng(&self) -> ChaChaRng {
        ChaChaRng::seed_from_u64(self.seed)
    }

    /// The IMF with its stochastic range and sampling method applied.
    pub fn build_imf(&self) -> Result<PiecewisePdf> {
        let mut imf = self.imf.build()?.with_sampling_method(self.sampling);
        if self.imf_stochastic_min.is_some() || self.imf_stochastic_max.is_some() {
            let min = self.imf_stochastic_min.unwrap_or(imf.x_min());
            let max = self.imf_stochastic_max.unwrap_or(imf.x_max());
            imf.set_stochastic_range(min, max)?;
        }
        Ok(imf)
    }

    pub fn build_cluster_mass_function(&self) -> Result<Option<PiecewisePdf>> {
        Ok(self
            .cluster_mass_function
            .as_ref()
            .map(PdfDescription::build)
            .transpose()?
            .map(|pdf| pdf.with_sampling_method(self.sampling)))
    }

    pub fn build_cluster_lifetime(&self) -> Result<Option<PiecewisePdf>> {
        Ok(self
            .cluster_lifetime
            .as_ref()
            .map(PdfDescription::build)
            .transpose()?)
    }

    pub fn build_star_formation_history(&self) -> Result<PiecewisePdf> {
        self.star_formation_history
            .as_ref()
            .ok_or_else(|| SynthesisError::Config("no star_formation_history given".to_string()))?
            .build()
            .map_err(SynthesisError::from)
    }

    /// Reference model: analytic tracks, blackbody spectra, core-collapse
    /// yields and Johnson-like boxcar filters.
    pub fn build_model(&self) -> Result<SynthesisModel> {
        let imf = Arc::new(self.build_imf()?);
        let tracks = Arc::new(self.tracks.clone());
        let integrator = ImfIntegrator::new(self.integration.points_per_decade);
        let spectra = BlackbodySynthesis::new(
            self.spectrum.wavelengths(),
            Arc::clone(&imf),
            tracks.clone(),
            integrator,
        );

        let mut model = SynthesisModel::new(imf, tracks)
            .with_integrator(integrator)
            .with_spectra(Arc::new(spectra))
            .with_yields(Arc::new(MassWindowYields::core_collapse()))
            .with_filters(Arc::new(BoxcarFilters::johnson()));
        if let Some(lifetime) = self.build_cluster_lifetime()? {
            model = model.with_cluster_lifetime(Arc::new(lifetime));
        }
        if let Some(ext) = &self.extinction {
            model = model.with_extinction(Arc::new(PowerLawExtinction::new(
                ext.av.build()?,
                ext.exponent,
            )));
        }
        Ok(model)
    }

    pub fn build_galaxy(&self, model: Arc<SynthesisModel>) -> Result<Galaxy> {
        Ok(Galaxy::new(
            model,
            self.build_cluster_mass_function()?,
            self.build_star_formation_history()?,
            self.cluster_fraction,
        )?
        .with_sfh_time_bins(self.integration.sfh_time_bins))
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            imf: Self::default_imf(),
            imf_stochastic_min: None,
            imf_stochastic_max: None,
            sampling: SamplingMethod::default(),
            cluster_mass_function: None,
            cluster_lifetime: None,
            star_formation_history: None,
            cluster_fraction: Self::default_cluster_fraction(),
            integration: IntegrationConfig::default(),
            tracks: PowerLawTracks::default(),
            spectrum: SpectrumConfig::default(),
            extinction: None,
            seed: 0,
        }
    }
}
