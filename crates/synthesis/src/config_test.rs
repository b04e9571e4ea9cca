use std::io::Write as _;

use approx::assert_relative_eq;
use piecewise_pdf::{PdfDescription, SamplingMethod};
use units::Time;

use crate::config::SynthesisConfig;
use crate::error::SynthesisError;

const GALAXY_TOML: &str = r#"
imf_stochastic_min = 1.0
sampling = "stop_before"
cluster_fraction = 0.5
seed = 7

[cluster_mass_function]
mode = "breakpoints"
breakpoints = [100.0, 1.0e5]
segments = [{ type = "power_law", slope = -2.0 }]

[star_formation_history]
mode = "breakpoints"
breakpoints = [0.0, 1.0e9]
segments = [{ type = "power_law", slope = 0.0 }]
normalization = 1.0e9

[integration]
points_per_decade = 32

[spectrum]
lambda_min = 100.0
lambda_max = 1.0e5
points = 300
"#;

#[test]
fn empty_config_uses_defaults() {
    let config = SynthesisConfig::from_toml_str("").unwrap();
    assert_eq!(config, SynthesisConfig::default());
    assert_eq!(config.imf, PdfDescription::kroupa());
    assert_eq!(config.sampling, SamplingMethod::StopNearest);
    assert_eq!(config.cluster_fraction, 1.0);
    assert_eq!(config.integration.points_per_decade, 64);
    assert_eq!(config.integration.sfh_time_bins, 64);
    assert_eq!(config.spectrum.points, 1000);
    assert!(config.star_formation_history.is_none());
}

#[test]
fn parses_a_galaxy_configuration() {
    let config = SynthesisConfig::from_toml_str(GALAXY_TOML).unwrap();
    assert_eq!(config.imf_stochastic_min, Some(1.0));
    assert_eq!(config.sampling, SamplingMethod::StopBefore);
    assert_eq!(config.cluster_fraction, 0.5);
    assert_eq!(config.seed, 7);
    assert_eq!(config.integration.points_per_decade, 32);
    assert_eq!(config.integration.sfh_time_bins, 64);

    let wavelengths = config.spectrum.wavelengths();
    assert_eq!(wavelengths.len(), 300);
    assert_relative_eq!(wavelengths[0], 100.0, max_relative = 1e-12);
    assert_relative_eq!(wavelengths[299], 1.0e5, max_relative = 1e-12);
}

#[test]
fn builds_an_imf_with_its_stochastic_range() {
    let config = SynthesisConfig::from_toml_str(GALAXY_TOML).unwrap();
    let imf = config.build_imf().unwrap();
    assert_eq!(imf.stochastic_min(), 1.0);
    assert_eq!(imf.stochastic_max(), imf.x_max());
    assert_eq!(imf.sampling_method(), SamplingMethod::StopBefore);
    assert!(imf.has_stochastic_range());

    let cmf = config.build_cluster_mass_function().unwrap().unwrap();
    assert_eq!(cmf.sampling_method(), SamplingMethod::StopBefore);
    let sfh = config.build_star_formation_history().unwrap();
    assert_relative_eq!(sfh.integral(), 1.0e9, max_relative = 1e-12);
}

#[test]
fn invalid_cluster_fraction_is_rejected() {
    let err = SynthesisConfig::from_toml_str("cluster_fraction = 1.5").unwrap_err();
    assert!(matches!(err, SynthesisError::Config(_)));
}

#[test]
fn clustered_galaxies_need_a_cluster_mass_function() {
    let text = r#"
cluster_fraction = 0.3

[star_formation_history]
mode = "breakpoints"
breakpoints = [0.0, 1.0e9]
segments = [{ type = "power_law", slope = 0.0 }]
"#;
    let err = SynthesisConfig::from_toml_str(text).unwrap_err();
    assert!(matches!(err, SynthesisError::Config(_)));

    let field_only = text.replace("cluster_fraction = 0.3", "cluster_fraction = 0.0");
    assert!(SynthesisConfig::from_toml_str(&field_only).is_ok());
}

#[test]
fn bad_spectrum_grid_is_rejected() {
    let text = "[spectrum]\nlambda_min = 5000.0\nlambda_max = 100.0\n";
    assert!(matches!(
        SynthesisConfig::from_toml_str(text),
        Err(SynthesisError::Config(_))
    ));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    assert!(matches!(
        SynthesisConfig::from_toml_str("cluster_fraction = \"half\""),
        Err(SynthesisError::Toml(_))
    ));
}

#[test]
fn missing_star_formation_history_cannot_build_a_galaxy() {
    let config = SynthesisConfig::default();
    assert!(matches!(
        config.build_star_formation_history(),
        Err(SynthesisError::Config(_))
    ));
}

#[test]
fn loads_from_a_file() {
    let path =
        std::env::temp_dir().join(format!("synthesis-config-{}.toml", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(GALAXY_TOML.as_bytes()).unwrap();
    drop(file);

    let config = SynthesisConfig::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(config.seed, 7);

    assert!(matches!(
        SynthesisConfig::load(&path),
        Err(SynthesisError::Io(_))
    ));
}

#[test]
fn built_model_and_galaxy_are_wired_up() {
    let config = SynthesisConfig::from_toml_str(GALAXY_TOML).unwrap();
    let model = std::sync::Arc::new(config.build_model().unwrap());
    assert!(model.spectra.is_some());
    assert!(model.yields.is_some());
    assert!(model.filters.is_some());
    assert!(model.extinction.is_none());
    assert_eq!(model.integrator.points_per_decade(), 32);

    let mut galaxy = config.build_galaxy(model).unwrap();
    assert_eq!(galaxy.cluster_fraction(), 0.5);
    let mut rng = config.rng();
    galaxy.advance(Time::from_myr(1.0), &mut rng).unwrap();
    assert!(galaxy.cluster_count() > 0);
    assert!(galaxy.field_star_count() > 0);
}

#[test]
fn same_seed_same_galaxy() {
    let config = SynthesisConfig::from_toml_str(GALAXY_TOML).unwrap();
    let run = || {
        let model = std::sync::Arc::new(config.build_model().unwrap());
        let mut galaxy = config.build_galaxy(model).unwrap();
        let mut rng = config.rng();
        galaxy.advance(Time::from_myr(1.0), &mut rng).unwrap();
        (galaxy.mass(), galaxy.cluster_count(), galaxy.field_star_count())
    };
    assert_eq!(run(), run());
}
