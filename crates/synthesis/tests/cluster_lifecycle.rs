//! Integration tests for a single cluster built from a configuration.
//!
//! These follow a 10⁴ M☉ Salpeter cluster from formation to 10 Gyr and
//! check that stars are conserved and every output stays consistent.

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaChaRng;
use units::{Mass, Time};

use synthesis::{Cluster, ClusterPhase, ClusterRecord, SynthesisConfig};

const CLUSTER_TOML: &str = r#"
imf_stochastic_min = 1.0
seed = 2024

[imf]
mode = "breakpoints"
breakpoints = [0.08, 120.0]
segments = [{ type = "power_law", slope = -2.35 }]

[cluster_lifetime]
mode = "breakpoints"
breakpoints = [5.0e7, 1.0e8]
segments = [{ type = "power_law", slope = 0.0 }]

[extinction]
exponent = 1.0

[extinction.av]
mode = "breakpoints"
breakpoints = [0.1, 2.0]
segments = [{ type = "power_law", slope = 0.0 }]

[spectrum]
lambda_min = 100.0
lambda_max = 1.0e5
points = 400
"#;

fn ages() -> Vec<f64> {
    // Log-spaced from 1 Myr to 10 Gyr
    (0..=24).map(|i| 1.0e6 * 10f64.powf(i as f64 / 6.0)).collect()
}

#[test]
fn cluster_lifecycle_integration() {
    let config = SynthesisConfig::from_toml_str(CLUSTER_TOML).unwrap();
    let model = Arc::new(config.build_model().unwrap());
    let mut rng = config.rng();

    let mut cluster = Cluster::new(
        0,
        Mass::from_solar_masses(1.0e4),
        Time::zero(),
        Arc::clone(&model),
        &mut rng,
    )
    .unwrap();
    let initial = cluster.initial_star_count();
    let birth_mass = cluster.birth_mass();

    println!("\n=== Formation ===");
    println!("Stars drawn: {initial}");
    println!(
        "Stochastic mass: {:.1} M☉, continuum: {:.1} M☉",
        cluster.stochastic_birth_mass().to_solar_masses(),
        cluster.nonstochastic_birth_mass().to_solar_masses()
    );
    println!("Lifetime: {:.1} Myr", cluster.lifetime().to_myr());

    assert!(initial > 0);
    let shortfall = (birth_mass - Mass::from_solar_masses(1.0e4)).to_solar_masses();
    assert!(shortfall.abs() < 120.0);

    let mut previous_supernovae = 0.0;
    let mut previous_remnants = Mass::zero();
    for age in ages() {
        cluster.advance(Time::from_years(age)).unwrap();

        assert_eq!(
            cluster.star_count() + cluster.dead_star_count(),
            initial,
            "stars lost at age {age:e}"
        );
        assert!(cluster.alive_mass() <= birth_mass * 1.001);
        assert!(cluster.remnant_mass() >= previous_remnants);
        assert!(cluster.total_supernovae() >= previous_supernovae);
        previous_remnants = cluster.remnant_mass();
        previous_supernovae = cluster.total_supernovae();

        let l = cluster.luminosity();
        let l_ext = cluster.luminosity_extincted().unwrap();
        let phot = cluster.photometry().unwrap().to_vec();
        let yields = cluster.yields().unwrap().to_vec();
        assert!(l.to_solar_luminosities() > 0.0);
        assert!(l_ext <= l);
        assert_eq!(phot[0], l.to_solar_luminosities());
        assert!(yields.iter().all(|&y| y >= 0.0));

        if (age.log10() * 6.0).round() as i64 % 6 == 0 {
            println!(
                "t={:>8.1} Myr: {:>6} stars, L={:.3e} L☉, remnants={:.1} M☉, SNe={:.1}, phase={:?}",
                age / 1.0e6,
                cluster.star_count(),
                l.to_solar_luminosities(),
                cluster.remnant_mass().to_solar_masses(),
                cluster.total_supernovae(),
                cluster.phase(),
            );
        }
    }

    assert_eq!(cluster.phase(), ClusterPhase::Disrupted);
    // Everything above ~1 M☉ is gone by 10 Gyr
    assert!(cluster.alive_stars().iter().all(|&m| m <= 1.01));
}

#[test]
fn restored_cluster_matches_the_original() {
    let config = SynthesisConfig::from_toml_str(CLUSTER_TOML).unwrap();
    let model = Arc::new(config.build_model().unwrap());
    let mut rng = ChaChaRng::seed_from_u64(99);

    let mut original = Cluster::new(
        5,
        Mass::from_solar_masses(2.0e3),
        Time::from_myr(10.0),
        Arc::clone(&model),
        &mut rng,
    )
    .unwrap();
    original.advance(Time::from_myr(15.0)).unwrap();

    let text = original.to_record().to_json().unwrap();
    let record = ClusterRecord::from_json(&text).unwrap();
    let mut restored = Cluster::from_record(record, model).unwrap();

    for myr in [20.0, 50.0, 200.0] {
        let t = Time::from_myr(myr);
        original.advance(t).unwrap();
        restored.advance(t).unwrap();
        assert_eq!(restored.star_count(), original.star_count());
        assert_eq!(restored.phase(), original.phase());
        let (a, b) = (
            original.luminosity().to_solar_luminosities(),
            restored.luminosity().to_solar_luminosities(),
        );
        assert!((a - b).abs() <= 1e-9 * a);
    }
}
