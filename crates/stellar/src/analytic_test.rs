use approx::assert_relative_eq;

use crate::analytic::PowerLawTracks;
use crate::tracks::{StellarTrackModel, WolfRayetType};

#[test]
fn death_mass_and_lifetime_are_inverse() {
    let tracks = PowerLawTracks::default();
    assert_relative_eq!(tracks.death_mass(1.0e10), 1.0, max_relative = 1e-12);
    assert_relative_eq!(tracks.star_lifetime(1.0), 1.0e10, max_relative = 1e-12);

    for age in [1.0e5, 3.0e6, 1.0e8, 5.0e9] {
        let m = tracks.death_mass(age);
        assert_relative_eq!(tracks.star_lifetime(m), age, max_relative = 1e-10);
    }
    assert!(tracks.death_mass(0.0).is_infinite());
}

#[test]
fn remnants_by_mass_regime() {
    let tracks = PowerLawTracks::default();
    assert_relative_eq!(tracks.remnant_mass(1.0), 0.503, max_relative = 1e-12);
    assert_relative_eq!(tracks.remnant_mass(10.0), 1.4);
    assert_relative_eq!(tracks.remnant_mass(40.0), 20.0);
}

#[test]
fn remnant_only_after_death() {
    let tracks = PowerLawTracks::default();
    let age = tracks.star_lifetime(10.0);
    assert!(tracks.is_alive(9.0, age));
    assert!(!tracks.is_alive(11.0, age));
    assert_eq!(tracks.remnant_mass_at(9.0, age), 0.0);
    assert_relative_eq!(tracks.remnant_mass_at(11.0, age), 1.4);
    assert_eq!(tracks.alive_intervals(age), vec![(0.0, tracks.death_mass(age))]);
}

#[test]
fn isochrone_keeps_order_and_skips_untracked_stars() {
    let tracks = PowerLawTracks::default();
    let states = tracks.isochrone(1.0e6, &[0.05, 2.0, 0.5]);
    assert_eq!(states.len(), 2);
    assert_eq!(states[0].initial_mass, 2.0);
    assert_eq!(states[1].initial_mass, 0.5);
    for s in &states {
        assert!(s.current_mass <= s.initial_mass);
        assert!(s.luminosity() > 0.0);
    }
}

#[test]
fn massive_stars_brighten_and_lose_mass() {
    let tracks = PowerLawTracks::default();
    let lifetime = tracks.star_lifetime(60.0);
    let young = tracks.isochrone(0.01 * lifetime, &[60.0])[0];
    let old = tracks.isochrone(0.9 * lifetime, &[60.0])[0];
    assert!(old.log_luminosity > young.log_luminosity);
    assert!(old.current_mass < young.current_mass);
}

#[test]
fn wolf_rayet_sequence_for_massive_stars() {
    let tracks = PowerLawTracks::default();
    let lifetime = tracks.star_lifetime(60.0);
    let wr = |f: f64| tracks.isochrone(f * lifetime, &[60.0])[0].wolf_rayet;

    assert_eq!(wr(0.1), WolfRayetType::None);
    assert_eq!(wr(0.7), WolfRayetType::Wn);
    assert_eq!(wr(0.99), WolfRayetType::Wc);

    let lifetime = tracks.star_lifetime(10.0);
    let state = tracks.isochrone(0.99 * lifetime, &[10.0])[0];
    assert_eq!(state.wolf_rayet, WolfRayetType::None);
    assert_relative_eq!(state.surface_h, 0.7);
}

#[test]
fn tracks_deserialize_with_defaults() {
    let tracks: PowerLawTracks = toml::from_str("coefficient = 2.0e4").unwrap();
    assert_relative_eq!(tracks.coefficient, 2.0e4);
    assert_relative_eq!(tracks.exponent, 0.4);
    assert!(tracks.is_monotonic());
}
