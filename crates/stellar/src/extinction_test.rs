use approx::assert_relative_eq;
use piecewise_pdf::{PiecewisePdf, Segment, SegmentKind};
use rand::SeedableRng;
use rand_chacha::ChaChaRng;

use crate::extinction::{ExtinctionModel, PowerLawExtinction};

fn uniform_av() -> PowerLawExtinction {
    let pdf = PiecewisePdf::from_segment(
        Segment::new(0.0, 2.0, SegmentKind::PowerLaw { slope: 0.0 }).unwrap(),
    )
    .unwrap();
    PowerLawExtinction::new(pdf, 1.0)
}

#[test]
fn drawn_extinction_stays_in_range() {
    let ext = uniform_av();
    let mut rng = ChaChaRng::seed_from_u64(3);
    for _ in 0..1000 {
        let av = ext.draw_av(&mut rng);
        assert!((0.0..=2.0).contains(&av));
    }
}

#[test]
fn attenuation_follows_the_curve() {
    let ext = uniform_av();
    let grid = [2750.0, 5500.0, 11000.0];
    let out = ext.apply(1.0, &grid, &[1.0, 1.0, 1.0]);

    assert_relative_eq!(out[1], 10f64.powf(-0.4), max_relative = 1e-12);
    assert_relative_eq!(out[0], 10f64.powf(-0.8), max_relative = 1e-12);
    assert_relative_eq!(out[2], 10f64.powf(-0.2), max_relative = 1e-12);
}

#[test]
fn zero_extinction_is_transparent() {
    let ext = uniform_av();
    let l = [3.0, 4.0];
    assert_eq!(ext.apply(0.0, &[4000.0, 6000.0], &l), l.to_vec());
}
