use approx::assert_relative_eq;
use stellar::{Isotope, MassWindowYields};
use units::Time;

use crate::yield_ledger::YieldLedger;

/// One stable and one unstable isotope, both 10% of any star's mass.
fn toy_yields() -> MassWindowYields {
    MassWindowYields::new(
        vec![
            Isotope::stable("C12", 6, 12),
            Isotope::unstable("X", 20, 40, 1.0e6),
        ],
        vec![0.1, 0.1],
        vec![0.0, 1000.0],
    )
}

#[test]
fn empty_ledger_settles_to_zero() {
    let mut ledger = YieldLedger::new();
    let settled = ledger.settle(&toy_yields(), Time::from_myr(5.0));
    assert_eq!(settled, &[0.0, 0.0]);
    assert!(ledger.pending().is_empty());
}

#[test]
fn pending_deaths_decay_from_their_own_death_time() {
    let mut ledger = YieldLedger::new();
    ledger.record(10.0, Time::from_years(1.0e6));
    ledger.record(20.0, Time::from_years(2.0e6));
    assert_eq!(ledger.pending().len(), 2);

    let y = ledger.settle(&toy_yields(), Time::from_years(3.0e6)).to_vec();
    assert!(ledger.pending().is_empty());
    assert_relative_eq!(y[0], 3.0, max_relative = 1e-12);
    let expected = 1.0 * (-2.0f64).exp() + 2.0 * (-1.0f64).exp();
    assert_relative_eq!(y[1], expected, max_relative = 1e-12);
}

#[test]
fn settling_often_matches_settling_once() {
    let deaths = [(12.0, 1.0e6), (9.0, 1.5e6), (30.0, 4.0e6), (15.0, 7.0e6)];
    let yields = toy_yields();

    let mut often = YieldLedger::new();
    for &(mass, t) in &deaths {
        often.record(mass, Time::from_years(t));
        often.settle(&yields, Time::from_years(t + 5.0e5));
    }
    let mut once = YieldLedger::new();
    for &(mass, t) in &deaths {
        once.record(mass, Time::from_years(t));
    }

    let end = Time::from_years(1.0e7);
    let a = often.settle(&yields, end).to_vec();
    let b = once.settle(&yields, end).to_vec();
    for (x, y) in a.iter().zip(&b) {
        assert_relative_eq!(*x, *y, max_relative = 1e-9);
    }
}

#[test]
fn settled_values_hold_until_the_next_settle() {
    let mut ledger = YieldLedger::new();
    ledger.record(10.0, Time::zero());
    let at_settle = ledger.settle(&toy_yields(), Time::from_myr(1.0)).to_vec();
    ledger.record(5.0, Time::from_myr(1.5));
    assert_eq!(ledger.settled(), at_settle.as_slice());
}

#[test]
fn clear_forgets_everything() {
    let mut ledger = YieldLedger::new();
    ledger.record(10.0, Time::zero());
    ledger.settle(&toy_yields(), Time::from_myr(1.0));
    ledger.record(5.0, Time::from_myr(1.5));
    ledger.clear();
    assert!(ledger.pending().is_empty());
    assert!(ledger.settled().is_empty());
    assert_eq!(ledger, YieldLedger::default());
}

#[test]
fn round_trips_through_json() {
    let mut ledger = YieldLedger::new();
    ledger.record(10.0, Time::from_years(1.0e6));
    ledger.settle(&toy_yields(), Time::from_years(2.0e6));
    ledger.record(25.0, Time::from_years(3.0e6));

    let text = serde_json::to_string(&ledger).unwrap();
    let mut restored: YieldLedger = serde_json::from_str(&text).unwrap();
    assert_eq!(restored.pending().len(), 1);

    let now = Time::from_years(5.0e6);
    let a = ledger.settle(&toy_yields(), now).to_vec();
    let b = restored.settle(&toy_yields(), now).to_vec();
    for (x, y) in a.iter().zip(&b) {
        assert_relative_eq!(*x, *y, max_relative = 1e-12);
    }
}
