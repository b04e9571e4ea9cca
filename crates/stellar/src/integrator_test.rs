use approx::assert_relative_eq;
use piecewise_pdf::PdfDescription;

use crate::integrator::ImfIntegrator;

fn kroupa() -> piecewise_pdf::PiecewisePdf {
    PdfDescription::kroupa().build().unwrap()
}

#[test]
fn nodes_recover_mass_and_number() {
    let imf = kroupa();
    let integrator = ImfIntegrator::default();
    let full = [(imf.x_min(), imf.x_max())];

    let mass = integrator.integrate(&imf, 1.0e4, &full, |m| m);
    assert_relative_eq!(mass, 1.0e4, max_relative = 1e-3);

    let number: f64 = integrator
        .nodes(&imf, 1.0e4, &full)
        .iter()
        .map(|n| n.weight)
        .sum();
    assert_relative_eq!(
        number,
        ImfIntegrator::number_between(&imf, 1.0e4, imf.x_min(), imf.x_max()),
        max_relative = 1e-3
    );
}

#[test]
fn sub_range_across_a_breakpoint() {
    let imf = kroupa();
    let integrator = ImfIntegrator::new(32);
    let mass = integrator.integrate(&imf, 500.0, &[(0.2, 3.0)], |m| m);
    assert_relative_eq!(
        mass,
        ImfIntegrator::mass_between(&imf, 500.0, 0.2, 3.0),
        max_relative = 2e-3
    );
}

#[test]
fn ranges_are_clipped_to_the_domain() {
    let imf = kroupa();
    let integrator = ImfIntegrator::default();
    let nodes = integrator.nodes(&imf, 1.0, &[(0.0, 0.05), (100.0, 500.0)]);
    assert!(nodes.iter().all(|n| n.mass >= 100.0 && n.mass <= 120.0));
    assert!(integrator.nodes(&imf, 0.0, &[(1.0, 2.0)]).is_empty());
}

#[test]
fn continuum_ranges_follow_the_stochastic_range() {
    let mut imf = kroupa();
    assert!(ImfIntegrator::continuum_ranges(&imf).is_empty());

    imf.set_stochastic_range(1.0, 120.0).unwrap();
    assert_eq!(ImfIntegrator::continuum_ranges(&imf), vec![(0.08, 1.0)]);

    imf.set_stochastic_range(1.0, 20.0).unwrap();
    assert_eq!(
        ImfIntegrator::continuum_ranges(&imf),
        vec![(0.08, 1.0), (20.0, 120.0)]
    );
}

#[test]
fn points_per_decade_has_a_floor() {
    assert_eq!(ImfIntegrator::new(1).points_per_decade(), 4);
    assert_eq!(ImfIntegrator::default().points_per_decade(), 64);
}
