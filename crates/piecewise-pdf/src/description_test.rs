use approx::assert_relative_eq;

use crate::description::{PdfDescription, WeightedSegment};
use crate::error::PdfError;
use crate::segment::SegmentKind;

#[test]
fn kroupa_builds_a_continuous_imf() {
    let imf = PdfDescription::kroupa().build().unwrap();
    assert_relative_eq!(imf.x_min(), 0.08);
    assert_relative_eq!(imf.x_max(), 120.0);
    assert_eq!(imf.segments().len(), 2);
    assert_relative_eq!(
        imf.density(0.5 - 1e-10),
        imf.density(0.5),
        max_relative = 1e-6
    );
}

#[test]
fn breakpoint_description_from_toml() {
    let text = r#"
        mode = "breakpoints"
        breakpoints = [0.1, 0.5, 100.0]
        segments = [
            { type = "power_law", slope = -1.3 },
            { type = "power_law", slope = -2.3 },
        ]
    "#;
    let desc: PdfDescription = toml::from_str(text).unwrap();
    let pdf = desc.build().unwrap();
    assert_relative_eq!(pdf.normalization(), 1.0);
    assert_relative_eq!(pdf.weights().iter().sum::<f64>(), 1.0, max_relative = 1e-12);
}

#[test]
fn advanced_description_keeps_normalization() {
    let desc = PdfDescription::Advanced {
        segments: vec![
            WeightedSegment {
                x_min: 1.0e2,
                x_max: 1.0e7,
                weight: 1.0,
                kind: SegmentKind::PowerLaw { slope: -2.0 },
            },
            WeightedSegment {
                x_min: 1.0e3,
                x_max: 1.0e5,
                weight: 1.0,
                kind: SegmentKind::Lognormal {
                    mean: 1.0e4,
                    dispersion: 0.5,
                },
            },
        ],
        normalization: 3.0,
    };
    let pdf = desc.build().unwrap();
    assert_relative_eq!(pdf.integral(), 3.0, max_relative = 1e-12);

    let json = serde_json::to_string(&desc).unwrap();
    let back: PdfDescription = serde_json::from_str(&json).unwrap();
    assert_eq!(back, desc);
}

#[test]
fn constant_history_integrates_to_total_mass() {
    let sfh = PdfDescription::constant(0.0, 1.0e8, 1.0e6).build().unwrap();
    assert_relative_eq!(sfh.integral_between(0.0, 1.0e7), 1.0e5, max_relative = 1e-12);
}

#[test]
fn malformed_descriptions_fail_to_build() {
    let desc = PdfDescription::Breakpoints {
        breakpoints: vec![1.0, 0.5],
        segments: vec![SegmentKind::PowerLaw { slope: -2.35 }],
        normalization: 1.0,
    };
    assert_eq!(
        desc.build().unwrap_err(),
        PdfError::NonIncreasingBreakpoints { index: 1 }
    );

    let unknown: Result<PdfDescription, _> = toml::from_str(
        r#"
        mode = "breakpoints"
        breakpoints = [1.0, 2.0]
        segments = [{ type = "kroupa" }]
        "#,
    );
    assert!(unknown.is_err());
}

#[test]
fn normalization_must_be_finite_and_positive() {
    for bad in [-1.0e9, 0.0, f64::NAN, f64::INFINITY] {
        let desc = PdfDescription::constant(0.0, 1.0e9, bad);
        assert!(
            matches!(desc.build(), Err(PdfError::InvalidNormalization(_))),
            "normalization {bad} accepted"
        );
    }

    let advanced = PdfDescription::Advanced {
        segments: vec![WeightedSegment {
            x_min: 1.0,
            x_max: 10.0,
            weight: 1.0,
            kind: SegmentKind::PowerLaw { slope: 0.0 },
        }],
        normalization: f64::NEG_INFINITY,
    };
    assert!(matches!(
        advanced.build(),
        Err(PdfError::InvalidNormalization(_))
    ));

    let from_toml: PdfDescription = toml::from_str(
        r#"
        mode = "breakpoints"
        breakpoints = [0.0, 1.0e9]
        segments = [{ type = "power_law", slope = 0.0 }]
        normalization = -5.0e8
        "#,
    )
    .unwrap();
    assert_eq!(
        from_toml.build().unwrap_err(),
        PdfError::InvalidNormalization(-5.0e8)
    );
}
