//! Serializable descriptions of piecewise distributions.
//!
//! These are the typed records a configuration file or distribution-file
//! reader produces. [`PdfDescription::build`] validates and assembles them.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::piecewise::PiecewisePdf;
use crate::segment::{Segment, SegmentKind};

/// A segment with an explicit domain and relative weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedSegment {
    pub x_min: f64,
    pub x_max: f64,
    pub weight: f64,
    pub kind: SegmentKind,
}

fn default_normalization() -> f64 {
    1.0
}

/// Either of the two ways to lay out a piecewise distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PdfDescription {
    /// Contiguous segments joined continuously at shared breakpoints
    Breakpoints {
        breakpoints: Vec<f64>,
        segments: Vec<SegmentKind>,
        #[serde(default = "default_normalization")]
        normalization: f64,
    },
    /// Free-standing segments with explicit weights
    Advanced {
        segments: Vec<WeightedSegment>,
        #[serde(default = "default_normalization")]
        normalization: f64,
    },
}

impl PdfDescription {
    /// Kroupa (2001) IMF: slope −1.3 on 0.08–0.5 M☉, −2.3 on 0.5–120 M☉.
    pub fn kroupa() -> Self {
        Self::Breakpoints {
            breakpoints: vec![0.08, 0.5, 120.0],
            segments: vec![
                SegmentKind::PowerLaw { slope: -1.3 },
                SegmentKind::PowerLaw { slope: -2.3 },
            ],
            normalization: 1.0,
        }
    }

    /// Salpeter (1955) IMF, slope −2.35, over `[x_min, x_max]`.
    pub fn salpeter(x_min: f64, x_max: f64) -> Self {
        Self::Breakpoints {
            breakpoints: vec![x_min, x_max],
            segments: vec![SegmentKind::PowerLaw { slope: -2.35 }],
            normalization: 1.0,
        }
    }

    /// A single flat segment on `[t_start, t_end]` integrating to `total`;
    /// the usual constant star formation history.
    pub fn constant(t_start: f64, t_end: f64, total: f64) -> Self {
        Self::Breakpoints {
            breakpoints: vec![t_start, t_end],
            segments: vec![SegmentKind::PowerLaw { slope: 0.0 }],
            normalization: total,
        }
    }

    pub fn build(&self) -> Result<PiecewisePdf> {
        match self {
            Self::Breakpoints {
                breakpoints,
                segments,
                normalization,
            } => PiecewisePdf::from_breakpoints(breakpoints, segments)?
                .with_normalization(*normalization),
            Self::Advanced {
                segments,
                normalization,
            } => {
                let parts = segments
                    .iter()
                    .map(|s| Segment::new(s.x_min, s.x_max, s.kind).map(|seg| (seg, s.weight)))
                    .collect::<Result<Vec<_>>>()?;
                PiecewisePdf::from_weighted_segments(parts)?.with_normalization(*normalization)
            }
        }
    }
}
