//! Piecewise probability distributions assembled from analytic segments.
//!
//! A [`PiecewisePdf`] stitches power-law, (log-)normal, exponential and
//! Schechter [`Segment`]s into one distribution, restricts an optional
//! stochastic sub-range, and draws either single deviates or whole
//! populations whose sum approaches a target (a cluster mass, say).

pub mod description;
pub mod error;
pub mod piecewise;
pub mod population;
pub mod sampling;
pub mod segment;
pub mod special;

#[cfg(test)]
mod description_test;
#[cfg(test)]
mod sampling_test;

pub use description::{PdfDescription, WeightedSegment};
pub use error::{PdfError, Result};
pub use piecewise::{PiecewisePdf, SamplingMethod};
pub use segment::{Segment, SegmentKind};
