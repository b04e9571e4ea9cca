//! Distribution construction and query errors

use thiserror::Error;

/// Result type for distribution operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Errors raised while building or querying a distribution
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PdfError {
    #[error("invalid {kind} segment on [{x_min}, {x_max}]: {reason}")]
    InvalidSegment {
        kind: &'static str,
        x_min: f64,
        x_max: f64,
        reason: String,
    },

    #[error("unknown segment type: {0}")]
    UnknownSegmentType(String),

    #[error("{kind} segment takes {expected} parameters, got {found}")]
    ParameterCount {
        kind: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{segments} segments need {expected} breakpoints, got {found}")]
    BreakpointCount {
        segments: usize,
        expected: usize,
        found: usize,
    },

    #[error("breakpoints must be strictly increasing (breakpoint {index})")]
    NonIncreasingBreakpoints { index: usize },

    #[error("cannot join segments continuously at breakpoint {index}: density vanishes")]
    Discontinuous { index: usize },

    #[error("segment weights must be finite, non-negative and not all zero")]
    InvalidWeights,

    #[error("normalization must be finite and positive, got {0}")]
    InvalidNormalization(f64),

    #[error("distribution has no segments")]
    Empty,

    #[error("range [{a}, {b}] does not overlap domain [{x_min}, {x_max}]")]
    Domain { a: f64, b: f64, x_min: f64, x_max: f64 },

    #[error("stochastic range [{min}, {max}] must lie within [{x_min}, {x_max}] with min <= max")]
    StochasticRange {
        min: f64,
        max: f64,
        x_min: f64,
        x_max: f64,
    },
}
