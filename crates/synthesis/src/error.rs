//! Errors raised by the cluster and galaxy engines.
//!
//! Malformed distributions surface as [`SynthesisError::Pdf`] or
//! [`SynthesisError::Config`] when a model is assembled. Misuse at run time,
//! such as stepping an engine backwards or to a NaN time, is refused with
//! [`SynthesisError::TimeReversal`] or [`SynthesisError::NonFiniteTime`]
//! rather than clamped.

use piecewise_pdf::PdfError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SynthesisError>;

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error(transparent)]
    Pdf(#[from] PdfError),

    /// `advance` was asked to move to an earlier time.
    #[error("cannot advance from t = {current} yr back to t = {requested} yr")]
    TimeReversal { requested: f64, current: f64 },

    #[error("cannot advance to non-finite time {0} yr")]
    NonFiniteTime(f64),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// An output needs a collaborator the model was built without.
    #[error("no {0} model configured")]
    MissingCollaborator(&'static str),

    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed cluster record: {0}")]
    Record(#[from] serde_json::Error),

    #[error("unsupported cluster record version {0}")]
    UnsupportedRecordVersion(u32),
}
