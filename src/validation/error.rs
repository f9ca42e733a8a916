//! Typed errors for the validation engine

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("validation dataset is empty")]
    EmptyDataset,

    #[error("target column '{0}' not found in validation dataset")]
    MissingTarget(String),

    #[error("target has a single class; ranking metrics are undefined")]
    DegenerateTarget,

    #[error("length mismatch: {targets} targets vs {scores} scores")]
    LengthMismatch { targets: usize, scores: usize },

    #[error("model artifact unavailable: {0}")]
    ModelUnavailable(String),

    #[error(transparent)]
    Polars(#[from] polars::prelude::PolarsError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
