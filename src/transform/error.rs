//! Typed errors for the variable-transformation subsystem
//!
//! These are contract violations or artifact problems, not data-quality
//! issues: every variant is fatal for the current run and is never retried.

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    /// A transform-mode call found no fitted parameters for a column.
    #[error("no fitted {stage} parameters for column '{column}'; fit must run before transform")]
    NotFitted { stage: &'static str, column: String },

    /// Input data does not carry the columns the state was fitted on.
    #[error("input schema does not match fitted schema; missing columns: {0:?}")]
    SchemaMismatch(Vec<String>),

    /// A target-dependent operation was invoked without a target.
    #[error("target column '{0}' is required for this operation but was not supplied")]
    MissingTarget(String),

    /// A persisted state blob declares a schema version this build cannot read.
    #[error("unsupported transformer state schema version {found} (expected {expected})")]
    UnsupportedSchemaVersion { found: u32, expected: u32 },

    #[error("failed to access transformer state artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode transformer state artifact: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Polars(#[from] PolarsError),
}
