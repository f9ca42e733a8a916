//! Persisted transformer state
//!
//! Everything `fit_transform` learns is captured in one immutable
//! [`TransformerState`] value: encoders, scaler parameters, the selection
//! audit trail and the surviving feature list. The blob is serialized to
//! JSON with an explicit schema version so a stale artifact fails loudly
//! instead of silently transforming with the wrong parameters.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

use super::encoding::ColumnEncoder;
use super::error::TransformError;
use super::scaling::FittedScaler;
use super::selection::FeatureSelectionStep;

/// Version of the on-disk state layout this build reads and writes.
pub const STATE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformerState {
    pub schema_version: u32,
    /// Input columns present when the state was fitted, target included.
    pub fitted_columns: Vec<String>,
    pub encoders: Vec<ColumnEncoder>,
    pub scaler: FittedScaler,
    pub selection_steps: Vec<FeatureSelectionStep>,
    /// Final feature set after selection, target excluded.
    pub selected_features: Vec<String>,
}

impl TransformerState {
    /// Write the state as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), TransformError> {
        let encoded = serde_json::to_string_pretty(self)?;
        fs::write(path, encoded)?;
        Ok(())
    }

    /// Read a state blob back, rejecting unknown schema versions.
    pub fn load(path: &Path) -> Result<Self, TransformError> {
        let raw = fs::read_to_string(path)?;
        let state: TransformerState = serde_json::from_str(&raw)?;
        if state.schema_version != STATE_SCHEMA_VERSION {
            return Err(TransformError::UnsupportedSchemaVersion {
                found: state.schema_version,
                expected: STATE_SCHEMA_VERSION,
            });
        }
        Ok(state)
    }

    /// Verify new data carries every fitted input column (the target is
    /// optional at transform time).
    pub fn check_schema(&self, df: &DataFrame, target_column: &str) -> Result<(), TransformError> {
        let available: BTreeSet<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let missing: Vec<String> = self
            .fitted_columns
            .iter()
            .filter(|name| name.as_str() != target_column && !available.contains(*name))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(TransformError::SchemaMismatch(missing));
        }
        Ok(())
    }
}
