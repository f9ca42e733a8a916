//! Variable transformation pipeline
//!
//! Three ordered stages over an engineered frame: categorical encoding,
//! numerical scaling and feature selection. Fitting is a pure function of
//! the input data and configuration; it returns the transformed frame plus
//! an immutable [`TransformerState`] that replays the exact same
//! transformation on new data.

pub mod encoding;
pub mod error;
pub mod scaling;
pub mod selection;
pub mod state;

use anyhow::{Context, Result};
use polars::prelude::*;

pub use encoding::{ColumnEncoder, EncodingConfig, FittedEncoder, MISSING_SENTINEL, RARE_SENTINEL};
pub use error::TransformError;
pub use scaling::{FittedScaler, ScalingMethod};
pub use selection::{FeatureSelectionStep, SelectionConfig};
pub use state::{TransformerState, STATE_SCHEMA_VERSION};

use crate::dataset::{self, DEFAULT_TARGET_COLUMN};
use crate::utils::print_info;

#[derive(Debug, Clone)]
pub struct TransformConfig {
    pub target_column: String,
    pub encoding: EncodingConfig,
    pub scaling_method: ScalingMethod,
    pub selection: SelectionConfig,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            target_column: DEFAULT_TARGET_COLUMN.to_string(),
            encoding: EncodingConfig::default(),
            scaling_method: ScalingMethod::default(),
            selection: SelectionConfig::default(),
        }
    }
}

pub struct VariableTransformer {
    config: TransformConfig,
}

impl VariableTransformer {
    pub fn new(config: TransformConfig) -> Self {
        Self { config }
    }

    /// Fit all stages on `df` and return the transformed frame plus the
    /// fitted state. The target column, when present, passes through
    /// untouched and is available to the target-dependent stages.
    pub fn fit_transform(&self, df: &DataFrame) -> Result<(DataFrame, TransformerState)> {
        let target_column = self.config.target_column.as_str();
        let has_target = df.column(target_column).is_ok();

        let target: Option<Vec<u8>> = if has_target {
            Some(
                dataset::extract_binary_target(df, target_column)
                    .context("extracting target for supervised transformation")?,
            )
        } else {
            None
        };

        let fitted_columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let (encoded, encoders) =
            encoding::fit_encoders(df, target.as_deref(), &self.config.encoding)
                .context("fitting categorical encoders")?;
        print_info(&format!(
            "encoded {} categorical column(s)",
            encoders.len()
        ));

        let (scaled, scaler) =
            scaling::fit_scaler(&encoded, target_column, self.config.scaling_method)
                .context("fitting numerical scaler")?;
        print_info(&format!(
            "scaled {} numeric column(s) ({:?})",
            scaler.columns.len(),
            scaler.method
        ));

        let (selected_df, selection_steps, selected_features) = selection::fit_selection(
            &scaled,
            target.as_deref(),
            target_column,
            &self.config.selection,
        )
        .context("fitting feature selection")?;
        print_info(&format!(
            "selection retained {} feature(s)",
            selected_features.len()
        ));

        let state = TransformerState {
            schema_version: STATE_SCHEMA_VERSION,
            fitted_columns,
            encoders,
            scaler,
            selection_steps,
            selected_features,
        };

        Ok((selected_df, state))
    }

    /// Replay a fitted state on new data. No parameters are recomputed;
    /// the output schema is exactly the fitted feature set (plus the
    /// target column when the input carries one).
    pub fn transform(&self, df: &DataFrame, state: &TransformerState) -> Result<DataFrame> {
        let target_column = self.config.target_column.as_str();
        state
            .check_schema(df, target_column)
            .context("validating input schema against fitted state")?;

        let encoded =
            encoding::apply_encoders(df, &state.encoders).context("applying fitted encoders")?;
        let scaled =
            scaling::apply_scaler(&encoded, &state.scaler).context("applying fitted scaler")?;
        let selected =
            selection::apply_selection(&scaled, &state.selected_features, target_column)
                .context("applying fitted feature selection")?;

        Ok(selected)
    }
}
