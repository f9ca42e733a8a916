//! Numerical scaling stage
//!
//! One scaler is fitted jointly over every numeric column (the target
//! excluded) and stores per-column parameters. Robust (median/IQR) is the
//! default; standard, min-max and quantile scaling are available through
//! configuration.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::TransformError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingMethod {
    Robust,
    Standard,
    MinMax,
    Quantile,
}

impl Default for ScalingMethod {
    fn default() -> Self {
        ScalingMethod::Robust
    }
}

/// Fitted parameters for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScaleParams {
    Robust { median: f64, iqr: f64 },
    Standard { mean: f64, std: f64 },
    MinMax { min: f64, max: f64 },
    /// Sorted reference quantiles; transform maps through the interpolated
    /// empirical CDF into [0, 1].
    Quantile { grid: Vec<f64> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnScale {
    pub column: String,
    pub params: ScaleParams,
}

/// The single fitted scaler covering all numeric feature columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedScaler {
    pub method: ScalingMethod,
    pub columns: Vec<ColumnScale>,
}

/// Number of reference quantiles stored per column for quantile scaling.
const QUANTILE_GRID_SIZE: usize = 100;

/// Fit the scaler on all numeric columns except the target, and scale them.
pub fn fit_scaler(
    df: &DataFrame,
    target_column: &str,
    method: ScalingMethod,
) -> Result<(DataFrame, FittedScaler), TransformError> {
    let numeric = crate::dataset::numeric_columns(df, Some(target_column));
    let mut columns = Vec::with_capacity(numeric.len());

    for name in &numeric {
        let values = extract_f64(df, name)?;
        let observed: Vec<f64> = values.iter().filter_map(|v| *v).collect();
        let params = fit_params(&observed, method);
        columns.push(ColumnScale {
            column: name.clone(),
            params,
        });
    }

    let scaler = FittedScaler { method, columns };
    let scaled = apply_scaler(df, &scaler)?;
    Ok((scaled, scaler))
}

/// Reapply fitted per-column parameters; columns the scaler was not fitted
/// on are left untouched.
pub fn apply_scaler(df: &DataFrame, scaler: &FittedScaler) -> Result<DataFrame, TransformError> {
    let mut out = df.clone();

    for scale in &scaler.columns {
        let values = extract_f64(df, &scale.column)?;
        let scaled: Vec<Option<f64>> = values
            .iter()
            .map(|v| v.map(|v| transform_value(v, &scale.params)))
            .collect();
        out.with_column(Column::new(scale.column.as_str().into(), scaled))?;
    }

    Ok(out)
}

fn extract_f64(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, TransformError> {
    let col = df.column(name)?.cast(&DataType::Float64)?;
    Ok(col.f64()?.into_iter().collect())
}

fn fit_params(observed: &[f64], method: ScalingMethod) -> ScaleParams {
    match method {
        ScalingMethod::Robust => {
            let mut sorted = observed.to_vec();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            let median = percentile(&sorted, 0.5);
            let iqr = percentile(&sorted, 0.75) - percentile(&sorted, 0.25);
            ScaleParams::Robust { median, iqr }
        }
        ScalingMethod::Standard => {
            let n = observed.len().max(1) as f64;
            let mean = observed.iter().sum::<f64>() / n;
            let var = observed.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            ScaleParams::Standard {
                mean,
                std: var.sqrt(),
            }
        }
        ScalingMethod::MinMax => {
            let min = observed.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = observed.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            ScaleParams::MinMax { min, max }
        }
        ScalingMethod::Quantile => {
            let mut sorted = observed.to_vec();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            let size = QUANTILE_GRID_SIZE.min(sorted.len().max(1));
            let grid: Vec<f64> = if sorted.is_empty() {
                Vec::new()
            } else {
                (0..size)
                    .map(|i| {
                        let q = if size == 1 {
                            0.5
                        } else {
                            i as f64 / (size - 1) as f64
                        };
                        percentile(&sorted, q)
                    })
                    .collect()
            };
            ScaleParams::Quantile { grid }
        }
    }
}

fn transform_value(v: f64, params: &ScaleParams) -> f64 {
    match params {
        // A zero spread leaves the column centered but unscaled, matching
        // the reference scaler behavior for constant columns.
        ScaleParams::Robust { median, iqr } => {
            let scale = if *iqr > 0.0 { *iqr } else { 1.0 };
            (v - median) / scale
        }
        ScaleParams::Standard { mean, std } => {
            let scale = if *std > 0.0 { *std } else { 1.0 };
            (v - mean) / scale
        }
        ScaleParams::MinMax { min, max } => {
            let range = max - min;
            if range > 0.0 {
                (v - min) / range
            } else {
                0.0
            }
        }
        ScaleParams::Quantile { grid } => interpolated_cdf(v, grid),
    }
}

/// Interpolated ECDF position of `v` within the stored grid, in [0, 1].
fn interpolated_cdf(v: f64, grid: &[f64]) -> f64 {
    if grid.is_empty() {
        return 0.0;
    }
    let first = grid[0];
    let last = grid[grid.len() - 1];
    if v <= first {
        return 0.0;
    }
    if v >= last {
        return 1.0;
    }
    // Find the bracketing grid points.
    let mut lo = 0usize;
    let mut hi = grid.len() - 1;
    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        if grid[mid] <= v {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    let q_lo = lo as f64 / (grid.len() - 1) as f64;
    let q_hi = hi as f64 / (grid.len() - 1) as f64;
    let span = grid[hi] - grid[lo];
    if span > 0.0 {
        q_lo + (q_hi - q_lo) * (v - grid[lo]) / span
    } else {
        q_lo
    }
}

/// Linear-interpolation percentile over pre-sorted values.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = pos - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}
