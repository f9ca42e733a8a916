//! Categorical encoding stage
//!
//! Strategy per column is picked by cardinality after rare-category
//! collapsing: low cardinality gets one-hot (drop-first), high cardinality
//! gets smoothed target encoding when a target is available and ordinal
//! label encoding otherwise. Fitting produces one [`ColumnEncoder`] per
//! categorical column; transforming replays the stored parameters verbatim,
//! including the fit-time rare-category set (frequencies are never
//! recomputed on new data, to avoid train/serve skew).

use std::collections::{BTreeMap, BTreeSet, HashMap};

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::TransformError;
use crate::utils::print_warning;

/// Sentinel category substituted for missing values.
pub const MISSING_SENTINEL: &str = "missing";
/// Sentinel category that absorbs rare categories.
pub const RARE_SENTINEL: &str = "rare_category";

/// Parameters of the categorical-encoding stage.
#[derive(Debug, Clone)]
pub struct EncodingConfig {
    /// Above this many distinct categories, one-hot is abandoned.
    pub high_cardinality_threshold: usize,
    /// Categories with relative frequency below this are collapsed.
    pub rare_category_threshold: f64,
    /// Additive smoothing weight for target encoding.
    pub target_smoothing: f64,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            high_cardinality_threshold: 10,
            rare_category_threshold: 0.01,
            target_smoothing: 10.0,
        }
    }
}

/// Fitted encoding parameters for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FittedEncoder {
    /// Drop-first one-hot: `categories[0]` is the baseline with no column.
    OneHot { categories: Vec<String> },
    /// Smoothed mean-target encoding; unseen categories fall back to the prior.
    Target { means: BTreeMap<String, f64>, prior: f64 },
    /// Ordinal codes by sorted class order; unseen categories get the code
    /// `classes.len()` as a documented out-of-vocabulary sentinel.
    Label { classes: Vec<String> },
}

/// One fitted categorical column: its rare-category set plus the encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnEncoder {
    pub column: String,
    pub rare_categories: BTreeSet<String>,
    pub encoder: FittedEncoder,
}

impl ColumnEncoder {
    /// Recover the original category from a drop-first one-hot row.
    ///
    /// An all-zero row maps back to the baseline category. Only meaningful
    /// for values that were neither missing nor collapsed as rare.
    pub fn decode_one_hot(&self, row: &[f64]) -> Option<&str> {
        match &self.encoder {
            FittedEncoder::OneHot { categories } => {
                debug_assert_eq!(row.len() + 1, categories.len());
                for (i, v) in row.iter().enumerate() {
                    if *v > 0.5 {
                        return categories.get(i + 1).map(|s| s.as_str());
                    }
                }
                categories.first().map(|s| s.as_str())
            }
            _ => None,
        }
    }

    /// Names of the output columns this encoder produces.
    pub fn output_columns(&self) -> Vec<String> {
        match &self.encoder {
            FittedEncoder::OneHot { categories } => categories
                .iter()
                .skip(1)
                .map(|cat| format!("{}_{}", self.column, cat))
                .collect(),
            FittedEncoder::Target { .. } | FittedEncoder::Label { .. } => {
                vec![format!("{}_encoded", self.column)]
            }
        }
    }
}

/// Fit encoders on every string-typed column and return the encoded frame.
///
/// `target` enables target encoding for high-cardinality columns; without it
/// those columns fall back to label encoding.
pub fn fit_encoders(
    df: &DataFrame,
    target: Option<&[u8]>,
    config: &EncodingConfig,
) -> Result<(DataFrame, Vec<ColumnEncoder>), TransformError> {
    let categorical: Vec<String> = crate::dataset::categorical_columns(df);
    let mut encoded = df.clone();
    let mut encoders = Vec::with_capacity(categorical.len());

    for col in &categorical {
        let values = sentinel_values(df, col)?;

        // Rare-category collapsing on fit-time frequencies.
        let n = values.len() as f64;
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for v in &values {
            *counts.entry(v.as_str()).or_insert(0) += 1;
        }
        let rare_categories: BTreeSet<String> = counts
            .iter()
            .filter(|(_, count)| (**count as f64) / n < config.rare_category_threshold)
            .map(|(cat, _)| cat.to_string())
            .collect();
        let collapsed: Vec<&str> = values
            .iter()
            .map(|v| {
                if rare_categories.contains(v.as_str()) {
                    RARE_SENTINEL
                } else {
                    v.as_str()
                }
            })
            .collect();

        let mut distinct: Vec<String> = collapsed
            .iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        distinct.sort();

        let encoder = if distinct.len() <= config.high_cardinality_threshold {
            FittedEncoder::OneHot {
                categories: distinct,
            }
        } else if let Some(y) = target {
            FittedEncoder::Target {
                means: fit_target_means(&collapsed, y, config.target_smoothing),
                prior: y.iter().map(|v| *v as f64).sum::<f64>() / y.len() as f64,
            }
        } else {
            FittedEncoder::Label { classes: distinct }
        };

        let column_encoder = ColumnEncoder {
            column: col.clone(),
            rare_categories,
            encoder,
        };

        encoded = replace_with_encoded(&encoded, &column_encoder, &collapsed)?;
        encoders.push(column_encoder);
    }

    Ok((encoded, encoders))
}

/// Replay fitted encoders on new data.
///
/// Any string-typed column without a stored encoder is a contract violation
/// and fails fast; unseen category values map to each strategy's documented
/// neutral default with a warning.
pub fn apply_encoders(
    df: &DataFrame,
    encoders: &[ColumnEncoder],
) -> Result<DataFrame, TransformError> {
    let categorical = crate::dataset::categorical_columns(df);
    let mut encoded = df.clone();

    for col in &categorical {
        let encoder = encoders
            .iter()
            .find(|e| &e.column == col)
            .ok_or_else(|| TransformError::NotFitted {
                stage: "encoding",
                column: col.clone(),
            })?;

        let values = sentinel_values(df, col)?;
        // Collapse against the fit-time rare set, never recomputed here.
        let collapsed: Vec<&str> = values
            .iter()
            .map(|v| {
                if encoder.rare_categories.contains(v.as_str()) {
                    RARE_SENTINEL
                } else {
                    v.as_str()
                }
            })
            .collect();

        encoded = replace_with_encoded(&encoded, encoder, &collapsed)?;
    }

    Ok(encoded)
}

/// Extract a string column with nulls replaced by the missing sentinel.
fn sentinel_values(df: &DataFrame, col: &str) -> Result<Vec<String>, TransformError> {
    let ca = df.column(col)?.str()?.clone();
    Ok(ca
        .into_iter()
        .map(|v| v.unwrap_or(MISSING_SENTINEL).to_string())
        .collect())
}

fn fit_target_means(values: &[&str], target: &[u8], smoothing: f64) -> BTreeMap<String, f64> {
    let prior = target.iter().map(|v| *v as f64).sum::<f64>() / target.len() as f64;
    let mut sums: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for (v, y) in values.iter().zip(target.iter()) {
        let entry = sums.entry(v).or_insert((0.0, 0.0));
        entry.0 += *y as f64;
        entry.1 += 1.0;
    }
    sums.into_iter()
        .map(|(cat, (sum, count))| {
            let smoothed = (sum + smoothing * prior) / (count + smoothing);
            (cat.to_string(), smoothed)
        })
        .collect()
}

/// Drop the original column and append the encoded column(s).
fn replace_with_encoded(
    df: &DataFrame,
    encoder: &ColumnEncoder,
    collapsed: &[&str],
) -> Result<DataFrame, TransformError> {
    let mut out = df.drop(&encoder.column)?;
    let mut unseen = 0usize;

    match &encoder.encoder {
        FittedEncoder::OneHot { categories } => {
            let known: BTreeSet<&str> = categories.iter().map(|s| s.as_str()).collect();
            unseen = collapsed.iter().filter(|v| !known.contains(**v)).count();
            for cat in categories.iter().skip(1) {
                let col: Vec<f64> = collapsed
                    .iter()
                    .map(|v| if *v == cat { 1.0 } else { 0.0 })
                    .collect();
                out.with_column(Column::new(
                    format!("{}_{}", encoder.column, cat).into(),
                    col,
                ))?;
            }
        }
        FittedEncoder::Target { means, prior } => {
            let col: Vec<f64> = collapsed
                .iter()
                .map(|v| {
                    means.get(*v).copied().unwrap_or_else(|| {
                        unseen += 1;
                        *prior
                    })
                })
                .collect();
            out.with_column(Column::new(
                format!("{}_encoded", encoder.column).into(),
                col,
            ))?;
        }
        FittedEncoder::Label { classes } => {
            let index: BTreeMap<&str, usize> = classes
                .iter()
                .enumerate()
                .map(|(i, c)| (c.as_str(), i))
                .collect();
            let col: Vec<f64> = collapsed
                .iter()
                .map(|v| {
                    index.get(*v).map(|i| *i as f64).unwrap_or_else(|| {
                        unseen += 1;
                        classes.len() as f64
                    })
                })
                .collect();
            out.with_column(Column::new(
                format!("{}_encoded", encoder.column).into(),
                col,
            ))?;
        }
    }

    if unseen > 0 {
        print_warning(&format!(
            "column '{}': {} value(s) unseen at fit time mapped to the neutral default",
            encoder.column, unseen
        ));
    }

    Ok(out)
}
