//! Feature selection stage
//!
//! A fixed, ordered pipeline of filters: variance, correlation, univariate
//! statistical (ANOVA F k-best) and model-based (L1 importance oracle).
//! Filters narrow cumulatively — a column removed by an earlier filter is
//! gone for the later ones — and each step records what it removed and
//! kept, forming an audit trail. Transform mode replays the fit-time
//! decisions verbatim; nothing is recomputed from new data.

use std::collections::BTreeSet;

use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::TransformError;
use crate::utils::print_warning;

/// Which filters run, and their parameters.
#[derive(Debug, Clone)]
pub struct SelectionConfig {
    pub variance: bool,
    pub correlation: bool,
    pub statistical: bool,
    pub model_based: bool,
    pub variance_threshold: f64,
    pub correlation_threshold: f64,
    /// Number of features the statistical filter keeps.
    pub k_best: usize,
    /// Coordinate-descent cycles for the L1 importance oracle.
    pub lasso_max_iter: usize,
    /// Cross-validation folds for the L1 penalty search.
    pub lasso_cv_folds: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            variance: true,
            correlation: true,
            statistical: true,
            model_based: true,
            variance_threshold: 0.01,
            correlation_threshold: 0.95,
            k_best: 30,
            lasso_max_iter: 100,
            lasso_cv_folds: 5,
        }
    }
}

/// Audit record of one selection filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSelectionStep {
    pub method: String,
    pub parameter: f64,
    /// True when the filter could not run (e.g. no target supplied).
    #[serde(default)]
    pub skipped: bool,
    pub removed: Vec<String>,
    pub kept: Vec<String>,
}

/// Fit the selection pipeline and return the narrowed frame, the audit
/// trail and the surviving feature names (target column excluded).
///
/// Target-dependent filters are skipped with a warning when no target is
/// supplied; the skip is recorded in the trail rather than silently
/// producing an empty feature set.
pub fn fit_selection(
    df: &DataFrame,
    target: Option<&[u8]>,
    target_column: &str,
    config: &SelectionConfig,
) -> Result<(DataFrame, Vec<FeatureSelectionStep>, Vec<String>), TransformError> {
    let mut current = df.clone();
    let mut steps = Vec::new();

    if config.variance {
        let removed = variance_filter(&current, target_column, config.variance_threshold)?;
        current = drop_columns(&current, &removed)?;
        steps.push(step(
            "variance",
            config.variance_threshold,
            false,
            removed,
            &current,
            target_column,
        ));
    }

    if config.correlation {
        let removed =
            correlation_filter(&current, target_column, config.correlation_threshold)?;
        current = drop_columns(&current, &removed)?;
        steps.push(step(
            "correlation",
            config.correlation_threshold,
            false,
            removed,
            &current,
            target_column,
        ));
    }

    if config.statistical {
        match target {
            Some(y) => {
                let removed = statistical_filter(&current, y, target_column, config.k_best)?;
                current = drop_columns(&current, &removed)?;
                steps.push(step(
                    "statistical",
                    config.k_best as f64,
                    false,
                    removed,
                    &current,
                    target_column,
                ));
            }
            None => {
                print_warning("statistical selection skipped: no target supplied");
                steps.push(step(
                    "statistical",
                    config.k_best as f64,
                    true,
                    Vec::new(),
                    &current,
                    target_column,
                ));
            }
        }
    }

    if config.model_based {
        match target {
            Some(y) => {
                let removed = model_based_filter(&current, y, target_column, config)?;
                current = drop_columns(&current, &removed)?;
                steps.push(step(
                    "model_based",
                    0.5, // median-importance threshold
                    false,
                    removed,
                    &current,
                    target_column,
                ));
            }
            None => {
                print_warning("model-based selection skipped: no target supplied");
                steps.push(step(
                    "model_based",
                    0.5,
                    true,
                    Vec::new(),
                    &current,
                    target_column,
                ));
            }
        }
    }

    let selected = feature_names(&current, target_column);
    Ok((current, steps, selected))
}

/// Replay a fitted selection: keep exactly the stored features (plus the
/// target column when present in the input).
pub fn apply_selection(
    df: &DataFrame,
    selected: &[String],
    target_column: &str,
) -> Result<DataFrame, TransformError> {
    let available: BTreeSet<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    let missing: Vec<String> = selected
        .iter()
        .filter(|name| !available.contains(*name))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(TransformError::SchemaMismatch(missing));
    }

    let mut keep: Vec<String> = selected.to_vec();
    if available.contains(target_column) {
        keep.push(target_column.to_string());
    }
    Ok(df.select(keep)?)
}

fn step(
    method: &str,
    parameter: f64,
    skipped: bool,
    removed: Vec<String>,
    current: &DataFrame,
    target_column: &str,
) -> FeatureSelectionStep {
    FeatureSelectionStep {
        method: method.to_string(),
        parameter,
        skipped,
        removed,
        kept: feature_names(current, target_column),
    }
}

fn feature_names(df: &DataFrame, target_column: &str) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|s| s.to_string())
        .filter(|name| name != target_column)
        .collect()
}

fn drop_columns(df: &DataFrame, removed: &[String]) -> Result<DataFrame, TransformError> {
    Ok(df.drop_many(removed))
}

/// Drop numeric columns whose population variance falls below the threshold.
fn variance_filter(
    df: &DataFrame,
    target_column: &str,
    threshold: f64,
) -> Result<Vec<String>, TransformError> {
    let numeric = crate::dataset::numeric_columns(df, Some(target_column));
    let mut removed = Vec::new();

    for name in numeric {
        let col = df.column(&name)?.cast(&DataType::Float64)?;
        let values: Vec<f64> = col.f64()?.into_iter().flatten().collect();
        if values.is_empty() {
            removed.push(name);
            continue;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        if var < threshold {
            removed.push(name);
        }
    }

    Ok(removed)
}

/// Greedy correlation filter.
///
/// Scans the upper triangle of the absolute correlation matrix in column
/// order and marks the second column of every offending pair — the
/// "keep first encountered" rule. Order-dependent by design; preserving
/// the column-ordering convention keeps outputs reproducible across runs.
fn correlation_filter(
    df: &DataFrame,
    target_column: &str,
    threshold: f64,
) -> Result<Vec<String>, TransformError> {
    let numeric = crate::dataset::numeric_columns(df, Some(target_column));
    if numeric.len() < 2 {
        return Ok(Vec::new());
    }

    let columns: Vec<Vec<Option<f64>>> = numeric
        .iter()
        .map(|name| -> Result<_, TransformError> {
            let col = df.column(name)?.cast(&DataType::Float64)?;
            Ok(col.f64()?.into_iter().collect())
        })
        .collect::<Result<_, _>>()?;

    let pairs: Vec<(usize, usize)> = (0..numeric.len())
        .flat_map(|i| ((i + 1)..numeric.len()).map(move |j| (i, j)))
        .collect();

    let offending: Vec<(usize, usize)> = pairs
        .par_iter()
        .filter_map(|(i, j)| {
            let corr = pearson_correlation(&columns[*i], &columns[*j])?;
            if corr.abs() > threshold && !corr.is_nan() {
                Some((*i, *j))
            } else {
                None
            }
        })
        .collect();

    // Deterministic aggregation: the parallel scan may return pairs in any
    // order, so sort before marking.
    let mut offending = offending;
    offending.sort_unstable();

    let mut marked: BTreeSet<usize> = BTreeSet::new();
    for (_, j) in offending {
        marked.insert(j);
    }

    Ok(marked.into_iter().map(|j| numeric[j].clone()).collect())
}

/// Single-pass Welford Pearson correlation over paired non-null values.
fn pearson_correlation(a: &[Option<f64>], b: &[Option<f64>]) -> Option<f64> {
    let mut count = 0.0;
    let mut mean_x = 0.0;
    let mut mean_y = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    let mut cov_xy = 0.0;

    for (x, y) in a.iter().zip(b.iter()) {
        if let (Some(x), Some(y)) = (x, y) {
            count += 1.0;
            let dx = x - mean_x;
            let dy = y - mean_y;
            mean_x += dx / count;
            mean_y += dy / count;
            var_x += dx * (x - mean_x);
            var_y += dy * (y - mean_y);
            cov_xy += dx * (y - mean_y);
        }
    }

    if count < 2.0 {
        return None;
    }
    let std_x = (var_x / count).sqrt();
    let std_y = (var_y / count).sqrt();
    if std_x == 0.0 || std_y == 0.0 {
        return None;
    }
    Some(cov_xy / (count * std_x * std_y))
}

/// ANOVA F k-best: keep the `k` features with the highest F score against
/// the binary target. Always operates post-encoding, so every remaining
/// feature is numeric.
fn statistical_filter(
    df: &DataFrame,
    target: &[u8],
    target_column: &str,
    k_best: usize,
) -> Result<Vec<String>, TransformError> {
    let numeric = crate::dataset::numeric_columns(df, Some(target_column));
    let k = k_best.min(numeric.len());
    if numeric.len() <= k {
        return Ok(Vec::new());
    }

    let mut scored: Vec<(usize, f64)> = numeric
        .iter()
        .enumerate()
        .map(|(idx, name)| -> Result<_, TransformError> {
            let col = df.column(name)?.cast(&DataType::Float64)?;
            let values: Vec<Option<f64>> = col.f64()?.into_iter().collect();
            Ok((idx, anova_f(&values, target)))
        })
        .collect::<Result<_, _>>()?;

    // Stable order: score descending, original index ascending on ties.
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });

    let kept: BTreeSet<usize> = scored.iter().take(k).map(|(idx, _)| *idx).collect();
    Ok(numeric
        .iter()
        .enumerate()
        .filter(|(idx, _)| !kept.contains(idx))
        .map(|(_, name)| name.clone())
        .collect())
}

/// One-way ANOVA F statistic for a feature against two classes.
fn anova_f(values: &[Option<f64>], target: &[u8]) -> f64 {
    let mut groups: [(f64, f64); 2] = [(0.0, 0.0); 2]; // (sum, count)
    for (v, y) in values.iter().zip(target.iter()) {
        if let Some(v) = v {
            let g = &mut groups[*y as usize];
            g.0 += v;
            g.1 += 1.0;
        }
    }
    let n: f64 = groups[0].1 + groups[1].1;
    if groups[0].1 == 0.0 || groups[1].1 == 0.0 || n <= 2.0 {
        return 0.0;
    }
    let grand_mean = (groups[0].0 + groups[1].0) / n;
    let means = [groups[0].0 / groups[0].1, groups[1].0 / groups[1].1];

    let ss_between: f64 = (0..2)
        .map(|g| groups[g].1 * (means[g] - grand_mean).powi(2))
        .sum();
    let mut ss_within = 0.0;
    for (v, y) in values.iter().zip(target.iter()) {
        if let Some(v) = v {
            ss_within += (v - means[*y as usize]).powi(2);
        }
    }

    let df_within = n - 2.0;
    if ss_within == 0.0 {
        return if ss_between == 0.0 { 0.0 } else { f64::INFINITY };
    }
    ss_between / (ss_within / df_within)
}

/// Model-based filter: a cross-validated L1 linear model as importance
/// oracle. Keeps features with |coefficient| at or above the median
/// importance (the `threshold = median` convention).
fn model_based_filter(
    df: &DataFrame,
    target: &[u8],
    target_column: &str,
    config: &SelectionConfig,
) -> Result<Vec<String>, TransformError> {
    let numeric = crate::dataset::numeric_columns(df, Some(target_column));
    if numeric.is_empty() {
        return Ok(Vec::new());
    }

    let features: Vec<Vec<f64>> = numeric
        .iter()
        .map(|name| -> Result<_, TransformError> {
            let col = df.column(name)?.cast(&DataType::Float64)?;
            // Nulls contribute the column mean (zero effect after centering).
            let raw: Vec<Option<f64>> = col.f64()?.into_iter().collect();
            let observed: Vec<f64> = raw.iter().filter_map(|v| *v).collect();
            let mean = if observed.is_empty() {
                0.0
            } else {
                observed.iter().sum::<f64>() / observed.len() as f64
            };
            Ok(raw.iter().map(|v| v.unwrap_or(mean)).collect())
        })
        .collect::<Result<_, _>>()?;

    let y: Vec<f64> = target.iter().map(|v| *v as f64).collect();
    let coefficients = lasso_cv(&features, &y, config.lasso_cv_folds, config.lasso_max_iter);

    let importances: Vec<f64> = coefficients.iter().map(|c| c.abs()).collect();
    let mut sorted = importances.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median = median_of_sorted(&sorted);

    let mut removed = Vec::new();
    for (idx, name) in numeric.iter().enumerate() {
        if importances[idx] < median {
            removed.push(name.clone());
        }
    }
    Ok(removed)
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Lasso with a fixed log-spaced penalty grid and contiguous k-fold CV.
///
/// Deterministic: folds are contiguous index ranges, no shuffling, so the
/// same data always yields the same penalty and coefficients.
fn lasso_cv(features: &[Vec<f64>], y: &[f64], folds: usize, max_iter: usize) -> Vec<f64> {
    let n = y.len();
    let p = features.len();
    if n == 0 || p == 0 {
        return vec![0.0; p];
    }

    // Standardize columns and center the response.
    let standardized: Vec<Vec<f64>> = features.iter().map(|col| standardize(col)).collect();
    let y_mean = y.iter().sum::<f64>() / n as f64;
    let y_centered: Vec<f64> = y.iter().map(|v| v - y_mean).collect();

    let lambda_max = standardized
        .iter()
        .map(|col| {
            col.iter()
                .zip(y_centered.iter())
                .map(|(x, y)| x * y)
                .sum::<f64>()
                .abs()
                / n as f64
        })
        .fold(0.0f64, f64::max)
        .max(1e-12);

    const GRID_SIZE: usize = 10;
    let grid: Vec<f64> = (0..GRID_SIZE)
        .map(|i| lambda_max * (1e-3f64).powf(i as f64 / (GRID_SIZE - 1) as f64))
        .collect();

    let folds = folds.clamp(2, n);
    let mut best = (f64::INFINITY, grid[0]);
    for &lambda in &grid {
        let mut total_error = 0.0;
        for fold in 0..folds {
            let lo = fold * n / folds;
            let hi = (fold + 1) * n / folds;
            if lo == hi {
                continue;
            }
            let train: Vec<usize> = (0..n).filter(|i| *i < lo || *i >= hi).collect();
            let coef = coordinate_descent(&standardized, &y_centered, &train, lambda, max_iter);
            for row in lo..hi {
                let pred: f64 = (0..p).map(|j| coef[j] * standardized[j][row]).sum();
                total_error += (y_centered[row] - pred).powi(2);
            }
        }
        if total_error < best.0 {
            best = (total_error, lambda);
        }
    }

    let all: Vec<usize> = (0..n).collect();
    coordinate_descent(&standardized, &y_centered, &all, best.1, max_iter)
}

fn standardize(col: &[f64]) -> Vec<f64> {
    let n = col.len() as f64;
    let mean = col.iter().sum::<f64>() / n;
    let var = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = var.sqrt();
    if std > 0.0 {
        col.iter().map(|v| (v - mean) / std).collect()
    } else {
        vec![0.0; col.len()]
    }
}

/// Cyclic coordinate descent with soft thresholding on the given rows.
fn coordinate_descent(
    x: &[Vec<f64>],
    y: &[f64],
    rows: &[usize],
    lambda: f64,
    max_iter: usize,
) -> Vec<f64> {
    let p = x.len();
    let n = rows.len() as f64;
    let mut coef = vec![0.0; p];
    let mut residual: Vec<f64> = rows.iter().map(|&i| y[i]).collect();

    let col_norms: Vec<f64> = x
        .iter()
        .map(|col| rows.iter().map(|&i| col[i] * col[i]).sum::<f64>() / n)
        .collect();

    const TOLERANCE: f64 = 1e-6;
    for _ in 0..max_iter {
        let mut max_delta = 0.0f64;
        for j in 0..p {
            if col_norms[j] == 0.0 {
                continue;
            }
            let rho: f64 = rows
                .iter()
                .enumerate()
                .map(|(k, &i)| x[j][i] * (residual[k] + coef[j] * x[j][i]))
                .sum::<f64>()
                / n;
            let new_coef = soft_threshold(rho, lambda) / col_norms[j];
            let delta = new_coef - coef[j];
            if delta != 0.0 {
                for (k, &i) in rows.iter().enumerate() {
                    residual[k] -= delta * x[j][i];
                }
                coef[j] = new_coef;
                max_delta = max_delta.max(delta.abs());
            }
        }
        if max_delta < TOLERANCE {
            break;
        }
    }

    coef
}

fn soft_threshold(value: f64, threshold: f64) -> f64 {
    if value > threshold {
        value - threshold
    } else if value < -threshold {
        value + threshold
    } else {
        0.0
    }
}
