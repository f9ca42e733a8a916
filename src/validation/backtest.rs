//! Temporal stability backtest
//!
//! The application data carries no real timestamps, so periods are formed
//! by stratified resampling: each period draws a seeded 20% sample per
//! class and is scored independently. Periods therefore overlap; the
//! resulting spread measures score stability under resampling rather than
//! true calendar drift, and the report should be read with that in mind.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use super::metrics;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodResult {
    pub period: usize,
    pub auc_roc: f64,
    pub ks_statistic: f64,
    pub n_samples: usize,
    pub default_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalStability {
    pub auc_mean: f64,
    pub auc_std: f64,
    pub auc_min: f64,
    pub auc_max: f64,
    /// Worst-case spread across periods: `auc_max - auc_min`.
    pub auc_decline: f64,
    pub periods: Vec<PeriodResult>,
}

/// Run the stratified resampling backtest.
///
/// Sampling is driven sequentially from the caller's RNG so the full
/// period layout is reproducible from one seed; metric computation over
/// the drawn periods is parallel.
pub fn run_backtest(
    y_true: &[u8],
    scores: &[f64],
    n_periods: usize,
    period_fraction: f64,
    rng: &mut StdRng,
) -> Result<TemporalStability, ValidationError> {
    if y_true.is_empty() {
        return Err(ValidationError::EmptyDataset);
    }

    let pos_indices: Vec<usize> = (0..y_true.len()).filter(|i| y_true[*i] == 1).collect();
    let neg_indices: Vec<usize> = (0..y_true.len()).filter(|i| y_true[*i] == 0).collect();
    if pos_indices.is_empty() || neg_indices.is_empty() {
        return Err(ValidationError::DegenerateTarget);
    }

    let n_pos = ((pos_indices.len() as f64 * period_fraction).round() as usize).max(1);
    let n_neg = ((neg_indices.len() as f64 * period_fraction).round() as usize).max(1);

    let mut period_indices: Vec<Vec<usize>> = Vec::with_capacity(n_periods);
    for _ in 0..n_periods {
        let mut drawn: Vec<usize> = pos_indices
            .choose_multiple(rng, n_pos)
            .copied()
            .collect();
        drawn.extend(neg_indices.choose_multiple(rng, n_neg).copied());
        period_indices.push(drawn);
    }

    let mut periods: Vec<PeriodResult> = period_indices
        .par_iter()
        .enumerate()
        .map(|(period, indices)| -> Result<PeriodResult, ValidationError> {
            let y: Vec<u8> = indices.iter().map(|i| y_true[*i]).collect();
            let s: Vec<f64> = indices.iter().map(|i| scores[*i]).collect();
            let defaults = y.iter().filter(|v| **v == 1).count();
            Ok(PeriodResult {
                period: period + 1,
                auc_roc: metrics::auc_roc(&y, &s)?,
                ks_statistic: metrics::ks_statistic(&y, &s)?,
                n_samples: y.len(),
                default_rate: defaults as f64 / y.len() as f64,
            })
        })
        .collect::<Result<_, _>>()?;
    periods.sort_by_key(|p| p.period);

    let aucs: Vec<f64> = periods.iter().map(|p| p.auc_roc).collect();
    let n = aucs.len() as f64;
    let auc_mean = aucs.iter().sum::<f64>() / n;
    let auc_std = (aucs.iter().map(|a| (a - auc_mean).powi(2)).sum::<f64>() / n).sqrt();
    let auc_min = aucs.iter().cloned().fold(f64::INFINITY, f64::min);
    let auc_max = aucs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    Ok(TemporalStability {
        auc_mean,
        auc_std,
        auc_min,
        auc_max,
        auc_decline: auc_max - auc_min,
        periods,
    })
}
