//! Discrimination and classification metrics
//!
//! AUC-ROC is computed with the Mann-Whitney rank formulation (average
//! ranks on ties), KS as the maximum gap between the per-class score CDFs,
//! and Gini as `2 * AUC - 1`. Threshold metrics use hard 0/1 predictions.

use serde::{Deserialize, Serialize};

use super::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub auc_roc: f64,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub ks_statistic: f64,
    pub gini_coefficient: f64,
}

impl PerformanceMetrics {
    /// Compute all metrics from the observed target, hard predictions and
    /// probability scores. Fails on a single-class target, where ranking
    /// metrics are undefined.
    pub fn compute(
        y_true: &[u8],
        y_pred: &[u8],
        scores: &[f64],
    ) -> Result<Self, ValidationError> {
        if y_true.is_empty() {
            return Err(ValidationError::EmptyDataset);
        }
        if y_true.len() != y_pred.len() || y_true.len() != scores.len() {
            return Err(ValidationError::LengthMismatch {
                targets: y_true.len(),
                scores: scores.len().min(y_pred.len()),
            });
        }

        let auc_roc = auc_roc(y_true, scores)?;
        let ks_statistic = ks_statistic(y_true, scores)?;
        let (accuracy, precision, recall, f1_score) = threshold_metrics(y_true, y_pred);

        Ok(Self {
            auc_roc,
            accuracy,
            precision,
            recall,
            f1_score,
            ks_statistic,
            gini_coefficient: 2.0 * auc_roc - 1.0,
        })
    }
}

/// AUC via the Mann-Whitney U statistic with average ranks on ties.
pub fn auc_roc(y_true: &[u8], scores: &[f64]) -> Result<f64, ValidationError> {
    let n_pos = y_true.iter().filter(|y| **y == 1).count();
    let n_neg = y_true.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(ValidationError::DegenerateTarget);
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|a, b| {
        scores[*a]
            .partial_cmp(&scores[*b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Average ranks over tied score runs.
    let mut ranks = vec![0.0; scores.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg_rank;
        }
        i = j + 1;
    }

    let rank_sum_pos: f64 = y_true
        .iter()
        .zip(ranks.iter())
        .filter(|(y, _)| **y == 1)
        .map(|(_, r)| r)
        .sum();

    let u = rank_sum_pos - (n_pos * (n_pos + 1)) as f64 / 2.0;
    Ok(u / (n_pos * n_neg) as f64)
}

/// Two-sample Kolmogorov-Smirnov statistic between the score distributions
/// of the two classes.
pub fn ks_statistic(y_true: &[u8], scores: &[f64]) -> Result<f64, ValidationError> {
    let mut pos: Vec<f64> = Vec::new();
    let mut neg: Vec<f64> = Vec::new();
    for (y, s) in y_true.iter().zip(scores.iter()) {
        if *y == 1 {
            pos.push(*s);
        } else {
            neg.push(*s);
        }
    }
    if pos.is_empty() || neg.is_empty() {
        return Err(ValidationError::DegenerateTarget);
    }

    pos.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    neg.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    // Walk the merged thresholds, consuming every tied value at once so
    // both CDFs are evaluated at the same point.
    let mut max_gap = 0.0f64;
    let (mut i, mut j) = (0usize, 0usize);
    while i < pos.len() || j < neg.len() {
        let threshold = match (pos.get(i), neg.get(j)) {
            (Some(p), Some(n)) => p.min(*n),
            (Some(p), None) => *p,
            (None, Some(n)) => *n,
            (None, None) => break,
        };
        while i < pos.len() && pos[i] <= threshold {
            i += 1;
        }
        while j < neg.len() && neg[j] <= threshold {
            j += 1;
        }
        let cdf_pos = i as f64 / pos.len() as f64;
        let cdf_neg = j as f64 / neg.len() as f64;
        max_gap = max_gap.max((cdf_pos - cdf_neg).abs());
    }

    Ok(max_gap)
}

fn threshold_metrics(y_true: &[u8], y_pred: &[u8]) -> (f64, f64, f64, f64) {
    let mut tp = 0.0;
    let mut tn = 0.0;
    let mut fp = 0.0;
    let mut fneg = 0.0;
    for (y, p) in y_true.iter().zip(y_pred.iter()) {
        match (y, p) {
            (1, 1) => tp += 1.0,
            (0, 0) => tn += 1.0,
            (0, 1) => fp += 1.0,
            _ => fneg += 1.0,
        }
    }

    let n = y_true.len() as f64;
    let accuracy = (tp + tn) / n;
    let precision = if tp + fp > 0.0 { tp / (tp + fp) } else { 0.0 };
    let recall = if tp + fneg > 0.0 { tp / (tp + fneg) } else { 0.0 };
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };
    (accuracy, precision, recall, f1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_separation_auc() {
        let y = [0u8, 0, 0, 1, 1, 1];
        let scores = [0.1, 0.2, 0.3, 0.7, 0.8, 0.9];
        assert_eq!(auc_roc(&y, &scores).unwrap(), 1.0);
        assert_eq!(ks_statistic(&y, &scores).unwrap(), 1.0);
    }

    #[test]
    fn test_constant_scores_auc_half() {
        let y = [0u8, 1, 0, 1];
        let scores = [0.5, 0.5, 0.5, 0.5];
        let auc = auc_roc(&y, &scores).unwrap();
        assert!((auc - 0.5).abs() < 1e-12);
        assert_eq!(ks_statistic(&y, &scores).unwrap(), 0.0);
    }

    #[test]
    fn test_single_class_target_rejected() {
        let y = [1u8, 1, 1];
        let scores = [0.1, 0.2, 0.3];
        assert!(matches!(
            auc_roc(&y, &scores),
            Err(ValidationError::DegenerateTarget)
        ));
    }

    #[test]
    fn test_gini_identity() {
        let y = [0u8, 1, 0, 1, 0, 1, 1, 0];
        let scores = [0.2, 0.6, 0.3, 0.9, 0.4, 0.5, 0.8, 0.35];
        let preds: Vec<u8> = scores.iter().map(|s| u8::from(*s >= 0.5)).collect();
        let m = PerformanceMetrics::compute(&y, &preds, &scores).unwrap();
        assert!((m.gini_coefficient - (2.0 * m.auc_roc - 1.0)).abs() < 1e-12);
        assert!(m.ks_statistic >= 0.0 && m.ks_statistic <= 1.0);
    }
}
