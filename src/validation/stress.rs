//! Macro-economic stress testing
//!
//! Each scenario scales the observed default rate by a multiplier and
//! flips seeded-random non-defaulted rows to defaulted until the stressed
//! rate is reached. Scores stay fixed: the question is how discrimination
//! holds up when the label mix degrades, not how the model would re-score.
//! The baseline scenario (multiplier 1.0) flips nothing, so its AUC equals
//! the headline AUC exactly.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use super::metrics;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressScenario {
    pub name: String,
    pub description: String,
    pub multiplier: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressResult {
    pub auc_roc: f64,
    pub ks_statistic: f64,
    /// Baseline AUC minus stressed AUC.
    pub performance_degradation: f64,
    pub default_rate: f64,
    pub multiplier: f64,
}

/// The standard macro-economic scenario set.
pub fn default_scenarios() -> Vec<StressScenario> {
    vec![
        StressScenario {
            name: "baseline".to_string(),
            description: "Observed conditions, no stress applied".to_string(),
            multiplier: 1.0,
        },
        StressScenario {
            name: "high_inflation".to_string(),
            description: "Sustained inflation eroding repayment capacity".to_string(),
            multiplier: 1.4,
        },
        StressScenario {
            name: "recession".to_string(),
            description: "Economic downturn with elevated unemployment".to_string(),
            multiplier: 1.8,
        },
        StressScenario {
            name: "financial_crisis".to_string(),
            description: "Severe systemic credit event".to_string(),
            multiplier: 2.2,
        },
    ]
}

/// Run every scenario against the fixed score vector.
///
/// Results are keyed by scenario name in a sorted map so serialized
/// reports are byte-stable across runs.
pub fn run_stress_tests(
    y_true: &[u8],
    scores: &[f64],
    scenarios: &[StressScenario],
    baseline_auc: f64,
    rng: &mut StdRng,
) -> Result<BTreeMap<String, StressResult>, ValidationError> {
    if y_true.is_empty() {
        return Err(ValidationError::EmptyDataset);
    }

    let mut results = BTreeMap::new();
    for scenario in scenarios {
        let stressed = stress_target(y_true, scenario.multiplier, rng);
        let defaults = stressed.iter().filter(|v| **v == 1).count();
        let auc = metrics::auc_roc(&stressed, scores)?;
        let ks = metrics::ks_statistic(&stressed, scores)?;

        results.insert(
            scenario.name.clone(),
            StressResult {
                auc_roc: auc,
                ks_statistic: ks,
                performance_degradation: baseline_auc - auc,
                default_rate: defaults as f64 / stressed.len() as f64,
                multiplier: scenario.multiplier,
            },
        );
    }

    Ok(results)
}

/// Flip random non-defaulted rows until the default count reaches
/// `multiplier` times the observed count. At least one non-default always
/// survives so the ranking metrics stay defined.
fn stress_target(y_true: &[u8], multiplier: f64, rng: &mut StdRng) -> Vec<u8> {
    let current = y_true.iter().filter(|v| **v == 1).count();
    let cap = y_true.len().saturating_sub(1).max(current);
    let desired = ((current as f64 * multiplier).round() as usize).min(cap);
    let flips = desired.saturating_sub(current);
    if flips == 0 {
        return y_true.to_vec();
    }

    let negatives: Vec<usize> = (0..y_true.len()).filter(|i| y_true[*i] == 0).collect();
    let chosen: Vec<usize> = negatives
        .choose_multiple(rng, flips.min(negatives.len()))
        .copied()
        .collect();

    let mut stressed = y_true.to_vec();
    for idx in chosen {
        stressed[idx] = 1;
    }
    stressed
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_baseline_preserves_target() {
        let y = [0u8, 1, 0, 0, 1, 0, 0, 0, 1, 0];
        let mut rng = StdRng::seed_from_u64(42);
        let stressed = stress_target(&y, 1.0, &mut rng);
        assert_eq!(stressed, y.to_vec());
    }

    #[test]
    fn test_stress_raises_default_rate() {
        let y: Vec<u8> = (0..100).map(|i| (i % 5 == 0) as u8).collect();
        let mut rng = StdRng::seed_from_u64(42);
        let stressed = stress_target(&y, 1.8, &mut rng);

        let before = y.iter().filter(|v| **v == 1).count();
        let after = stressed.iter().filter(|v| **v == 1).count();
        assert_eq!(after, (before as f64 * 1.8).round() as usize);
        // Only 0 -> 1 flips are allowed.
        for (orig, new) in y.iter().zip(stressed.iter()) {
            assert!(new >= orig);
        }
    }

    #[test]
    fn test_extreme_multiplier_leaves_one_survivor() {
        let y = [1u8, 1, 0, 0];
        let mut rng = StdRng::seed_from_u64(42);
        let stressed = stress_target(&y, 10.0, &mut rng);
        assert_eq!(stressed.iter().filter(|v| **v == 1).count(), 3);
        assert_eq!(stressed.iter().filter(|v| **v == 0).count(), 1);
    }

    #[test]
    fn test_all_scenarios_reported() {
        let y: Vec<u8> = (0..100).map(|i| (i % 4 == 0) as u8).collect();
        let scores: Vec<f64> = y
            .iter()
            .enumerate()
            .map(|(i, v)| 0.4 * (*v as f64) + (i % 7) as f64 / 14.0)
            .collect();
        let baseline_auc = metrics::auc_roc(&y, &scores).unwrap();

        let mut rng = StdRng::seed_from_u64(42);
        let results =
            run_stress_tests(&y, &scores, &default_scenarios(), baseline_auc, &mut rng).unwrap();

        assert_eq!(results.len(), 4);
        let baseline = &results["baseline"];
        assert_eq!(baseline.auc_roc, baseline_auc);
        assert_eq!(baseline.performance_degradation, 0.0);
        assert!(results["financial_crisis"].default_rate > baseline.default_rate);
    }
}
