//! Validation engine orchestration
//!
//! Runs the full assessment: headline metrics, the temporal backtest, the
//! stress scenario battery and the regulatory gate, producing one
//! serializable report. The gate is a pure conjunction of the configured
//! criteria; one failure fails the model.

use std::collections::BTreeMap;

use chrono::Local;
use polars::prelude::DataFrame;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::backtest::{self, TemporalStability};
use super::error::ValidationError;
use super::metrics::PerformanceMetrics;
use super::stress::{self, StressResult, StressScenario};
use crate::dataset;
use crate::report::{ValidationReport, ValidationSummary};
use crate::utils::print_info;

/// Progression of a validation run.
///
/// Failures before `Scored` are fatal (no model or no usable data); from
/// there on, every stage records its pass/fail outcome in the report and
/// the run continues to the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationStage {
    Loaded,
    Scored,
    Backtested,
    StressTested,
    Decided,
}

impl ValidationStage {
    pub fn label(&self) -> &'static str {
        match self {
            ValidationStage::Loaded => "loaded",
            ValidationStage::Scored => "scored",
            ValidationStage::Backtested => "backtested",
            ValidationStage::StressTested => "stress-tested",
            ValidationStage::Decided => "decided",
        }
    }
}

/// A scored model as the engine sees it.
///
/// The engine never trains anything; it consumes predictions from an
/// upstream artifact, whatever produced them.
pub trait ModelScorer {
    /// Hard 0/1 default predictions.
    fn predict(&self, df: &DataFrame) -> Result<Vec<u8>, ValidationError>;
    /// Default probabilities in [0, 1].
    fn predict_proba(&self, df: &DataFrame) -> Result<Vec<f64>, ValidationError>;
}

/// Scorer backed by a precomputed probability column in the dataset.
pub struct ScoreColumnModel {
    pub score_column: String,
    pub threshold: f64,
}

impl ScoreColumnModel {
    pub fn new(score_column: impl Into<String>) -> Self {
        Self {
            score_column: score_column.into(),
            threshold: 0.5,
        }
    }
}

impl ModelScorer for ScoreColumnModel {
    fn predict(&self, df: &DataFrame) -> Result<Vec<u8>, ValidationError> {
        let scores = self.predict_proba(df)?;
        Ok(scores
            .iter()
            .map(|s| u8::from(*s >= self.threshold))
            .collect())
    }

    fn predict_proba(&self, df: &DataFrame) -> Result<Vec<f64>, ValidationError> {
        let values = dataset::column_to_f64(df, &self.score_column)
            .map_err(|e| ValidationError::ModelUnavailable(e.to_string()))?;
        values
            .into_iter()
            .collect::<Option<Vec<f64>>>()
            .ok_or_else(|| {
                ValidationError::ModelUnavailable(format!(
                    "score column '{}' contains nulls",
                    self.score_column
                ))
            })
    }
}

/// Pass/fail thresholds of the regulatory gate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegulatoryThresholds {
    pub min_auc: f64,
    pub min_ks: f64,
    pub min_gini: f64,
    pub max_auc_decline: f64,
    pub min_stress_auc: f64,
}

impl Default for RegulatoryThresholds {
    fn default() -> Self {
        Self {
            min_auc: 0.75,
            min_ks: 0.30,
            min_gini: 0.40,
            max_auc_decline: 0.10,
            min_stress_auc: 0.70,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationConfig {
    pub target_column: String,
    pub model_name: String,
    pub thresholds: RegulatoryThresholds,
    pub n_periods: usize,
    pub period_fraction: f64,
    pub seed: u64,
    pub scenarios: Vec<StressScenario>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            target_column: dataset::DEFAULT_TARGET_COLUMN.to_string(),
            model_name: "credit_scoring_model".to_string(),
            thresholds: RegulatoryThresholds::default(),
            n_periods: 5,
            period_fraction: 0.2,
            seed: 42,
            scenarios: stress::default_scenarios(),
        }
    }
}

pub struct ValidationEngine {
    config: ValidationConfig,
}

impl ValidationEngine {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Run the full validation battery and assemble the report.
    pub fn run(
        &self,
        model: &dyn ModelScorer,
        df: &DataFrame,
    ) -> Result<ValidationReport, ValidationError> {
        if df.height() == 0 {
            return Err(ValidationError::EmptyDataset);
        }

        if df.column(&self.config.target_column).is_err() {
            return Err(ValidationError::MissingTarget(
                self.config.target_column.clone(),
            ));
        }
        let y_true = dataset::extract_binary_target(df, &self.config.target_column)?;
        let mut stage = ValidationStage::Loaded;
        print_info(&format!("validation stage: {}", stage.label()));

        let y_pred = model.predict(df)?;
        let scores = model.predict_proba(df)?;
        if scores.len() != y_true.len() {
            return Err(ValidationError::LengthMismatch {
                targets: y_true.len(),
                scores: scores.len(),
            });
        }
        let performance = PerformanceMetrics::compute(&y_true, &y_pred, &scores)?;
        stage = ValidationStage::Scored;
        print_info(&format!("validation stage: {}", stage.label()));

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let temporal = backtest::run_backtest(
            &y_true,
            &scores,
            self.config.n_periods,
            self.config.period_fraction,
            &mut rng,
        )?;
        stage = ValidationStage::Backtested;
        print_info(&format!("validation stage: {}", stage.label()));

        let stress_results = stress::run_stress_tests(
            &y_true,
            &scores,
            &self.config.scenarios,
            performance.auc_roc,
            &mut rng,
        )?;
        stage = ValidationStage::StressTested;
        print_info(&format!("validation stage: {}", stage.label()));

        let compliance = evaluate_gate(
            &performance,
            &temporal,
            &stress_results,
            &self.config.thresholds,
        );
        let validation_passed = compliance.values().all(|passed| *passed);
        stage = ValidationStage::Decided;
        print_info(&format!("validation stage: {}", stage.label()));

        Ok(ValidationReport {
            summary: ValidationSummary {
                timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
                model_name: self.config.model_name.clone(),
                validation_passed,
            },
            performance_metrics: performance,
            temporal_stability: temporal,
            stress_tests: stress_results,
            regulatory_compliance: compliance,
            validation_thresholds: self.config.thresholds,
        })
    }
}

/// Evaluate every regulatory criterion independently.
///
/// Returns a sorted criterion -> pass map; the overall verdict is the
/// conjunction of the values.
pub fn evaluate_gate(
    performance: &PerformanceMetrics,
    temporal: &TemporalStability,
    stress_tests: &BTreeMap<String, StressResult>,
    thresholds: &RegulatoryThresholds,
) -> BTreeMap<String, bool> {
    let min_stress_auc = stress_tests
        .values()
        .map(|r| r.auc_roc)
        .fold(f64::INFINITY, f64::min);

    let mut compliance = BTreeMap::new();
    compliance.insert(
        "auc_minimum".to_string(),
        performance.auc_roc >= thresholds.min_auc,
    );
    compliance.insert(
        "ks_minimum".to_string(),
        performance.ks_statistic >= thresholds.min_ks,
    );
    compliance.insert(
        "gini_minimum".to_string(),
        performance.gini_coefficient >= thresholds.min_gini,
    );
    compliance.insert(
        "temporal_stability".to_string(),
        temporal.auc_decline <= thresholds.max_auc_decline,
    );
    compliance.insert(
        "stress_resilience".to_string(),
        !stress_tests.is_empty() && min_stress_auc >= thresholds.min_stress_auc,
    );
    compliance
}
