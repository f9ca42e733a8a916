//! End-to-end validation engine tests

mod common;

use common::{scored_dataset, ConstantScorer};
use crescore::report::ValidationReport;
use crescore::validation::{
    ScoreColumnModel, ValidationConfig, ValidationEngine, ValidationError,
};
use polars::prelude::*;
use tempfile::TempDir;

fn engine() -> ValidationEngine {
    ValidationEngine::new(ValidationConfig::default())
}

#[test]
fn test_uninformative_model_fails_the_gate() {
    // 100 balanced rows, constant 0.5 scorer: AUC must be exactly 0.5 and
    // every discrimination criterion must fail.
    let df = scored_dataset(100, 0.5);
    let report = engine().run(&ConstantScorer(0.5), &df).unwrap();

    assert!((report.performance_metrics.auc_roc - 0.5).abs() < 1e-9);
    assert_eq!(report.performance_metrics.ks_statistic, 0.0);
    assert!(!report.regulatory_compliance["auc_minimum"]);
    assert!(!report.regulatory_compliance["ks_minimum"]);
    assert!(!report.regulatory_compliance["gini_minimum"]);
    assert!(!report.summary.validation_passed);

    // The battery still ran in full.
    assert_eq!(report.temporal_stability.periods.len(), 5);
    assert_eq!(report.stress_tests.len(), 4);
    for name in ["baseline", "high_inflation", "recession", "financial_crisis"] {
        assert!(report.stress_tests.contains_key(name), "missing scenario {}", name);
    }
}

#[test]
fn test_separable_scores_pass_the_gate() {
    let df = scored_dataset(200, 1.0);
    let report = engine()
        .run(&ScoreColumnModel::new("score"), &df)
        .unwrap();

    assert_eq!(report.performance_metrics.auc_roc, 1.0);
    assert_eq!(report.performance_metrics.gini_coefficient, 1.0);
    assert!(report.regulatory_compliance.values().all(|v| *v));
    assert!(report.summary.validation_passed);
}

#[test]
fn test_baseline_stress_equals_headline_auc() {
    let df = scored_dataset(150, 0.8);
    let report = engine()
        .run(&ScoreColumnModel::new("score"), &df)
        .unwrap();

    let baseline = &report.stress_tests["baseline"];
    assert_eq!(baseline.auc_roc, report.performance_metrics.auc_roc);
    assert_eq!(baseline.performance_degradation, 0.0);
    assert_eq!(baseline.multiplier, 1.0);
}

#[test]
fn test_stress_default_rates_scale_with_multiplier() {
    let df = scored_dataset(200, 0.9);
    let report = engine()
        .run(&ScoreColumnModel::new("score"), &df)
        .unwrap();

    let baseline_rate = report.stress_tests["baseline"].default_rate;
    let crisis_rate = report.stress_tests["financial_crisis"].default_rate;
    assert!(crisis_rate > baseline_rate);
    // 2.2x the observed rate, capped at the population.
    let expected = (baseline_rate * 2.2).min(1.0);
    assert!((crisis_rate - expected).abs() < 0.02);
}

#[test]
fn test_verdict_is_conjunction_of_criteria() {
    let df = scored_dataset(200, 1.0);
    let mut config = ValidationConfig::default();
    // An impossible stress floor fails exactly one criterion.
    config.thresholds.min_stress_auc = 1.01;
    let report = ValidationEngine::new(config)
        .run(&ScoreColumnModel::new("score"), &df)
        .unwrap();

    assert!(report.regulatory_compliance["auc_minimum"]);
    assert!(!report.regulatory_compliance["stress_resilience"]);
    assert!(!report.summary.validation_passed);
}

#[test]
fn test_same_seed_reproduces_report() {
    let df = scored_dataset(150, 0.7);
    let a = engine().run(&ScoreColumnModel::new("score"), &df).unwrap();
    let b = engine().run(&ScoreColumnModel::new("score"), &df).unwrap();

    assert_eq!(a.performance_metrics, b.performance_metrics);
    assert_eq!(a.temporal_stability, b.temporal_stability);
    assert_eq!(a.stress_tests, b.stress_tests);
}

#[test]
fn test_missing_target_and_degenerate_target_rejected() {
    let no_target = df! { "score" => [0.1f64, 0.9] }.unwrap();
    let err = engine().run(&ScoreColumnModel::new("score"), &no_target).unwrap_err();
    assert!(matches!(err, ValidationError::MissingTarget(_)));

    let one_class = df! {
        "target" => [1i32, 1, 1, 1],
        "score" => [0.1f64, 0.9, 0.4, 0.6],
    }
    .unwrap();
    let err = engine().run(&ScoreColumnModel::new("score"), &one_class).unwrap_err();
    assert!(matches!(err, ValidationError::DegenerateTarget));

    let empty = df! {
        "target" => Vec::<i32>::new(),
        "score" => Vec::<f64>::new(),
    }
    .unwrap();
    let err = engine().run(&ScoreColumnModel::new("score"), &empty).unwrap_err();
    assert!(matches!(err, ValidationError::EmptyDataset));
}

#[test]
fn test_report_save_and_load_round_trip() {
    let df = scored_dataset(120, 0.8);
    let report = engine().run(&ScoreColumnModel::new("score"), &df).unwrap();

    let dir = TempDir::new().unwrap();
    let path = report.save(dir.path()).unwrap();
    assert!(path
        .file_name()
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("validation_report_"));

    let loaded = ValidationReport::load(&path).unwrap();
    assert_eq!(loaded, report);
}
