//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

use crescore::validation::{ModelScorer, ValidationError};

/// Build a synthetic credit application dataset with the full input schema.
///
/// Rows cycle deterministically through the category codes, so the fixture
/// is reproducible without any RNG. Every third row defaults.
pub fn credit_applications(n: usize) -> DataFrame {
    let debt_bands = ["under 20%", "20% to 25%", "25% to 35%", "over 35%"];
    let savings = ["A11", "A12", "A13", "A14", "A15"];
    let histories = ["A30", "A31", "A32", "A33", "A34"];
    let purposes = ["A40", "A41", "A42", "A43", "A46", "A49"];
    let plans = ["A141", "A142", "A143"];
    let employment = ["A71", "A72", "A73", "A74", "A75"];
    let statuses = ["A91", "A92", "A93", "A94"];
    let housings = ["A151", "A152", "A153"];

    let pick = |options: &[&str], i: usize| options[i % options.len()].to_string();

    let debt_ratio_band: Vec<String> = (0..n).map(|i| pick(&debt_bands, i)).collect();
    let amount: Vec<f64> = (0..n).map(|i| 500.0 + (i % 40) as f64 * 250.0).collect();
    let duration: Vec<f64> = (0..n).map(|i| 6.0 + (i % 10) as f64 * 6.0).collect();
    let age: Vec<f64> = (0..n).map(|i| 19.0 + (i % 50) as f64).collect();
    let savings_col: Vec<String> = (0..n).map(|i| pick(&savings, i)).collect();
    let history_col: Vec<String> = (0..n).map(|i| pick(&histories, i)).collect();
    let purpose_col: Vec<String> = (0..n).map(|i| pick(&purposes, i)).collect();
    let plans_col: Vec<String> = (0..n).map(|i| pick(&plans, i)).collect();
    let employment_col: Vec<String> = (0..n).map(|i| pick(&employment, i)).collect();
    let status_col: Vec<String> = (0..n).map(|i| pick(&statuses, i)).collect();
    let housing_col: Vec<String> = (0..n).map(|i| pick(&housings, i)).collect();
    let target: Vec<i32> = (0..n).map(|i| (i % 3 == 0) as i32).collect();

    df! {
        "debt_ratio_band" => debt_ratio_band,
        "amount" => amount,
        "duration" => duration,
        "age" => age,
        "savings" => savings_col,
        "credit_history" => history_col,
        "purpose" => purpose_col,
        "other_plans" => plans_col,
        "employment_since" => employment_col,
        "personal_status" => status_col,
        "housing" => housing_col,
        "target" => target,
    }
    .unwrap()
}

/// A balanced scored dataset: 50/50 target with a score column of the
/// given discriminative strength (0.0 = pure noise, 1.0 = separable).
pub fn scored_dataset(n: usize, strength: f64) -> DataFrame {
    let target: Vec<i32> = (0..n).map(|i| (i % 2) as i32).collect();
    let score: Vec<f64> = target
        .iter()
        .enumerate()
        .map(|(i, y)| {
            let noise = (i % 17) as f64 / 17.0;
            (strength * (*y as f64) + (1.0 - strength) * noise).clamp(0.0, 1.0)
        })
        .collect();
    df! {
        "target" => target,
        "score" => score,
    }
    .unwrap()
}

/// Scorer stub that predicts the same probability for every row.
pub struct ConstantScorer(pub f64);

impl ModelScorer for ConstantScorer {
    fn predict(&self, df: &DataFrame) -> Result<Vec<u8>, ValidationError> {
        Ok(vec![u8::from(self.0 >= 0.5); df.height()])
    }

    fn predict_proba(&self, df: &DataFrame) -> Result<Vec<f64>, ValidationError> {
        Ok(vec![self.0; df.height()])
    }
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("test_data.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}

/// Assert that a DataFrame does NOT contain specific columns
pub fn assert_missing_columns(df: &DataFrame, unexpected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in unexpected_cols {
        assert!(
            !actual_cols.contains(&col.to_string()),
            "Unexpected column still present: '{}'",
            col
        );
    }
}
