//! Integration tests for categorical encoding

mod common;

use common::{assert_has_columns, assert_missing_columns};
use crescore::transform::encoding::{apply_encoders, fit_encoders};
use crescore::transform::{EncodingConfig, FittedEncoder, TransformError};
use polars::prelude::*;

fn low_cardinality_frame() -> DataFrame {
    df! {
        "housing" => ["A151", "A152", "A152", "A153", "A151", "A152", "A151", "A153"],
        "amount" => [100.0f64, 200.0, 300.0, 400.0, 500.0, 600.0, 700.0, 800.0],
    }
    .unwrap()
}

#[test]
fn test_low_cardinality_one_hot_drop_first() {
    let df = low_cardinality_frame();
    let (encoded, encoders) = fit_encoders(&df, None, &EncodingConfig::default()).unwrap();

    assert_eq!(encoders.len(), 1);
    let encoder = &encoders[0];
    assert!(matches!(&encoder.encoder, FittedEncoder::OneHot { categories } if categories.len() == 3));

    // First sorted category is the baseline and gets no column.
    assert_missing_columns(&encoded, &["housing", "housing_A151"]);
    assert_has_columns(&encoded, &["housing_A152", "housing_A153", "amount"]);

    // Exactly one indicator fires per non-baseline row.
    let a152: Vec<f64> = encoded.column("housing_A152").unwrap().f64().unwrap().into_iter().flatten().collect();
    let a153: Vec<f64> = encoded.column("housing_A153").unwrap().f64().unwrap().into_iter().flatten().collect();
    for (x, y) in a152.iter().zip(a153.iter()) {
        assert!(x + y <= 1.0);
    }
}

#[test]
fn test_one_hot_round_trip_recovers_categories() {
    let df = low_cardinality_frame();
    let (encoded, encoders) = fit_encoders(&df, None, &EncodingConfig::default()).unwrap();
    let encoder = &encoders[0];

    let output_cols = encoder.output_columns();
    let originals: Vec<Option<String>> = df
        .column("housing")
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect();

    for row in 0..df.height() {
        let indicator_row: Vec<f64> = output_cols
            .iter()
            .map(|c| encoded.column(c).unwrap().f64().unwrap().get(row).unwrap())
            .collect();
        let decoded = encoder.decode_one_hot(&indicator_row).unwrap();
        assert_eq!(Some(decoded.to_string()), originals[row]);
    }
}

#[test]
fn test_high_cardinality_target_encoding() {
    let n = 60;
    let values: Vec<String> = (0..n).map(|i| format!("cat_{}", i % 15)).collect();
    let target: Vec<u8> = (0..n).map(|i| (i % 2) as u8).collect();
    let df = df! { "code" => values }.unwrap();

    let config = EncodingConfig {
        high_cardinality_threshold: 10,
        rare_category_threshold: 0.0,
        target_smoothing: 10.0,
    };
    let (encoded, encoders) = fit_encoders(&df, Some(&target), &config).unwrap();

    assert_has_columns(&encoded, &["code_encoded"]);
    match &encoders[0].encoder {
        FittedEncoder::Target { means, prior } => {
            assert_eq!(means.len(), 15);
            assert!((prior - 0.5).abs() < 1e-9);
            // Smoothing keeps every mean strictly between the extremes.
            for mean in means.values() {
                assert!(*mean > 0.0 && *mean < 1.0);
            }
        }
        other => panic!("expected target encoding, got {:?}", other),
    }
}

#[test]
fn test_high_cardinality_without_target_uses_label_codes() {
    let values: Vec<String> = (0..60).map(|i| format!("cat_{}", i % 15)).collect();
    let df = df! { "code" => values }.unwrap();

    let config = EncodingConfig {
        rare_category_threshold: 0.0,
        ..EncodingConfig::default()
    };
    let (encoded, encoders) = fit_encoders(&df, None, &config).unwrap();

    assert!(matches!(&encoders[0].encoder, FittedEncoder::Label { classes } if classes.len() == 15));
    let codes: Vec<f64> = encoded.column("code_encoded").unwrap().f64().unwrap().into_iter().flatten().collect();
    assert!(codes.iter().all(|c| (0.0..15.0).contains(c)));
}

#[test]
fn test_rare_categories_collapse_and_replay() {
    // 100 rows: two dominant categories plus a singleton below the 1% line.
    let mut values: Vec<String> = Vec::new();
    for i in 0..99 {
        values.push(if i % 2 == 0 { "common_a" } else { "common_b" }.to_string());
    }
    values.push("one_off".to_string());
    let df = df! { "code" => values }.unwrap();

    let config = EncodingConfig {
        rare_category_threshold: 0.02,
        ..EncodingConfig::default()
    };
    let (_, encoders) = fit_encoders(&df, None, &config).unwrap();
    let encoder = &encoders[0];
    assert!(encoder.rare_categories.contains("one_off"));

    match &encoder.encoder {
        FittedEncoder::OneHot { categories } => {
            assert!(categories.contains(&"rare_category".to_string()));
            assert!(!categories.contains(&"one_off".to_string()));
        }
        other => panic!("expected one-hot, got {:?}", other),
    }

    // Replay: a category that is frequent in new data but was rare at fit
    // time still collapses, because the fit-time set is authoritative.
    let new_df = df! { "code" => ["one_off", "one_off", "common_a"] }.unwrap();
    let replayed = apply_encoders(&new_df, &encoders).unwrap();

    let rare_col: Vec<f64> = replayed
        .column("code_rare_category")
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(rare_col, vec![1.0, 1.0, 0.0]);
}

#[test]
fn test_nulls_become_missing_sentinel() {
    let df = df! {
        "code" => [Some("A151"), None, Some("A152"), None, Some("A151"), Some("A152")],
    }
    .unwrap();

    let config = EncodingConfig {
        rare_category_threshold: 0.0,
        ..EncodingConfig::default()
    };
    let (encoded, _) = fit_encoders(&df, None, &config).unwrap();

    // Sorted categories: A151 (baseline), A152, missing.
    let missing_col: Vec<f64> = encoded
        .column("code_missing")
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(missing_col, vec![0.0, 1.0, 0.0, 1.0, 0.0, 0.0]);
}

#[test]
fn test_unfitted_column_fails_on_replay() {
    let df = low_cardinality_frame();
    let (_, encoders) = fit_encoders(&df, None, &EncodingConfig::default()).unwrap();

    let new_df = df! {
        "housing" => ["A151"],
        "brand_new_text" => ["hello"],
    }
    .unwrap();

    let err = apply_encoders(&new_df, &encoders).unwrap_err();
    assert!(matches!(
        err,
        TransformError::NotFitted { stage: "encoding", ref column } if column == "brand_new_text"
    ));
}
