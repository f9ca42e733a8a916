//! Integration tests for transformer state persistence and replay

mod common;

use common::credit_applications;
use crescore::features::{FeatureConfig, FeatureEngineer};
use crescore::transform::{
    TransformConfig, TransformerState, VariableTransformer, STATE_SCHEMA_VERSION,
};
use polars::prelude::*;
use tempfile::TempDir;

fn engineered(n: usize) -> DataFrame {
    FeatureEngineer::new(FeatureConfig::default())
        .engineer_all_features(&credit_applications(n))
        .unwrap()
}

#[test]
fn test_fit_transform_output_matches_state() {
    let df = engineered(120);
    let transformer = VariableTransformer::new(TransformConfig::default());
    let (out, state) = transformer.fit_transform(&df).unwrap();

    assert_eq!(state.schema_version, STATE_SCHEMA_VERSION);
    assert_eq!(state.fitted_columns.len(), df.width());
    assert!(!state.selected_features.is_empty());
    // Output = selected features + target.
    assert_eq!(out.width(), state.selected_features.len() + 1);
    assert_eq!(out.height(), df.height());

    // No string columns survive encoding.
    for col in out.get_columns() {
        assert!(
            !matches!(col.dtype(), DataType::String),
            "column '{}' is still text after transformation",
            col.name()
        );
    }
}

#[test]
fn test_save_load_round_trip() {
    let df = engineered(100);
    let transformer = VariableTransformer::new(TransformConfig::default());
    let (_, state) = transformer.fit_transform(&df).unwrap();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    state.save(&path).unwrap();

    let loaded = TransformerState::load(&path).unwrap();
    assert_eq!(loaded, state);
}

#[test]
fn test_unsupported_schema_version_rejected() {
    let df = engineered(100);
    let transformer = VariableTransformer::new(TransformConfig::default());
    let (_, mut state) = transformer.fit_transform(&df).unwrap();
    state.schema_version = STATE_SCHEMA_VERSION + 1;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    state.save(&path).unwrap();

    let err = TransformerState::load(&path).unwrap_err();
    assert!(err.to_string().contains("schema version"));
}

#[test]
fn test_transform_replays_fit_exactly() {
    let df = engineered(120);
    let transformer = VariableTransformer::new(TransformConfig::default());
    let (fit_out, state) = transformer.fit_transform(&df).unwrap();
    let replay_out = transformer.transform(&df, &state).unwrap();

    assert_eq!(fit_out.height(), replay_out.height());
    let fit_cols: Vec<String> = fit_out.get_column_names().iter().map(|s| s.to_string()).collect();
    let replay_cols: Vec<String> =
        replay_out.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in &state.selected_features {
        assert!(fit_cols.contains(col) && replay_cols.contains(col));
    }

    for name in &state.selected_features {
        let a: Vec<Option<f64>> = fit_out
            .column(name)
            .unwrap()
            .cast(&DataType::Float64)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        let b: Vec<Option<f64>> = replay_out
            .column(name)
            .unwrap()
            .cast(&DataType::Float64)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        for (x, y) in a.iter().zip(b.iter()) {
            match (x, y) {
                (Some(x), Some(y)) => assert!((x - y).abs() < 1e-9, "column {} diverges", name),
                (None, None) => {}
                _ => panic!("null pattern diverges in column {}", name),
            }
        }
    }
}

#[test]
fn test_transform_without_target_column() {
    let df = engineered(120);
    let transformer = VariableTransformer::new(TransformConfig::default());
    let (_, state) = transformer.fit_transform(&df).unwrap();

    let unlabeled = df.drop("target").unwrap();
    let out = transformer.transform(&unlabeled, &state).unwrap();
    assert_eq!(out.width(), state.selected_features.len());
}

#[test]
fn test_schema_mismatch_fails_fast() {
    let df = engineered(120);
    let transformer = VariableTransformer::new(TransformConfig::default());
    let (_, state) = transformer.fit_transform(&df).unwrap();

    let narrowed = df.drop("amount").unwrap();
    let err = transformer.transform(&narrowed, &state).unwrap_err();
    assert!(err.to_string().contains("schema"));
}
