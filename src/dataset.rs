//! Dataset loading and target column handling
//!
//! Loads application records from CSV or Parquet files and extracts the
//! binary default target required by target encoding, feature selection
//! and validation.

use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;

/// Default name of the binary target column ("defaulted" = 1).
pub const DEFAULT_TARGET_COLUMN: &str = "target";

/// Tolerance for floating point comparison when checking binary 0/1 values
const TOLERANCE: f64 = 1e-9;

/// Load a dataset from a file (CSV or Parquet based on extension)
pub fn load_dataset(path: &Path) -> Result<DataFrame> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let lf = match extension.as_str() {
        "csv" => LazyCsvReader::new(path)
            .finish()
            .with_context(|| format!("Failed to load CSV file: {}", path.display()))?,
        "parquet" => LazyFrame::scan_parquet(path, Default::default())
            .with_context(|| format!("Failed to load Parquet file: {}", path.display()))?,
        _ => anyhow::bail!(
            "Unsupported file format: {}. Supported formats: csv, parquet",
            extension
        ),
    };

    lf.collect()
        .with_context(|| format!("Failed to materialize dataset: {}", path.display()))
}

/// Write a dataset to a file (CSV or Parquet based on extension)
pub fn save_dataset(df: &mut DataFrame, path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "csv" => {
            let mut file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            CsvWriter::new(&mut file)
                .finish(df)
                .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
        }
        "parquet" => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            ParquetWriter::new(file)
                .finish(df)
                .with_context(|| format!("Failed to write Parquet file: {}", path.display()))?;
        }
        _ => anyhow::bail!(
            "Unsupported output format: {}. Supported formats: csv, parquet",
            extension
        ),
    }

    Ok(())
}

/// Extract the binary target column as a 0/1 vector.
///
/// Fails if the column is missing, contains nulls, or holds anything other
/// than 0/1 values. Rows are independent client applications; the target
/// marks "defaulted" (1) vs "not defaulted" (0).
pub fn extract_binary_target(df: &DataFrame, target: &str) -> Result<Vec<u8>> {
    let target_col = df
        .column(target)
        .with_context(|| format!("Target column '{}' not found", target))?;

    if target_col.len() == 0 {
        anyhow::bail!("Target column '{}' is empty", target);
    }

    if target_col.null_count() > 0 {
        anyhow::bail!(
            "Target column '{}' contains {} null values; the target must be fully observed",
            target,
            target_col.null_count()
        );
    }

    if !target_col.dtype().is_primitive_numeric() {
        anyhow::bail!(
            "Target column '{}' must be numeric 0/1 (found {})",
            target,
            target_col.dtype()
        );
    }

    let float_col = target_col.cast(&DataType::Float64)?;
    let ca = float_col.f64()?;

    let mut values = Vec::with_capacity(ca.len());
    for (row, opt) in ca.iter().enumerate() {
        match opt {
            Some(v) if (v - 0.0).abs() < TOLERANCE => values.push(0u8),
            Some(v) if (v - 1.0).abs() < TOLERANCE => values.push(1u8),
            Some(v) => anyhow::bail!(
                "Target column '{}' is not binary: row {} holds {}",
                target,
                row,
                v
            ),
            None => unreachable!("null count checked above"),
        }
    }

    Ok(values)
}

/// Extract a column as `Vec<Option<String>>`, casting non-string types.
pub fn column_to_strings(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let col = df
        .column(name)
        .with_context(|| format!("Column '{}' not found", name))?;

    let values: Vec<Option<String>> = match col.dtype() {
        DataType::String => col
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect(),
        DataType::Boolean => col
            .bool()?
            .into_iter()
            .map(|v| v.map(|b| b.to_string()))
            .collect(),
        _ => {
            let cast = col.cast(&DataType::String)?;
            cast.str()?
                .into_iter()
                .map(|v| v.map(|s| s.to_string()))
                .collect()
        }
    };

    Ok(values)
}

/// Extract a column as `Vec<Option<f64>>`, casting integer types.
pub fn column_to_f64(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let col = df
        .column(name)
        .with_context(|| format!("Column '{}' not found", name))?;
    let cast = col
        .cast(&DataType::Float64)
        .with_context(|| format!("Column '{}' is not numeric", name))?;
    Ok(cast.f64()?.into_iter().collect())
}

/// Names of all numeric columns, optionally excluding the target.
pub fn numeric_columns(df: &DataFrame, exclude: Option<&str>) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| {
            col.dtype().is_primitive_numeric() && Some(col.name().as_str()) != exclude
        })
        .map(|col| col.name().to_string())
        .collect()
}

/// Names of all string-typed (categorical) columns.
pub fn categorical_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| matches!(col.dtype(), DataType::String))
        .map(|col| col.name().to_string())
        .collect()
}
