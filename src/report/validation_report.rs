//! Validation report generation
//!
//! The report is the audit artifact of a validation run: every metric, the
//! period-by-period backtest, all stress scenarios, the per-criterion gate
//! outcome and the thresholds in force, serialized as timestamped JSON.

use std::path::{Path, PathBuf};
use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::validation::{
    PerformanceMetrics, RegulatoryThresholds, StressResult, TemporalStability,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub timestamp: String,
    pub model_name: String,
    pub validation_passed: bool,
}

/// Complete validation report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub summary: ValidationSummary,
    pub performance_metrics: PerformanceMetrics,
    pub temporal_stability: TemporalStability,
    pub stress_tests: BTreeMap<String, StressResult>,
    /// Criterion name -> pass, one entry per regulatory criterion.
    pub regulatory_compliance: BTreeMap<String, bool>,
    pub validation_thresholds: RegulatoryThresholds,
}

impl ValidationReport {
    /// Write the report as timestamped JSON under `dir` and return the path.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create report directory: {}", dir.display()))?;

        let filename = format!(
            "validation_report_{}.json",
            Local::now().format("%Y%m%d_%H%M%S")
        );
        let path = dir.join(filename);

        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize validation report to JSON")?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write validation report to {}", path.display()))?;

        Ok(path)
    }

    /// Read a previously saved report back.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read validation report: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse validation report: {}", path.display()))
    }
}
