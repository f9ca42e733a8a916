//! Command dispatch for the crescore CLI

pub mod args;

pub use args::{Cli, Commands};

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::dataset;
use crate::features::{FeatureConfig, FeatureEngineer};
use crate::report::display_validation_summary;
use crate::transform::{
    ScalingMethod, TransformConfig, TransformerState, VariableTransformer,
};
use crate::utils::{
    create_spinner, finish_with_success, print_info, print_step_header, print_success,
};
use crate::validation::{
    score_from_probability, Decision, RegulatoryThresholds, RiskClass, ScoreColumnModel,
    ValidationConfig, ValidationEngine,
};

/// Outcome of a command, mapped to the process exit code in `main`.
pub enum RunOutcome {
    /// Everything ran and all checks passed.
    Success,
    /// Validation ran to completion but the regulatory gate failed.
    GateFailed,
}

pub struct TransformArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    pub state_out: PathBuf,
    pub load_state: Option<PathBuf>,
    pub target: String,
    pub skip_features: bool,
    pub scaling: String,
    pub seed: u64,
}

pub fn run_transform(args: TransformArgs) -> Result<RunOutcome> {
    print_step_header(1, "LOADING DATASET");
    let spinner = create_spinner("Loading dataset...");
    let df = dataset::load_dataset(&args.input)?;
    finish_with_success(
        &spinner,
        &format!("Loaded {} rows, {} columns", df.height(), df.width()),
    );

    let df = if args.skip_features {
        df
    } else {
        print_step_header(2, "ENGINEERING FEATURES");
        let spinner = create_spinner("Deriving features...");
        let config = FeatureConfig {
            seed: args.seed,
            ..FeatureConfig::default()
        };
        let engineered = FeatureEngineer::new(config)
            .engineer_all_features(&df)
            .context("feature engineering failed")?;
        finish_with_success(
            &spinner,
            &format!("Engineered {} columns total", engineered.width()),
        );
        engineered
    };

    print_step_header(3, "TRANSFORMING VARIABLES");
    let transformer = VariableTransformer::new(TransformConfig {
        target_column: args.target.clone(),
        scaling_method: parse_scaling(&args.scaling)?,
        ..TransformConfig::default()
    });

    let mut transformed = match &args.load_state {
        Some(state_path) => {
            let state = TransformerState::load(state_path).with_context(|| {
                format!("loading transformer state from {}", state_path.display())
            })?;
            print_info(&format!(
                "Replaying fitted state ({} features)",
                state.selected_features.len()
            ));
            transformer.transform(&df, &state)?
        }
        None => {
            let (transformed, state) = transformer.fit_transform(&df)?;
            state
                .save(&args.state_out)
                .with_context(|| format!("saving state to {}", args.state_out.display()))?;
            print_success(&format!(
                "Fitted state written to {}",
                args.state_out.display()
            ));
            transformed
        }
    };

    print_step_header(4, "SAVING OUTPUT");
    dataset::save_dataset(&mut transformed, &args.output)?;
    print_success(&format!(
        "Transformed dataset written to {} ({} rows, {} columns)",
        args.output.display(),
        transformed.height(),
        transformed.width()
    ));

    Ok(RunOutcome::Success)
}

pub struct ValidateArgs {
    pub input: PathBuf,
    pub score_column: String,
    pub target: String,
    pub report_dir: PathBuf,
    pub model_name: String,
    pub seed: u64,
    pub thresholds: RegulatoryThresholds,
}

pub fn run_validate(args: ValidateArgs) -> Result<RunOutcome> {
    print_step_header(1, "LOADING SCORED DATASET");
    let spinner = create_spinner("Loading dataset...");
    let df = dataset::load_dataset(&args.input)?;
    finish_with_success(
        &spinner,
        &format!("Loaded {} rows, {} columns", df.height(), df.width()),
    );

    print_step_header(2, "RUNNING VALIDATION BATTERY");
    let engine = ValidationEngine::new(ValidationConfig {
        target_column: args.target.clone(),
        model_name: args.model_name.clone(),
        thresholds: args.thresholds,
        seed: args.seed,
        ..ValidationConfig::default()
    });
    let model = ScoreColumnModel::new(args.score_column.clone());

    let spinner = create_spinner("Computing metrics, backtest and stress scenarios...");
    let report = engine.run(&model, &df).context("validation run failed")?;
    finish_with_success(&spinner, "Validation battery complete");

    print_step_header(3, "WRITING REPORT");
    let path = report.save(&args.report_dir)?;
    print_success(&format!("Report written to {}", path.display()));

    display_validation_summary(&report);

    // Decision distribution on the 0-1000 score scale.
    let probabilities = dataset::column_to_f64(&df, &args.score_column)?;
    let (mut approved, mut conditional, mut rejected) = (0usize, 0usize, 0usize);
    let mut classes: std::collections::BTreeMap<&'static str, usize> = Default::default();
    for p in probabilities.iter().flatten() {
        let score = score_from_probability(*p);
        *classes.entry(RiskClass::from_score(score).label()).or_insert(0) += 1;
        match Decision::from_score(score) {
            Decision::Approved => approved += 1,
            Decision::Conditional => conditional += 1,
            Decision::Rejected => rejected += 1,
        }
    }
    print_info(&format!(
        "Decisions: {} approved, {} conditional, {} rejected",
        approved, conditional, rejected
    ));
    let breakdown: Vec<String> = classes
        .iter()
        .map(|(label, count)| format!("{} {}", label, count))
        .collect();
    print_info(&format!("Risk classes: {}", breakdown.join(", ")));

    if report.summary.validation_passed {
        Ok(RunOutcome::Success)
    } else {
        Ok(RunOutcome::GateFailed)
    }
}

fn parse_scaling(raw: &str) -> Result<ScalingMethod> {
    match raw.to_lowercase().as_str() {
        "robust" => Ok(ScalingMethod::Robust),
        "standard" => Ok(ScalingMethod::Standard),
        "minmax" => Ok(ScalingMethod::MinMax),
        "quantile" => Ok(ScalingMethod::Quantile),
        other => anyhow::bail!(
            "Unknown scaling method '{}'. Options: robust, standard, minmax, quantile",
            other
        ),
    }
}
