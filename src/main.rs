//! Crescore: credit scoring pipeline CLI
//!
//! Feature engineering, variable transformation and regulatory model
//! validation for credit application datasets.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use crescore::cli::{self, Cli, Commands, RunOutcome, TransformArgs, ValidateArgs};
use crescore::utils::{print_banner, print_completion};
use crescore::validation::RegulatoryThresholds;

/// Exit code when validation completes but the regulatory gate fails.
const EXIT_GATE_FAILED: u8 = 3;

fn main() -> ExitCode {
    match run() {
        Ok(RunOutcome::Success) => ExitCode::SUCCESS,
        Ok(RunOutcome::GateFailed) => ExitCode::from(EXIT_GATE_FAILED),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<RunOutcome> {
    let cli = Cli::parse();
    print_banner(env!("CARGO_PKG_VERSION"));

    let outcome = match cli.command {
        Commands::Transform {
            input,
            output,
            state_out,
            load_state,
            target,
            skip_features,
            scaling,
            seed,
        } => cli::run_transform(TransformArgs {
            input,
            output,
            state_out,
            load_state,
            target,
            skip_features,
            scaling,
            seed,
        })?,
        Commands::Validate {
            input,
            score_column,
            target,
            report_dir,
            model_name,
            seed,
            min_auc,
            min_ks,
            min_gini,
            max_auc_decline,
            min_stress_auc,
        } => cli::run_validate(ValidateArgs {
            input,
            score_column,
            target,
            report_dir,
            model_name,
            seed,
            thresholds: RegulatoryThresholds {
                min_auc,
                min_ks,
                min_gini,
                max_auc_decline,
                min_stress_auc,
            },
        })?,
    };

    match outcome {
        RunOutcome::Success => print_completion("Pipeline complete"),
        RunOutcome::GateFailed => print_completion("Pipeline complete (validation gate failed)"),
    }

    Ok(outcome)
}
