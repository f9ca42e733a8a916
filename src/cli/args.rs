//! Command-line argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Crescore - credit scoring pipeline: feature engineering, variable
/// transformation and model validation
#[derive(Parser, Debug)]
#[command(name = "crescore")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Engineer features and fit (or replay) the variable transformation
    Transform {
        /// Input file path (CSV or Parquet)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path for the transformed dataset (CSV or Parquet)
        #[arg(short, long)]
        output: PathBuf,

        /// Where to write the fitted transformer state
        #[arg(long, default_value = "transformer_state.json")]
        state_out: PathBuf,

        /// Replay an existing fitted state instead of fitting
        #[arg(long)]
        load_state: Option<PathBuf>,

        /// Target column name
        #[arg(short, long, default_value = "target")]
        target: String,

        /// Skip feature engineering and transform the input columns as-is
        #[arg(long, default_value_t = false)]
        skip_features: bool,

        /// Scaling method: robust, standard, minmax or quantile
        #[arg(long, default_value = "robust")]
        scaling: String,

        /// Seed for the simulated temporal features
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },

    /// Validate a scored dataset against the regulatory criteria
    Validate {
        /// Input file path (CSV or Parquet) with target and score columns
        #[arg(short, long)]
        input: PathBuf,

        /// Column holding the model's default probabilities
        #[arg(short, long, default_value = "score")]
        score_column: String,

        /// Target column name
        #[arg(short, long, default_value = "target")]
        target: String,

        /// Directory for the JSON validation report
        #[arg(long, default_value = "reports")]
        report_dir: PathBuf,

        /// Model name recorded in the report
        #[arg(long, default_value = "credit_scoring_model")]
        model_name: String,

        /// Seed for backtest resampling and stress flips
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Minimum acceptable AUC-ROC
        #[arg(long, default_value_t = 0.75)]
        min_auc: f64,

        /// Minimum acceptable KS statistic
        #[arg(long, default_value_t = 0.30)]
        min_ks: f64,

        /// Minimum acceptable Gini coefficient
        #[arg(long, default_value_t = 0.40)]
        min_gini: f64,

        /// Maximum acceptable AUC spread across backtest periods
        #[arg(long, default_value_t = 0.10)]
        max_auc_decline: f64,

        /// Minimum acceptable AUC under any stress scenario
        #[arg(long, default_value_t = 0.70)]
        min_stress_auc: f64,
    },
}
