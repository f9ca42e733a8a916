//! Model validation: metrics, backtesting, stress testing and the
//! regulatory gate.

pub mod backtest;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod risk;
pub mod stress;

pub use backtest::{PeriodResult, TemporalStability};
pub use engine::{
    evaluate_gate, ModelScorer, RegulatoryThresholds, ScoreColumnModel, ValidationConfig,
    ValidationEngine, ValidationStage,
};
pub use error::ValidationError;
pub use metrics::PerformanceMetrics;
pub use risk::{score_from_probability, Decision, RiskClass};
pub use stress::{default_scenarios, StressResult, StressScenario};
