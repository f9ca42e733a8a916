//! Business feature engineering
//!
//! Derives interpretable credit features (financial ratios, behaviour
//! scores, risk indicators, interactions, temporal proxies) from cleaned
//! application records. Pure augmentation: original columns, row count and
//! row order are always preserved.

pub mod engineer;
pub mod maps;

pub use engineer::{FeatureConfig, FeatureEngineer};
pub use maps::{FeatureMaps, ScoreMap};
