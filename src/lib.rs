//! Crescore: Credit Scoring Pipeline Library
//!
//! A library for building and validating credit-scoring models:
//! business feature engineering, variable transformation (encoding,
//! scaling, feature selection) and Basel-style validation with
//! temporal backtesting and economic stress tests.

pub mod cli;
pub mod dataset;
pub mod features;
pub mod report;
pub mod transform;
pub mod utils;
pub mod validation;
