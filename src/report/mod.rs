//! Report generation and display

pub mod summary;
pub mod validation_report;

pub use summary::display_validation_summary;
pub use validation_report::{ValidationReport, ValidationSummary};
