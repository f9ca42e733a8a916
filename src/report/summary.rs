//! Console summary of a validation run

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::report::ValidationReport;

/// Render the validation outcome as indented console tables.
pub fn display_validation_summary(report: &ValidationReport) {
    println!();
    println!(
        "    {} {}",
        style("📋").cyan(),
        style("VALIDATION SUMMARY").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Metric").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);

    let m = &report.performance_metrics;
    table.add_row(vec![
        Cell::new("📈 AUC-ROC"),
        metric_cell(m.auc_roc, report.validation_thresholds.min_auc),
    ]);
    table.add_row(vec![
        Cell::new("📐 KS Statistic"),
        metric_cell(m.ks_statistic, report.validation_thresholds.min_ks),
    ]);
    table.add_row(vec![
        Cell::new("📊 Gini"),
        metric_cell(m.gini_coefficient, report.validation_thresholds.min_gini),
    ]);
    table.add_row(vec![
        Cell::new("🎯 Accuracy"),
        Cell::new(format!("{:.4}", m.accuracy)),
    ]);
    table.add_row(vec![
        Cell::new("⏳ AUC Decline (backtest)"),
        Cell::new(format!("{:.4}", report.temporal_stability.auc_decline)).fg(
            if report.temporal_stability.auc_decline
                <= report.validation_thresholds.max_auc_decline
            {
                Color::Green
            } else {
                Color::Red
            },
        ),
    ]);

    for line in table.to_string().lines() {
        println!("    {}", line);
    }

    println!();
    println!(
        "    {} {}",
        style("🌪️").cyan(),
        style("STRESS SCENARIOS").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();

    let mut stress_table = Table::new();
    stress_table.load_preset(UTF8_FULL_CONDENSED);
    stress_table.set_header(vec![
        Cell::new("Scenario").add_attribute(Attribute::Bold),
        Cell::new("Multiplier").add_attribute(Attribute::Bold),
        Cell::new("AUC").add_attribute(Attribute::Bold),
        Cell::new("Default Rate").add_attribute(Attribute::Bold),
    ]);
    for (name, result) in &report.stress_tests {
        stress_table.add_row(vec![
            Cell::new(name),
            Cell::new(format!("{:.1}x", result.multiplier)),
            metric_cell(result.auc_roc, report.validation_thresholds.min_stress_auc),
            Cell::new(format!("{:.1}%", result.default_rate * 100.0)),
        ]);
    }
    for line in stress_table.to_string().lines() {
        println!("    {}", line);
    }

    println!();
    println!(
        "    {} {}",
        style("⚖️").cyan(),
        style("REGULATORY COMPLIANCE").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();
    for (criterion, passed) in &report.regulatory_compliance {
        let marker = if *passed {
            style("✓ PASS").green()
        } else {
            style("✗ FAIL").red().bold()
        };
        println!("      {} {}", marker, criterion);
    }

    println!();
    if report.summary.validation_passed {
        println!(
            "    {} {}",
            style("✅").green(),
            style("MODEL APPROVED FOR PRODUCTION").green().bold()
        );
    } else {
        println!(
            "    {} {}",
            style("❌").red(),
            style("MODEL DID NOT PASS VALIDATION").red().bold()
        );
    }
}

fn metric_cell(value: f64, threshold: f64) -> Cell {
    Cell::new(format!("{:.4}", value)).fg(if value >= threshold {
        Color::Green
    } else {
        Color::Red
    })
}
