//! Business feature derivation
//!
//! Port of the reference feature-engineering stage: every derivation is a
//! pure function of the input records and the injected lookup maps, so the
//! exact same logic runs at training and at inference time. There is no
//! fit/transform asymmetry and no state carried across calls.

use anyhow::Result;
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp, Normal};

use super::maps::FeatureMaps;
use crate::dataset::{column_to_f64, column_to_strings};

/// Toggles and parameters for feature derivation.
///
/// Each category is independent; disabling one only suppresses its output
/// columns. `seed` drives the simulated temporal features, which stand in
/// for real event timestamps the source data does not have.
#[derive(Debug, Clone)]
pub struct FeatureConfig {
    pub financial_ratios: bool,
    pub credit_behavior: bool,
    pub risk_indicators: bool,
    pub demographics: bool,
    pub interactions: bool,
    pub temporal: bool,
    pub seed: u64,
    pub maps: FeatureMaps,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            financial_ratios: true,
            credit_behavior: true,
            risk_indicators: true,
            demographics: true,
            interactions: true,
            temporal: true,
            seed: 42,
            maps: FeatureMaps::default(),
        }
    }
}

/// Derives business-interpretable features from cleaned application records.
pub struct FeatureEngineer {
    config: FeatureConfig,
}

/// Intermediate per-row values shared across derivation categories.
///
/// Computed unconditionally so that toggling one category off never changes
/// the values another category produces.
struct Intermediates {
    debt_ratio_pct: Vec<Option<f64>>,
    estimated_income: Vec<Option<f64>>,
    credit_utilization: Vec<Option<f64>>,
    savings_rate: Vec<f64>,
    debt_to_income: Vec<Option<f64>>,
    payment_history: Vec<f64>,
    employment_stability: Vec<f64>,
    account_age_years: Vec<f64>,
}

impl FeatureEngineer {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    /// Run every enabled derivation category and return the input frame with
    /// the derived columns appended. Original columns, row count and row
    /// order are preserved exactly.
    pub fn engineer_all_features(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut out = df.clone();
        let inter = self.compute_intermediates(df)?;

        if self.config.financial_ratios {
            self.add_financial_ratios(df, &mut out, &inter)?;
        }
        if self.config.credit_behavior {
            self.add_credit_behavior(df, &mut out, &inter)?;
        }
        if self.config.risk_indicators {
            self.add_risk_indicators(&mut out, &inter)?;
        }
        if self.config.demographics {
            self.add_demographics(df, &mut out, &inter)?;
        }
        if self.config.interactions {
            self.add_interactions(df, &mut out, &inter)?;
        }
        if self.config.temporal {
            self.add_temporal(df, &mut out, &inter)?;
        }

        Ok(out)
    }

    fn compute_intermediates(&self, df: &DataFrame) -> Result<Intermediates> {
        let maps = &self.config.maps;

        let debt_band = column_to_strings(df, "debt_ratio_band")?;
        let amount = column_to_f64(df, "amount")?;
        let savings = column_to_strings(df, "savings")?;
        let history = column_to_strings(df, "credit_history")?;
        let employment = column_to_strings(df, "employment_since")?;

        let debt_ratio_pct: Vec<Option<f64>> = debt_band
            .iter()
            .map(|v| Some(maps.debt_ratio_midpoints.get(v.as_deref())))
            .collect();

        // Income estimated from requested amount and debt ratio; a zero or
        // missing ratio falls back to a conservative fixed multiplier.
        let estimated_income: Vec<Option<f64>> = amount
            .iter()
            .zip(debt_ratio_pct.iter())
            .map(|(amt, ratio)| {
                amt.map(|a| match ratio {
                    Some(r) if *r > 0.0 => a / (r / 100.0),
                    _ => a * 5.0,
                })
            })
            .collect();

        let credit_utilization: Vec<Option<f64>> = debt_ratio_pct
            .iter()
            .map(|r| r.map(|r| (r / 100.0).clamp(0.0, 1.0)))
            .collect();

        let savings_rate: Vec<f64> = savings
            .iter()
            .map(|v| maps.savings_rate.get(v.as_deref()))
            .collect();

        let debt_to_income: Vec<Option<f64>> = amount
            .iter()
            .zip(estimated_income.iter())
            .map(|(amt, inc)| match (amt, inc) {
                (Some(a), Some(i)) if *i > 0.0 => Some(a / i),
                (Some(_), Some(_)) => Some(0.0),
                _ => None,
            })
            .collect();

        let payment_history: Vec<f64> = history
            .iter()
            .map(|v| maps.payment_history.get(v.as_deref()))
            .collect();

        let employment_stability: Vec<f64> = employment
            .iter()
            .map(|v| maps.employment_stability.get(v.as_deref()))
            .collect();

        let account_age_years: Vec<f64> = employment
            .iter()
            .map(|v| maps.employment_years.get(v.as_deref()))
            .collect();

        Ok(Intermediates {
            debt_ratio_pct,
            estimated_income,
            credit_utilization,
            savings_rate,
            debt_to_income,
            payment_history,
            employment_stability,
            account_age_years,
        })
    }

    fn add_financial_ratios(
        &self,
        df: &DataFrame,
        out: &mut DataFrame,
        inter: &Intermediates,
    ) -> Result<()> {
        let amount = column_to_f64(df, "amount")?;

        // Expenses proxied as 10% of the requested amount.
        let expense_to_income: Vec<Option<f64>> = amount
            .iter()
            .zip(inter.estimated_income.iter())
            .map(|(amt, inc)| match (amt, inc) {
                (Some(a), Some(i)) if *i > 0.0 => Some((a * 0.1) / i),
                (Some(_), Some(_)) => Some(0.0),
                _ => None,
            })
            .collect();

        let repayment_capacity: Vec<Option<f64>> = inter
            .estimated_income
            .iter()
            .zip(inter.credit_utilization.iter())
            .map(|(inc, util)| match (inc, util) {
                (Some(i), Some(u)) => Some(i - i * u),
                _ => None,
            })
            .collect();

        add_f64(out, "debt_ratio_pct", inter.debt_ratio_pct.clone())?;
        add_f64(out, "estimated_income", inter.estimated_income.clone())?;
        add_f64(out, "debt_to_income_ratio", inter.debt_to_income.clone())?;
        add_f64(out, "credit_utilization_ratio", inter.credit_utilization.clone())?;
        add_plain_f64(out, "savings_rate", inter.savings_rate.clone())?;
        add_f64(out, "expense_to_income_ratio", expense_to_income)?;
        add_f64(out, "repayment_capacity", repayment_capacity)?;
        Ok(())
    }

    fn add_credit_behavior(
        &self,
        df: &DataFrame,
        out: &mut DataFrame,
        inter: &Intermediates,
    ) -> Result<()> {
        let maps = &self.config.maps;
        let purpose = column_to_strings(df, "purpose")?;
        let other_plans = column_to_strings(df, "other_plans")?;

        let credit_mix: Vec<f64> = purpose
            .iter()
            .map(|v| maps.purpose_diversity.get(v.as_deref()))
            .collect();
        let inquiries: Vec<f64> = other_plans
            .iter()
            .map(|v| maps.inquiry_counts.get(v.as_deref()))
            .collect();

        add_plain_f64(out, "payment_history_score", inter.payment_history.clone())?;
        add_plain_f64(out, "credit_mix_diversity", credit_mix)?;
        add_plain_f64(out, "recent_inquiries_count", inquiries)?;
        add_plain_f64(out, "account_age_years", inter.account_age_years.clone())?;
        Ok(())
    }

    fn add_risk_indicators(&self, out: &mut DataFrame, inter: &Intermediates) -> Result<()> {
        // Weighted combination of payment quality, utilization, savings
        // buffer and leverage. Weights fixed by the reference pipeline.
        let bankruptcy_risk: Vec<Option<f64>> = (0..inter.payment_history.len())
            .map(|i| {
                let util = inter.credit_utilization[i]?;
                let dti = inter.debt_to_income[i]?;
                Some(
                    (1.0 - inter.payment_history[i]) * 0.4
                        + util * 0.3
                        + (1.0 - inter.savings_rate[i]) * 0.2
                        + dti * 0.1,
                )
            })
            .collect();

        add_f64(out, "bankruptcy_risk_score", bankruptcy_risk)?;

        let history = column_to_strings(out, "credit_history")?;
        let late_payment: Vec<f64> = history
            .iter()
            .map(|v| self.config.maps.late_payment.get(v.as_deref()))
            .collect();
        add_plain_f64(out, "late_payment_frequency", late_payment)?;
        add_f64(out, "credit_limit_usage", inter.credit_utilization.clone())?;
        add_plain_f64(
            out,
            "employment_stability_score",
            inter.employment_stability.clone(),
        )?;
        Ok(())
    }

    fn add_demographics(
        &self,
        df: &DataFrame,
        out: &mut DataFrame,
        inter: &Intermediates,
    ) -> Result<()> {
        let maps = &self.config.maps;
        let age = column_to_f64(df, "age")?;
        let status = column_to_strings(df, "personal_status")?;
        let housing = column_to_strings(df, "housing")?;

        let age_segment: Vec<String> = age
            .iter()
            .map(|a| {
                segment_label(
                    *a,
                    &[25.0, 35.0, 45.0, 55.0],
                    &["young", "young_adult", "adult", "mature", "senior"],
                )
            })
            .collect();

        let income_band = equal_width_bands(
            &inter.estimated_income,
            &["low", "medium", "high"],
        );
        let age_income: Vec<String> = age_segment
            .iter()
            .zip(income_band.iter())
            .map(|(seg, band)| format!("{}_{}", seg, band))
            .collect();

        let status_match: Vec<f64> = status
            .iter()
            .map(|v| maps.status_match.get(v.as_deref()))
            .collect();
        let regional_risk: Vec<f64> = housing
            .iter()
            .map(|v| maps.housing_risk.get(v.as_deref()))
            .collect();

        add_str(out, "age_segment", age_segment)?;
        add_str(out, "age_income_segment", age_income)?;
        add_plain_f64(out, "education_employment_match", status_match)?;
        add_plain_f64(out, "regional_risk_factor", regional_risk)?;
        Ok(())
    }

    fn add_interactions(
        &self,
        df: &DataFrame,
        out: &mut DataFrame,
        inter: &Intermediates,
    ) -> Result<()> {
        let age = column_to_f64(df, "age")?;
        let amount = column_to_f64(df, "amount")?;
        let duration = column_to_f64(df, "duration")?;
        let status = column_to_strings(df, "personal_status")?;
        let employment = column_to_strings(df, "employment_since")?;
        let housing = column_to_strings(df, "housing")?;
        let purpose = column_to_strings(df, "purpose")?;

        let age_income: Vec<Option<f64>> = age
            .iter()
            .zip(inter.estimated_income.iter())
            .map(|(a, i)| match (a, i) {
                (Some(a), Some(i)) => Some(a * i / 1000.0),
                _ => None,
            })
            .collect();
        let debt_income: Vec<Option<f64>> = amount
            .iter()
            .zip(inter.estimated_income.iter())
            .map(|(m, i)| match (m, i) {
                (Some(m), Some(i)) => Some(m * i / 10_000.0),
                _ => None,
            })
            .collect();
        let score_util: Vec<Option<f64>> = inter
            .payment_history
            .iter()
            .zip(inter.credit_utilization.iter())
            .map(|(s, u)| u.map(|u| s * u))
            .collect();
        let amount_duration: Vec<Option<f64>> = amount
            .iter()
            .zip(duration.iter())
            .map(|(m, d)| match (m, d) {
                (Some(m), Some(d)) => Some(m * d / 100.0),
                _ => None,
            })
            .collect();

        let education_employment: Vec<String> =
            concat_categories(&status, &employment, "_");
        let marital_housing: Vec<String> = concat_categories(&status, &housing, "_");

        let amount_band = equal_width_bands(&amount, &["low", "medium", "high"]);
        let purpose_amount: Vec<String> = purpose
            .iter()
            .zip(amount_band.iter())
            .map(|(p, band)| format!("{}_{}", p.as_deref().unwrap_or("missing"), band))
            .collect();

        let age_category: Vec<String> = age
            .iter()
            .map(|a| segment_label(*a, &[30.0, 50.0], &["young", "middle", "senior"]))
            .collect();
        let income_band3 =
            equal_width_bands(&inter.estimated_income, &["low", "med", "high"]);
        let age_category_income: Vec<String> = age_category
            .iter()
            .zip(income_band3.iter())
            .map(|(a, i)| format!("{}_income_{}", a, i))
            .collect();

        let stability_payment: Vec<f64> = inter
            .employment_stability
            .iter()
            .zip(inter.payment_history.iter())
            .map(|(e, p)| e * p)
            .collect();

        add_f64(out, "age_income_interaction", age_income)?;
        add_f64(out, "debt_income_interaction", debt_income)?;
        add_f64(out, "score_utilization_interaction", score_util)?;
        add_f64(out, "amount_duration_interaction", amount_duration)?;
        add_str(out, "education_employment", education_employment)?;
        add_str(out, "marital_housing", marital_housing)?;
        add_str(out, "purpose_amount", purpose_amount)?;
        add_str(out, "age_category_income", age_category_income)?;
        add_plain_f64(out, "employment_stability_payment", stability_payment)?;
        Ok(())
    }

    /// Simulated temporal features.
    ///
    /// The source data carries no event timestamps, so recency and
    /// seasonality are drawn from the seeded generator as documented
    /// placeholders. A production deployment should replace these with a
    /// feature provider backed by real timestamped event logs; tests must
    /// not golden-assert their values.
    fn add_temporal(
        &self,
        df: &DataFrame,
        out: &mut DataFrame,
        inter: &Intermediates,
    ) -> Result<()> {
        let n = df.height();
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        let account_age_months: Vec<f64> =
            inter.account_age_years.iter().map(|y| y * 12.0).collect();

        let exp = Exp::new(1.0 / 30.0).expect("positive rate");
        let time_since_payment: Vec<f64> =
            (0..n).map(|_| exp.sample(&mut rng)).collect();

        let noise = Normal::new(12.0, 6.0).expect("valid normal");
        let history_length: Vec<f64> = account_age_months
            .iter()
            .map(|m| (m + noise.sample(&mut rng)).max(0.0))
            .collect();

        let application_month: Vec<f64> =
            (0..n).map(|_| rng.gen_range(1..=12) as f64).collect();
        let seasonal: Vec<f64> = application_month
            .iter()
            .map(|m| self.config.maps.seasonal_risk[(*m as usize) - 1])
            .collect();
        let holiday: Vec<f64> = application_month
            .iter()
            .map(|m| {
                if matches!(*m as u32, 6 | 7 | 8 | 12) {
                    1.0
                } else {
                    0.0
                }
            })
            .collect();

        let income_noise = Normal::new(0.0, 0.1).expect("valid normal");
        let spending_noise = Normal::new(0.0, 0.15).expect("valid normal");
        let usage_noise = Normal::new(0.0, 0.2).expect("valid normal");
        let income_trend: Vec<f64> = (0..n).map(|_| income_noise.sample(&mut rng)).collect();
        let spending_trend: Vec<f64> =
            (0..n).map(|_| spending_noise.sample(&mut rng)).collect();
        let usage_trend: Vec<f64> = (0..n).map(|_| usage_noise.sample(&mut rng)).collect();

        add_plain_f64(out, "account_age_months", account_age_months)?;
        add_plain_f64(out, "time_since_last_payment", time_since_payment)?;
        add_plain_f64(out, "credit_history_length", history_length)?;
        add_plain_f64(out, "application_month", application_month)?;
        add_plain_f64(out, "seasonal_risk_indicator", seasonal)?;
        add_plain_f64(out, "holiday_proximity", holiday)?;
        add_plain_f64(out, "income_trend", income_trend)?;
        add_plain_f64(out, "spending_trend", spending_trend)?;
        add_plain_f64(out, "credit_usage_trend", usage_trend)?;
        Ok(())
    }
}

fn add_f64(df: &mut DataFrame, name: &str, values: Vec<Option<f64>>) -> Result<()> {
    df.with_column(Column::new(name.into(), values))?;
    Ok(())
}

fn add_plain_f64(df: &mut DataFrame, name: &str, values: Vec<f64>) -> Result<()> {
    df.with_column(Column::new(name.into(), values))?;
    Ok(())
}

fn add_str(df: &mut DataFrame, name: &str, values: Vec<String>) -> Result<()> {
    df.with_column(Column::new(name.into(), values))?;
    Ok(())
}

/// Label a value against ordered upper bounds; the last label catches the rest.
fn segment_label(value: Option<f64>, bounds: &[f64], labels: &[&str]) -> String {
    match value {
        None => "missing".to_string(),
        Some(v) => {
            for (i, bound) in bounds.iter().enumerate() {
                if v <= *bound {
                    return labels[i].to_string();
                }
            }
            labels[labels.len() - 1].to_string()
        }
    }
}

/// Equal-width banding over the observed range (the source's 3-bin cut).
fn equal_width_bands(values: &[Option<f64>], labels: &[&str]) -> Vec<String> {
    let observed: Vec<f64> = values.iter().filter_map(|v| *v).collect();
    if observed.is_empty() {
        return vec!["missing".to_string(); values.len()];
    }
    let min = observed.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = observed.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let width = (max - min) / labels.len() as f64;

    values
        .iter()
        .map(|v| match v {
            None => "missing".to_string(),
            Some(v) => {
                if width <= 0.0 {
                    return labels[0].to_string();
                }
                let idx = (((v - min) / width) as usize).min(labels.len() - 1);
                labels[idx].to_string()
            }
        })
        .collect()
}

fn concat_categories(
    a: &[Option<String>],
    b: &[Option<String>],
    sep: &str,
) -> Vec<String> {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            format!(
                "{}{}{}",
                x.as_deref().unwrap_or("missing"),
                sep,
                y.as_deref().unwrap_or("missing")
            )
        })
        .collect()
}
