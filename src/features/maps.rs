//! Category-to-score lookup tables
//!
//! Every mapping the feature engineer relies on lives here as injectable
//! configuration rather than module-level constants, so tests can substitute
//! deterministic fixtures and concurrent pipelines can carry different map
//! versions. The defaults reproduce the reference pipeline the production
//! model was trained against; changing them breaks behavioural parity.

use std::collections::HashMap;

/// A category→value lookup with a neutral fallback for unseen categories.
#[derive(Debug, Clone)]
pub struct ScoreMap {
    values: HashMap<String, f64>,
    fallback: f64,
}

impl ScoreMap {
    pub fn new(entries: &[(&str, f64)], fallback: f64) -> Self {
        Self {
            values: entries
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
            fallback,
        }
    }

    /// Look up a category; unseen or missing categories get the fallback.
    pub fn get(&self, category: Option<&str>) -> f64 {
        category
            .and_then(|c| self.values.get(c).copied())
            .unwrap_or(self.fallback)
    }

    pub fn fallback(&self) -> f64 {
        self.fallback
    }
}

/// All lookup tables used by [`crate::features::FeatureEngineer`].
#[derive(Debug, Clone)]
pub struct FeatureMaps {
    /// Debt-ratio bracket text → representative midpoint (percent).
    pub debt_ratio_midpoints: ScoreMap,
    /// Savings account code → estimated savings rate.
    pub savings_rate: ScoreMap,
    /// Credit history code → payment history score in [0, 1].
    pub payment_history: ScoreMap,
    /// Loan purpose code → credit-mix diversity score in [0, 1].
    pub purpose_diversity: ScoreMap,
    /// Other-plans code → recent inquiry count.
    pub inquiry_counts: ScoreMap,
    /// Employment tenure code → account age in years.
    pub employment_years: ScoreMap,
    /// Credit history code → late payment frequency in [0, 1].
    pub late_payment: ScoreMap,
    /// Employment tenure code → employment stability score in [0, 1].
    pub employment_stability: ScoreMap,
    /// Personal status code → education/employment concordance proxy.
    pub status_match: ScoreMap,
    /// Housing code → regional risk factor.
    pub housing_risk: ScoreMap,
    /// Application month (1..=12) → seasonal risk indicator.
    pub seasonal_risk: [f64; 12],
}

impl Default for FeatureMaps {
    fn default() -> Self {
        Self {
            debt_ratio_midpoints: ScoreMap::new(
                &[
                    ("under 20%", 15.0),
                    ("20% to 25%", 22.5),
                    ("25% to 35%", 30.0),
                    ("over 35%", 40.0),
                ],
                25.0,
            ),
            savings_rate: ScoreMap::new(
                &[
                    ("A11", 0.0), // < 100
                    ("A12", 0.1), // 100-500
                    ("A13", 0.3), // 500-1000
                    ("A14", 0.6), // >= 1000
                    ("A15", 0.0), // unknown
                ],
                0.0,
            ),
            payment_history: ScoreMap::new(
                &[
                    ("A30", 1.0), // no credits / all paid back
                    ("A31", 0.9), // all paid back duly
                    ("A32", 0.7), // existing credits paid duly so far
                    ("A33", 0.4), // past payment delays
                    ("A34", 0.1), // critical account
                ],
                0.5,
            ),
            purpose_diversity: ScoreMap::new(
                &[
                    ("A40", 0.2),  // new car
                    ("A41", 0.3),  // used car
                    ("A42", 0.6),  // furniture/equipment
                    ("A43", 0.4),  // radio/tv
                    ("A44", 0.5),  // appliances
                    ("A45", 0.7),  // repairs
                    ("A46", 0.8),  // education
                    ("A47", 0.6),  // vacation
                    ("A48", 0.9),  // retraining
                    ("A49", 0.8),  // business
                    ("A410", 0.5), // other
                ],
                0.5,
            ),
            inquiry_counts: ScoreMap::new(&[("A141", 2.0), ("A142", 1.0)], 0.0),
            employment_years: ScoreMap::new(
                &[
                    ("A71", 0.5), // unemployed
                    ("A72", 1.0), // < 1 year
                    ("A73", 2.5), // 1-4 years
                    ("A74", 7.0), // 4-7 years
                    ("A75", 10.0), // >= 7 years
                ],
                0.0,
            ),
            late_payment: ScoreMap::new(
                &[
                    ("A30", 0.0),
                    ("A31", 0.0),
                    ("A32", 0.1),
                    ("A33", 0.6),
                    ("A34", 0.9),
                ],
                0.3,
            ),
            employment_stability: ScoreMap::new(
                &[
                    ("A71", 0.0),
                    ("A72", 0.2),
                    ("A73", 0.6),
                    ("A74", 0.8),
                    ("A75", 1.0),
                ],
                0.3,
            ),
            status_match: ScoreMap::new(
                &[("A91", 0.2), ("A92", 0.6), ("A93", 0.8), ("A94", 0.7)],
                0.5,
            ),
            housing_risk: ScoreMap::new(
                &[
                    ("A151", 0.3), // rents
                    ("A152", 0.1), // owns
                    ("A153", 0.5), // free housing
                ],
                0.4,
            ),
            seasonal_risk: [0.1, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.5, 0.4, 0.3, 0.2, 0.8],
        }
    }
}
