//! Score bands, risk classes and credit decisions

use serde::{Deserialize, Serialize};

/// Rating bands over the 0-1000 score scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskClass {
    AAA,
    AA,
    A,
    BBB,
    BB,
    B,
    CCC,
    D,
}

impl RiskClass {
    pub fn from_score(score: u32) -> Self {
        match score {
            950..=1000 => RiskClass::AAA,
            900..=949 => RiskClass::AA,
            800..=899 => RiskClass::A,
            650..=799 => RiskClass::BBB,
            500..=649 => RiskClass::BB,
            350..=499 => RiskClass::B,
            200..=349 => RiskClass::CCC,
            _ => RiskClass::D,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskClass::AAA => "AAA",
            RiskClass::AA => "AA",
            RiskClass::A => "A",
            RiskClass::BBB => "BBB",
            RiskClass::BB => "BB",
            RiskClass::B => "B",
            RiskClass::CCC => "CCC",
            RiskClass::D => "D",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Approved,
    Conditional,
    Rejected,
}

impl Decision {
    pub fn from_score(score: u32) -> Self {
        if score >= 520 {
            Decision::Approved
        } else if score >= 400 {
            Decision::Conditional
        } else {
            Decision::Rejected
        }
    }
}

/// Map a default probability to the 0-1000 credit score scale.
///
/// Lower default probability means a higher score.
pub fn score_from_probability(probability: f64) -> u32 {
    let p = probability.clamp(0.0, 1.0);
    ((1.0 - p) * 1000.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_class_boundaries() {
        assert_eq!(RiskClass::from_score(1000), RiskClass::AAA);
        assert_eq!(RiskClass::from_score(950), RiskClass::AAA);
        assert_eq!(RiskClass::from_score(949), RiskClass::AA);
        assert_eq!(RiskClass::from_score(800), RiskClass::A);
        assert_eq!(RiskClass::from_score(799), RiskClass::BBB);
        assert_eq!(RiskClass::from_score(500), RiskClass::BB);
        assert_eq!(RiskClass::from_score(499), RiskClass::B);
        assert_eq!(RiskClass::from_score(349), RiskClass::CCC);
        assert_eq!(RiskClass::from_score(199), RiskClass::D);
        assert_eq!(RiskClass::from_score(0), RiskClass::D);
    }

    #[test]
    fn test_decision_boundaries() {
        assert_eq!(Decision::from_score(520), Decision::Approved);
        assert_eq!(Decision::from_score(519), Decision::Conditional);
        assert_eq!(Decision::from_score(400), Decision::Conditional);
        assert_eq!(Decision::from_score(399), Decision::Rejected);
        assert_eq!(Decision::from_score(0), Decision::Rejected);
    }

    #[test]
    fn test_score_from_probability() {
        assert_eq!(score_from_probability(0.0), 1000);
        assert_eq!(score_from_probability(1.0), 0);
        assert_eq!(score_from_probability(0.25), 750);
        // Out-of-range probabilities are clamped.
        assert_eq!(score_from_probability(-0.5), 1000);
        assert_eq!(score_from_probability(1.5), 0);
    }
}
