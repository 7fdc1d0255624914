//! Scored decision data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Binary risk classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLabel {
    #[serde(rename = "HIGH_RISK")]
    HighRisk,
    #[serde(rename = "LOW_RISK")]
    LowRisk,
}

impl RiskLabel {
    /// Classify a default probability against the decision threshold.
    /// The comparison is inclusive: a probability exactly at the threshold
    /// is HIGH_RISK.
    pub fn from_probability(probability: f64, threshold: f64) -> Self {
        if probability >= threshold {
            RiskLabel::HighRisk
        } else {
            RiskLabel::LowRisk
        }
    }
}

/// Result of scoring one applicant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredResult {
    /// Unique result identifier
    pub result_id: String,

    /// Probability of default (positive class), in [0, 1]
    pub probability: f64,

    /// Decision threshold that was applied
    pub threshold: f64,

    /// Risk classification
    pub label: RiskLabel,

    /// Scoring timestamp
    pub timestamp: DateTime<Utc>,
}

impl ScoredResult {
    /// Build a result from a probability and the process-wide threshold.
    pub fn new(probability: f64, threshold: f64) -> Self {
        Self {
            result_id: uuid::Uuid::new_v4().to_string(),
            probability,
            threshold,
            label: RiskLabel::from_probability(probability, threshold),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_threshold_inclusive() {
        assert_eq!(
            RiskLabel::from_probability(0.5, 0.5),
            RiskLabel::HighRisk
        );
        assert_eq!(
            RiskLabel::from_probability(0.4999, 0.5),
            RiskLabel::LowRisk
        );
        assert_eq!(RiskLabel::from_probability(1.0, 0.5), RiskLabel::HighRisk);
        assert_eq!(RiskLabel::from_probability(0.0, 0.5), RiskLabel::LowRisk);
    }

    #[test]
    fn test_label_spellings() {
        assert_eq!(
            serde_json::to_string(&RiskLabel::HighRisk).unwrap(),
            "\"HIGH_RISK\""
        );
        assert_eq!(
            serde_json::to_string(&RiskLabel::LowRisk).unwrap(),
            "\"LOW_RISK\""
        );
    }

    #[test]
    fn test_result_serialization() {
        let result = ScoredResult::new(0.73, 0.35);
        assert_eq!(result.label, RiskLabel::HighRisk);

        let json = serde_json::to_string(&result).unwrap();
        let deserialized: ScoredResult = serde_json::from_str(&json).unwrap();

        assert_eq!(result.result_id, deserialized.result_id);
        assert_eq!(result.probability, deserialized.probability);
        assert_eq!(result.label, deserialized.label);
    }
}
