//! Assessment result types.
//!
//! Represents the output of one CRKP resistance prediction.

use serde::{Deserialize, Serialize};

/// Risk classification for display purposes only; the probability itself is
/// the model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Predicted probability at or below 50%
    Low,
    /// Predicted probability above 50%
    High,
}

impl RiskLevel {
    /// Classify a probability. Exactly 0.5 resolves to `Low`; only strictly
    /// greater probabilities get the high-risk treatment.
    #[must_use]
    pub fn from_probability(probability: f64) -> Self {
        if probability > 0.5 {
            Self::High
        } else {
            Self::Low
        }
    }

    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "Low risk - carbapenem resistance unlikely",
            Self::High => "High risk - carbapenem resistance likely",
        }
    }

    /// Get the associated color for TUI display (RGB).
    #[must_use]
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Low => (16, 185, 129),  // Emerald (#10B981)
            Self::High => (244, 63, 94),  // Rose (#F43F5E)
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Raw model prediction (before interpretation).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AssessmentResult {
    /// Probability of the resistant class (0.0 to 1.0)
    pub probability: f64,

    /// Binary prediction (0 = susceptible, 1 = resistant), derived with the
    /// same strict-greater threshold as the risk level
    pub prediction: u8,
}

impl AssessmentResult {
    /// Create a new result from a probability.
    #[must_use]
    pub fn new(probability: f64) -> Self {
        let prediction = if probability > 0.5 { 1 } else { 0 };
        Self {
            probability,
            prediction,
        }
    }

    /// Risk level for display.
    #[must_use]
    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_probability(self.probability)
    }
}

/// Complete assessment record including metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    /// The model prediction
    pub result: AssessmentResult,

    /// Risk classification
    pub risk_level: RiskLevel,

    /// Timestamp of assessment
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Assessment {
    /// Create a new assessment from a result.
    #[must_use]
    pub fn new(result: AssessmentResult) -> Self {
        Self {
            risk_level: result.risk_level(),
            result,
            created_at: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_level_from_probability() {
        assert_eq!(RiskLevel::from_probability(0.1), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(0.9), RiskLevel::High);
    }

    #[test]
    fn threshold_boundary_is_low() {
        // Exactly 0.5 must consistently pick the low branch; values either
        // side resolve to opposite branches.
        assert_eq!(RiskLevel::from_probability(0.5), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(0.4999), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(0.5001), RiskLevel::High);
    }

    #[test]
    fn prediction_follows_threshold() {
        assert_eq!(AssessmentResult::new(0.5).prediction, 0);
        assert_eq!(AssessmentResult::new(0.5001).prediction, 1);
        assert_eq!(AssessmentResult::new(0.75).prediction, 1);
    }

    #[test]
    fn assessment_creation() {
        let assessment = Assessment::new(AssessmentResult::new(0.75));
        assert_eq!(assessment.risk_level, RiskLevel::High);
        assert!((assessment.result.probability - 0.75).abs() < f64::EPSILON);
    }
}
