//! Risk assessment use case.
//!
//! Bridges validated patient indicators to whatever [`RiskModel`]
//! implementation was injected at startup. The service asks the model for
//! its own feature order and assembles the input row to match, so the form
//! layout and the artifact's column order can never silently drift apart.

use std::sync::Arc;

use crate::domain::{Assessment, AssessmentResult, PatientIndicators};
use crate::ports::{RawValue, RiskModel};
use crate::{CrkpError, Result};

/// Synchronous assessment service over an injected model.
pub struct AssessmentService<M: RiskModel> {
    model: Arc<M>,
}

impl<M: RiskModel> AssessmentService<M> {
    pub fn new(model: Arc<M>) -> Self {
        Self { model }
    }

    /// Names and order of the features the model expects.
    pub fn feature_names(&self) -> &[String] {
        self.model.feature_names()
    }

    /// Validate the indicators and score them against the model.
    ///
    /// # Errors
    /// Returns error if validation fails, the model expects a feature the
    /// indicators cannot supply, or prediction fails.
    pub fn assess(&self, patient: &PatientIndicators) -> Result<Assessment> {
        patient
            .validate()
            .map_err(|problems| CrkpError::Validation(problems.join("; ")))?;

        let row = self
            .model
            .feature_names()
            .iter()
            .map(|name| {
                patient
                    .value(name)
                    .map(RawValue::Number)
                    .ok_or_else(|| CrkpError::Prediction(format!("unknown feature '{name}'")))
            })
            .collect::<Result<Vec<RawValue>>>()?;

        let probability = self
            .model
            .predict_probability(&row)
            .map_err(|e| CrkpError::Prediction(e.to_string()))?;

        let assessment = Assessment::new(AssessmentResult::new(probability));
        tracing::info!(
            probability = assessment.result.probability,
            risk = %assessment.risk_level,
            "Assessment completed"
        );
        Ok(assessment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RiskLevel, FEATURE_NAMES};

    /// Model stub that scores the mean of its inputs through a step.
    struct StubModel {
        features: Vec<String>,
        probability: f64,
    }

    impl RiskModel for StubModel {
        type Error = std::convert::Infallible;

        fn feature_names(&self) -> &[String] {
            &self.features
        }

        fn predict_probability(&self, _row: &[RawValue]) -> std::result::Result<f64, Self::Error> {
            Ok(self.probability)
        }
    }

    fn service(probability: f64) -> AssessmentService<StubModel> {
        AssessmentService::new(Arc::new(StubModel {
            features: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            probability,
        }))
    }

    fn sample_patient() -> PatientIndicators {
        PatientIndicators {
            age: 60.0,
            albumin: 35.0,
            days_carbapenems: 7.0,
            icu_admission: 1.0,
            ..PatientIndicators::default()
        }
    }

    #[test]
    fn high_probability_maps_to_high_risk() {
        let assessment = service(0.82).assess(&sample_patient()).expect("assess");
        assert_eq!(assessment.result.probability, 0.82);
        assert_eq!(assessment.risk_level, RiskLevel::High);
    }

    #[test]
    fn boundary_probability_maps_to_low_risk() {
        let assessment = service(0.5).assess(&sample_patient()).expect("assess");
        assert_eq!(assessment.risk_level, RiskLevel::Low);
    }

    #[test]
    fn invalid_patient_is_rejected_before_prediction() {
        let mut patient = sample_patient();
        patient.age = 300.0;
        let err = service(0.5).assess(&patient).expect_err("must fail");
        assert!(matches!(err, CrkpError::Validation(_)));
    }

    #[test]
    fn unknown_model_feature_is_a_prediction_error() {
        let service = AssessmentService::new(Arc::new(StubModel {
            features: vec!["Not A Feature".to_string()],
            probability: 0.5,
        }));
        let err = service.assess(&sample_patient()).expect_err("must fail");
        assert!(matches!(err, CrkpError::Prediction(_)));
    }

    /// Model stub that scores only its first input cell, exposing the order
    /// the service assembled the row in.
    struct FirstCellModel {
        features: Vec<String>,
    }

    impl RiskModel for FirstCellModel {
        type Error = std::convert::Infallible;

        fn feature_names(&self) -> &[String] {
            &self.features
        }

        fn predict_probability(&self, row: &[RawValue]) -> std::result::Result<f64, Self::Error> {
            match row[0] {
                RawValue::Number(v) => Ok(v / 100.0),
                _ => Ok(0.0),
            }
        }
    }

    #[test]
    fn row_follows_the_model_feature_order_not_the_form_order() {
        // Reversed feature list: the first cell the model sees must be the
        // last indicator in collection order.
        let reversed: Vec<String> = FEATURE_NAMES.iter().rev().map(|s| s.to_string()).collect();
        let service = AssessmentService::new(Arc::new(FirstCellModel { features: reversed }));

        let mut patient = sample_patient();
        patient.days_beta_lactamase = 42.0;
        let assessment = service.assess(&patient).expect("assess");
        assert!((assessment.result.probability - 0.42).abs() < 1e-12);
    }

    #[test]
    fn assessment_is_idempotent() {
        let service = service(0.3);
        let patient = sample_patient();
        let a = service.assess(&patient).expect("assess");
        let b = service.assess(&patient).expect("assess");
        assert_eq!(a.result.probability, b.result.probability);
        assert_eq!(a.risk_level, b.risk_level);
    }
}
