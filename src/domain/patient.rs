//! Patient indicator types for CRKP resistance prediction.
//!
//! The 12 indicators were selected by sequential forward selection on the
//! study cohort; the model artifact records the same names in the same order.

use serde::{Deserialize, Serialize};

/// Number of indicators consumed by the model.
pub const NUM_FEATURES: usize = 12;

/// Feature names in training order. The artifact's stored feature list must
/// equal this list exactly; inference rows are assembled in the artifact's
/// order, never the order fields were collected in.
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "Days of Indwelling Urinary Catheterization",
    "Vascular System Disease",
    "Respiratory System Disease",
    "Days of Carbapenems Use",
    "ICU Admission",
    "Metabolic Abnormality",
    "Respiratory Tract Infection",
    "Urinary System Disease",
    "Albumin",
    "Age",
    "Digestive System Disease",
    "Days of β-Lactamase Inhibitor Combinations Use",
];

/// Yes/No answer for the binary indicators.
///
/// "Yes" always codes to 1 and "No" to 0; no other mapping exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BinaryAnswer {
    #[default]
    No,
    Yes,
}

impl BinaryAnswer {
    /// Numeric code used in the feature vector.
    #[must_use]
    pub fn code(self) -> f64 {
        match self {
            Self::No => 0.0,
            Self::Yes => 1.0,
        }
    }

    /// Parse a user-facing answer. Accepts "Yes"/"No" and the single-key
    /// shorthands "y"/"n", case-insensitively.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" => Ok(Self::Yes),
            "no" | "n" => Ok(Self::No),
            other => Err(format!("Expected Yes or No, got {other:?}")),
        }
    }

    #[must_use]
    pub fn toggle(self) -> Self {
        match self {
            Self::No => Self::Yes,
            Self::Yes => Self::No,
        }
    }
}

impl std::fmt::Display for BinaryAnswer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::No => write!(f, "No"),
            Self::Yes => write!(f, "Yes"),
        }
    }
}

/// The 12 clinical indicators submitted for one assessment.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PatientIndicators {
    /// Days of indwelling urinary catheterization (0-365)
    pub days_urinary_catheter: f64,

    /// Vascular system disease: 0 = no, 1 = yes
    pub vascular_disease: f64,

    /// Respiratory system disease: 0 = no, 1 = yes
    pub respiratory_disease: f64,

    /// Days of carbapenems use (0-365)
    pub days_carbapenems: f64,

    /// ICU admission: 0 = no, 1 = yes
    pub icu_admission: f64,

    /// Metabolic abnormality: 0 = no, 1 = yes
    pub metabolic_abnormality: f64,

    /// Respiratory tract infection: 0 = no, 1 = yes
    pub respiratory_infection: f64,

    /// Urinary system disease: 0 = no, 1 = yes
    pub urinary_disease: f64,

    /// Serum albumin in g/L (0-100)
    pub albumin: f64,

    /// Age in years (0-120)
    pub age: f64,

    /// Digestive system disease: 0 = no, 1 = yes
    pub digestive_disease: f64,

    /// Days of beta-lactamase inhibitor combinations use (0-365)
    pub days_beta_lactamase: f64,
}

impl PatientIndicators {
    /// Convert to a vector in training order (`FEATURE_NAMES`).
    #[must_use]
    pub fn to_row(&self) -> Vec<f64> {
        vec![
            self.days_urinary_catheter,
            self.vascular_disease,
            self.respiratory_disease,
            self.days_carbapenems,
            self.icu_admission,
            self.metabolic_abnormality,
            self.respiratory_infection,
            self.urinary_disease,
            self.albumin,
            self.age,
            self.digestive_disease,
            self.days_beta_lactamase,
        ]
    }

    /// Create indicators from a vector in training order.
    ///
    /// # Errors
    /// Returns error if the vector length is not 12.
    pub fn from_row(v: &[f64]) -> Result<Self, String> {
        if v.len() != NUM_FEATURES {
            return Err(format!("Expected {NUM_FEATURES} indicators, got {}", v.len()));
        }

        Ok(Self {
            days_urinary_catheter: v[0],
            vascular_disease: v[1],
            respiratory_disease: v[2],
            days_carbapenems: v[3],
            icu_admission: v[4],
            metabolic_abnormality: v[5],
            respiratory_infection: v[6],
            urinary_disease: v[7],
            albumin: v[8],
            age: v[9],
            digestive_disease: v[10],
            days_beta_lactamase: v[11],
        })
    }

    /// Look up one indicator by its feature name.
    ///
    /// This is how the application layer assembles an inference row in the
    /// order recorded by the model artifact.
    #[must_use]
    pub fn value(&self, feature_name: &str) -> Option<f64> {
        let row = self.to_row();
        FEATURE_NAMES
            .iter()
            .position(|&n| n == feature_name)
            .map(|i| row[i])
    }

    /// Validate that all indicators are within their declared domains.
    ///
    /// # Errors
    /// Returns validation errors as a vector of strings.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let day_ranges = [
            ("Days of Indwelling Urinary Catheterization", self.days_urinary_catheter),
            ("Days of Carbapenems Use", self.days_carbapenems),
            (
                "Days of β-Lactamase Inhibitor Combinations Use",
                self.days_beta_lactamase,
            ),
        ];
        for (name, value) in day_ranges {
            if !(0.0..=365.0).contains(&value) || value.fract() != 0.0 {
                errors.push(format!("{name}: {value} must be a whole number of days in [0, 365]"));
            }
        }

        let binary = [
            ("Vascular System Disease", self.vascular_disease),
            ("Respiratory System Disease", self.respiratory_disease),
            ("ICU Admission", self.icu_admission),
            ("Metabolic Abnormality", self.metabolic_abnormality),
            ("Respiratory Tract Infection", self.respiratory_infection),
            ("Urinary System Disease", self.urinary_disease),
            ("Digestive System Disease", self.digestive_disease),
        ];
        for (name, value) in binary {
            if value != 0.0 && value != 1.0 {
                errors.push(format!("{name}: {value} must be 0 or 1"));
            }
        }

        if !(0.0..=100.0).contains(&self.albumin) {
            errors.push(format!("Albumin: {} out of range [0, 100] g/L", self.albumin));
        }
        if !(0.0..=120.0).contains(&self.age) || self.age.fract() != 0.0 {
            errors.push(format!("Age: {} must be whole years in [0, 120]", self.age));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PatientIndicators {
        PatientIndicators {
            days_urinary_catheter: 7.0,
            vascular_disease: 1.0,
            respiratory_disease: 0.0,
            days_carbapenems: 3.0,
            icu_admission: 1.0,
            metabolic_abnormality: 0.0,
            respiratory_infection: 1.0,
            urinary_disease: 0.0,
            albumin: 32.5,
            age: 67.0,
            digestive_disease: 0.0,
            days_beta_lactamase: 5.0,
        }
    }

    #[test]
    fn row_roundtrip_preserves_order() {
        let indicators = sample();
        let row = indicators.to_row();
        assert_eq!(row.len(), NUM_FEATURES);
        assert!((row[0] - 7.0).abs() < f64::EPSILON);
        assert!((row[8] - 32.5).abs() < f64::EPSILON);

        let back = PatientIndicators::from_row(&row).expect("Should parse");
        assert!((back.age - 67.0).abs() < f64::EPSILON);
    }

    #[test]
    fn from_row_rejects_wrong_length() {
        assert!(PatientIndicators::from_row(&[1.0; 11]).is_err());
        assert!(PatientIndicators::from_row(&[1.0; 13]).is_err());
    }

    #[test]
    fn value_matches_feature_names() {
        let indicators = sample();
        for (i, name) in FEATURE_NAMES.iter().enumerate() {
            let v = indicators.value(name).expect("known feature");
            assert!((v - indicators.to_row()[i]).abs() < f64::EPSILON, "{name}");
        }
        assert!(indicators.value("Not A Feature").is_none());
    }

    #[test]
    fn binary_answer_mapping() {
        assert!((BinaryAnswer::Yes.code() - 1.0).abs() < f64::EPSILON);
        assert!((BinaryAnswer::No.code() - 0.0).abs() < f64::EPSILON);
        assert_eq!(BinaryAnswer::parse("yes").unwrap(), BinaryAnswer::Yes);
        assert_eq!(BinaryAnswer::parse(" No ").unwrap(), BinaryAnswer::No);
        assert_eq!(BinaryAnswer::parse("Y").unwrap(), BinaryAnswer::Yes);
        assert_eq!(BinaryAnswer::parse("n").unwrap(), BinaryAnswer::No);
        assert!(BinaryAnswer::parse("maybe").is_err());
        assert_eq!(BinaryAnswer::Yes.toggle(), BinaryAnswer::No);
    }

    #[test]
    fn validation_accepts_sample_and_rejects_bad_values() {
        assert!(sample().validate().is_ok());

        let invalid = PatientIndicators {
            days_urinary_catheter: 400.0, // > 365
            vascular_disease: 2.0,        // not binary
            age: 150.0,                   // > 120
            ..sample()
        };
        let errors = invalid.validate().expect_err("must be invalid");
        assert_eq!(errors.len(), 3);
    }
}
