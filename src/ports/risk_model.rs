//! Risk model port: the one interface the application predicts through.
//!
//! Two artifact shapes exist in the wild for this model family (separate
//! preprocess + classifier, or one combined pipeline). This trait hides that
//! behind a single `predict_probability`; the crate ships exactly one
//! implementation (the split shape, see `model::ModelArtifact`).

/// One cell of an unprocessed inference row, keyed positionally by the
/// model's feature list.
///
/// Numeric cells cover the CRKP indicators; text and missing cells exist so
/// the preprocessing transform can be exercised the same way it was fitted
/// (categorical columns, imputation).
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Missing,
}

impl RawValue {
    /// Key used for categorical matching. Whole numbers are canonicalized
    /// without a fractional part so a `1.0` cell and a `"1"` cell agree.
    #[must_use]
    pub fn category_key(&self) -> Option<String> {
        match self {
            Self::Number(v) if v.is_finite() => {
                if v.fract() == 0.0 && v.abs() < 1e15 {
                    Some(format!("{}", *v as i64))
                } else {
                    Some(format!("{v}"))
                }
            }
            Self::Number(_) => None,
            Self::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Self::Missing => None,
        }
    }

    /// Numeric view of the cell, if it has one.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) if v.is_finite() => Some(*v),
            Self::Number(_) | Self::Missing => None,
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }
}

/// Trait for a fitted model that turns one raw indicator row into a
/// resistance probability.
pub trait RiskModel: Send + Sync {
    /// Error type for prediction failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Feature names in the exact order this model was fitted on.
    fn feature_names(&self) -> &[String];

    /// Probability of the positive (resistant) class for one row.
    ///
    /// `row` must be ordered to match `feature_names`.
    ///
    /// # Errors
    /// Returns error on shape mismatch or an incompatible fitted state.
    fn predict_probability(&self, row: &[RawValue]) -> Result<f64, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_key_canonicalizes_whole_numbers() {
        assert_eq!(RawValue::Number(1.0).category_key().as_deref(), Some("1"));
        assert_eq!(RawValue::Number(0.0).category_key().as_deref(), Some("0"));
        assert_eq!(
            RawValue::Text("1".into()).category_key().as_deref(),
            Some("1")
        );
        assert_eq!(RawValue::Number(1.5).category_key().as_deref(), Some("1.5"));
    }

    #[test]
    fn missing_and_blank_have_no_key() {
        assert_eq!(RawValue::Missing.category_key(), None);
        assert_eq!(RawValue::Text("  ".into()).category_key(), None);
        assert_eq!(RawValue::Number(f64::NAN).category_key(), None);
    }

    #[test]
    fn as_number_parses_text() {
        assert_eq!(RawValue::Text("42.5".into()).as_number(), Some(42.5));
        assert_eq!(RawValue::Text("abc".into()).as_number(), None);
        assert_eq!(RawValue::Missing.as_number(), None);
    }
}
