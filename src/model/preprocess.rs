//! Fitted preprocessing transform.
//!
//! Mirrors the column-transformer layout the artifact was designed around:
//! numeric columns get median imputation then standardization, categorical
//! columns get most-frequent imputation then one-hot encoding. All learned
//! statistics come from training data only; the fitted transform is
//! serialized into the artifact and applied unchanged at inference time.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ports::RawValue;

/// Declared or inferred kind of an input column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// Error type for preprocessing operations.
#[derive(Debug, thiserror::Error)]
pub enum PreprocessError {
    #[error("Row has {got} values, transform expects {expected}")]
    RowShape { got: usize, expected: usize },

    #[error("Column {0:?} has no usable values to fit on")]
    EmptyColumn(String),
}

/// Learned per-column transform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ColumnTransform {
    /// Median imputation followed by standardization.
    Numeric { median: f64, mean: f64, std: f64 },
    /// Most-frequent imputation followed by one-hot encoding over the
    /// categories observed during fitting. Categories unseen at inference
    /// time produce an all-zero indicator block.
    Categorical { fill: String, categories: Vec<String> },
}

impl ColumnTransform {
    /// Number of output columns this transform produces.
    #[must_use]
    pub fn output_dim(&self) -> usize {
        match self {
            Self::Numeric { .. } => 1,
            Self::Categorical { categories, .. } => categories.len(),
        }
    }

    fn apply(&self, value: &RawValue, out: &mut Vec<f64>) {
        match self {
            Self::Numeric { median, mean, std } => {
                let v = value.as_number().unwrap_or(*median);
                out.push((v - mean) / std);
            }
            Self::Categorical { fill, categories } => {
                let key = value.category_key().unwrap_or_else(|| fill.clone());
                for category in categories {
                    out.push(if *category == key { 1.0 } else { 0.0 });
                }
            }
        }
    }
}

/// Fitted preprocessing transform over a fixed, ordered set of columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preprocessor {
    names: Vec<String>,
    transforms: Vec<ColumnTransform>,
}

impl Preprocessor {
    /// Fit the transform on training columns.
    ///
    /// `columns` holds one entry per feature, in feature order, each pairing
    /// the feature name and kind with its raw training cells.
    ///
    /// # Errors
    /// Returns error if any column has no usable values at all.
    pub fn fit(
        columns: &[(String, ColumnKind, Vec<RawValue>)],
    ) -> Result<Self, PreprocessError> {
        let mut names = Vec::with_capacity(columns.len());
        let mut transforms = Vec::with_capacity(columns.len());

        for (name, kind, cells) in columns {
            let transform = match kind {
                ColumnKind::Numeric => fit_numeric(name, cells)?,
                ColumnKind::Categorical => fit_categorical(name, cells)?,
            };
            names.push(name.clone());
            transforms.push(transform);
        }

        Ok(Self { names, transforms })
    }

    /// Column names in the order this transform was fitted on.
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Per-column learned transforms, in column order.
    #[must_use]
    pub fn transforms(&self) -> &[ColumnTransform] {
        &self.transforms
    }

    /// Total width of the transformed feature space.
    #[must_use]
    pub fn output_dim(&self) -> usize {
        self.transforms.iter().map(ColumnTransform::output_dim).sum()
    }

    /// Transform one raw row, ordered to match `column_names`.
    ///
    /// # Errors
    /// Returns error if the row width does not match the fitted columns.
    pub fn transform_row(&self, row: &[RawValue]) -> Result<Vec<f64>, PreprocessError> {
        if row.len() != self.transforms.len() {
            return Err(PreprocessError::RowShape {
                got: row.len(),
                expected: self.transforms.len(),
            });
        }

        let mut out = Vec::with_capacity(self.output_dim());
        for (value, transform) in row.iter().zip(self.transforms.iter()) {
            transform.apply(value, &mut out);
        }
        Ok(out)
    }

    /// Transform a whole training matrix, one raw row at a time.
    ///
    /// # Errors
    /// Returns error if any row width does not match the fitted columns.
    pub fn transform_matrix(&self, rows: &[Vec<RawValue>]) -> Result<Vec<Vec<f64>>, PreprocessError> {
        rows.iter().map(|row| self.transform_row(row)).collect()
    }
}

fn fit_numeric(name: &str, cells: &[RawValue]) -> Result<ColumnTransform, PreprocessError> {
    let mut values: Vec<f64> = cells.iter().filter_map(RawValue::as_number).collect();
    if values.is_empty() {
        return Err(PreprocessError::EmptyColumn(name.to_string()));
    }

    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median = if values.len() % 2 == 1 {
        values[values.len() / 2]
    } else {
        let hi = values.len() / 2;
        (values[hi - 1] + values[hi]) / 2.0
    };

    // Scaler statistics are learned over the imputed column, matching the
    // impute-then-scale fitting order.
    let n = cells.len() as f64;
    let imputed = cells
        .iter()
        .map(|c| c.as_number().unwrap_or(median))
        .collect::<Vec<_>>();
    let mean = imputed.iter().sum::<f64>() / n;
    let variance = imputed.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();
    // Constant columns pass through centered instead of dividing by zero.
    let std = if std > 0.0 { std } else { 1.0 };

    Ok(ColumnTransform::Numeric { median, mean, std })
}

fn fit_categorical(name: &str, cells: &[RawValue]) -> Result<ColumnTransform, PreprocessError> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for cell in cells {
        if let Some(key) = cell.category_key() {
            *counts.entry(key).or_insert(0) += 1;
        }
    }
    if counts.is_empty() {
        return Err(PreprocessError::EmptyColumn(name.to_string()));
    }

    // Ties broken lexicographically for deterministic fitting.
    let fill = counts
        .iter()
        .max_by(|(ka, va), (kb, vb)| va.cmp(vb).then_with(|| kb.cmp(ka)))
        .map(|(k, _)| k.clone())
        .unwrap_or_default();

    let mut categories: Vec<String> = counts.into_keys().collect();
    categories.sort();

    Ok(ColumnTransform::Categorical { fill, categories })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric_column(name: &str, values: &[Option<f64>]) -> (String, ColumnKind, Vec<RawValue>) {
        (
            name.to_string(),
            ColumnKind::Numeric,
            values
                .iter()
                .map(|v| v.map(RawValue::Number).unwrap_or(RawValue::Missing))
                .collect(),
        )
    }

    fn categorical_column(name: &str, values: &[Option<&str>]) -> (String, ColumnKind, Vec<RawValue>) {
        (
            name.to_string(),
            ColumnKind::Categorical,
            values
                .iter()
                .map(|v| {
                    v.map(|s| RawValue::Text(s.to_string()))
                        .unwrap_or(RawValue::Missing)
                })
                .collect(),
        )
    }

    #[test]
    fn numeric_fit_learns_median_and_scaling() {
        let columns = vec![numeric_column(
            "Age",
            &[Some(20.0), Some(40.0), None, Some(60.0)],
        )];
        let pre = Preprocessor::fit(&columns).expect("fit");

        match &pre.transforms()[0] {
            ColumnTransform::Numeric { median, mean, std } => {
                assert!((median - 40.0).abs() < 1e-12);
                // Imputed column: [20, 40, 40, 60], mean 40
                assert!((mean - 40.0).abs() < 1e-12);
                assert!(*std > 0.0);
            }
            other => panic!("expected numeric transform, got {other:?}"),
        }

        // Missing value at transform time falls back to the median, which
        // standardizes to zero here.
        let out = pre.transform_row(&[RawValue::Missing]).expect("transform");
        assert!(out[0].abs() < 1e-12);
    }

    #[test]
    fn standardization_is_zero_mean_unit_variance() {
        let cells: Vec<Option<f64>> = vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
        let columns = vec![numeric_column("x", &cells)];
        let pre = Preprocessor::fit(&columns).expect("fit");

        let transformed: Vec<f64> = cells
            .iter()
            .map(|v| pre.transform_row(&[RawValue::Number(v.unwrap())]).unwrap()[0])
            .collect();
        let mean = transformed.iter().sum::<f64>() / 4.0;
        let var = transformed.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / 4.0;
        assert!(mean.abs() < 1e-12);
        assert!((var - 1.0).abs() < 1e-12);
    }

    #[test]
    fn constant_numeric_column_does_not_divide_by_zero() {
        let columns = vec![numeric_column("c", &[Some(5.0), Some(5.0), Some(5.0)])];
        let pre = Preprocessor::fit(&columns).expect("fit");
        let out = pre.transform_row(&[RawValue::Number(5.0)]).expect("transform");
        assert!(out[0].is_finite());
        assert!(out[0].abs() < 1e-12);
    }

    #[test]
    fn categorical_one_hot_and_most_frequent_impute() {
        let columns = vec![categorical_column(
            "Ward",
            &[Some("icu"), Some("icu"), Some("general"), None],
        )];
        let pre = Preprocessor::fit(&columns).expect("fit");
        assert_eq!(pre.output_dim(), 2);

        // Categories are sorted: ["general", "icu"]
        let icu = pre
            .transform_row(&[RawValue::Text("icu".into())])
            .expect("transform");
        assert_eq!(icu, vec![0.0, 1.0]);

        // Missing imputes to the most frequent category ("icu").
        let missing = pre.transform_row(&[RawValue::Missing]).expect("transform");
        assert_eq!(missing, vec![0.0, 1.0]);
    }

    #[test]
    fn unseen_category_maps_to_all_zeros() {
        let columns = vec![categorical_column("Ward", &[Some("icu"), Some("general")])];
        let pre = Preprocessor::fit(&columns).expect("fit");

        let unseen = pre
            .transform_row(&[RawValue::Text("surgical".into())])
            .expect("transform must not fail on unseen categories");
        assert_eq!(unseen, vec![0.0, 0.0]);
    }

    #[test]
    fn row_shape_mismatch_is_an_error() {
        let columns = vec![numeric_column("a", &[Some(1.0)])];
        let pre = Preprocessor::fit(&columns).expect("fit");
        let err = pre
            .transform_row(&[RawValue::Number(1.0), RawValue::Number(2.0)])
            .expect_err("must fail");
        assert!(matches!(err, PreprocessError::RowShape { got: 2, expected: 1 }));
    }

    #[test]
    fn all_missing_column_fails_to_fit() {
        let columns = vec![numeric_column("empty", &[None, None])];
        assert!(Preprocessor::fit(&columns).is_err());
    }
}
