//! Training dataset loading.
//!
//! Reads a CSV export of the clinical dataset, selects the model's feature
//! columns by header name, and coerces the label column to a strict binary
//! outcome. Rows with a missing or non-binary label are unusable; a missing
//! feature value is kept as [`RawValue::Missing`] and handled by imputation
//! during preprocessing.

use std::collections::HashSet;
use std::path::Path;

use crate::model::ColumnKind;
use crate::ports::RawValue;

/// Default name of the outcome column in the source dataset.
pub const DEFAULT_LABEL_COLUMN: &str = "Carbapenem Resistance";

/// Error type for dataset loading.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse dataset: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dataset has no label column named '{0}'")]
    MissingLabelColumn(String),

    #[error("Dataset has no feature column named '{0}'")]
    MissingFeatureColumn(String),

    #[error("Row {row}: label '{value}' is not 0 or 1")]
    NonBinaryLabel { row: usize, value: String },

    #[error("Dataset contains no usable rows")]
    Empty,

    #[error("Dataset contains only one outcome class")]
    SingleClass,
}

/// A loaded training table: feature rows aligned with binary labels.
#[derive(Debug, Clone)]
pub struct Dataset {
    feature_names: Vec<String>,
    rows: Vec<Vec<RawValue>>,
    labels: Vec<f64>,
}

impl Dataset {
    /// Load a CSV file, selecting `feature_names` columns and the label.
    ///
    /// Rows whose label cell is empty or non-finite are dropped with a
    /// warning; any finite label that is not exactly 0 or 1 aborts the load.
    ///
    /// # Errors
    /// Returns error if the file is unreadable, a named column is absent,
    /// a label is non-binary, or no usable rows remain.
    pub fn from_csv(
        path: &Path,
        feature_names: &[String],
        label_column: &str,
    ) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let label_index = headers
            .iter()
            .position(|h| h == label_column)
            .ok_or_else(|| DatasetError::MissingLabelColumn(label_column.to_string()))?;
        let feature_indices = feature_names
            .iter()
            .map(|name| {
                headers
                    .iter()
                    .position(|h| h == name)
                    .ok_or_else(|| DatasetError::MissingFeatureColumn(name.clone()))
            })
            .collect::<Result<Vec<usize>, DatasetError>>()?;

        let mut rows = Vec::new();
        let mut labels = Vec::new();
        let mut dropped = 0usize;

        for (i, record) in reader.records().enumerate() {
            let record = record?;
            let row_number = i + 2;

            let label_cell = record.get(label_index).unwrap_or("").trim();
            if label_cell.is_empty() {
                dropped += 1;
                continue;
            }
            let label = match label_cell.parse::<f64>() {
                Ok(v) if v == 0.0 || v == 1.0 => v,
                // NaN/inf labels are unusable like missing ones; only a
                // finite value outside {0,1} means a malformed dataset.
                Ok(v) if !v.is_finite() => {
                    dropped += 1;
                    continue;
                }
                _ => {
                    return Err(DatasetError::NonBinaryLabel {
                        row: row_number,
                        value: label_cell.to_string(),
                    })
                }
            };

            let row = feature_indices
                .iter()
                .map(|&idx| parse_cell(record.get(idx).unwrap_or("")))
                .collect();
            rows.push(row);
            labels.push(label);
        }

        if dropped > 0 {
            tracing::warn!("Dropped {dropped} rows with a missing or non-finite outcome label");
        }
        if rows.is_empty() {
            return Err(DatasetError::Empty);
        }
        let positives = labels.iter().filter(|&&y| y == 1.0).count();
        if positives == 0 || positives == labels.len() {
            return Err(DatasetError::SingleClass);
        }

        tracing::info!(
            "Loaded {} rows ({} resistant, {} susceptible) from {:?}",
            rows.len(),
            positives,
            labels.len() - positives,
            path
        );

        Ok(Self {
            feature_names: feature_names.to_vec(),
            rows,
            labels,
        })
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn rows(&self) -> &[Vec<RawValue>] {
        &self.rows
    }

    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Infer a [`ColumnKind`] per feature column.
    ///
    /// A column whose every present cell parses as a number is numeric;
    /// anything else is categorical. Columns named in `categorical_overrides`
    /// are categorical regardless of content, so low-cardinality numeric
    /// codes can be one-hot encoded when the dataset calls for it.
    pub fn column_kinds(&self, categorical_overrides: &[String]) -> Vec<(String, ColumnKind)> {
        let overrides: HashSet<&str> = categorical_overrides.iter().map(String::as_str).collect();
        self.feature_names
            .iter()
            .enumerate()
            .map(|(col, name)| {
                let kind = if overrides.contains(name.as_str()) {
                    ColumnKind::Categorical
                } else if self.column_is_numeric(col) {
                    ColumnKind::Numeric
                } else {
                    ColumnKind::Categorical
                };
                (name.clone(), kind)
            })
            .collect()
    }

    /// Reassemble per-column value vectors for preprocessor fitting.
    pub fn columns(&self, kinds: &[(String, ColumnKind)]) -> Vec<(String, ColumnKind, Vec<RawValue>)> {
        kinds
            .iter()
            .enumerate()
            .map(|(col, (name, kind))| {
                let values = self.rows.iter().map(|row| row[col].clone()).collect();
                (name.clone(), *kind, values)
            })
            .collect()
    }

    fn column_is_numeric(&self, col: usize) -> bool {
        self.rows.iter().all(|row| {
            !matches!(row[col], RawValue::Text(_))
        })
    }
}

fn parse_cell(cell: &str) -> RawValue {
    let cell = cell.trim();
    if cell.is_empty() {
        return RawValue::Missing;
    }
    match cell.parse::<f64>() {
        Ok(v) if v.is_finite() => RawValue::Number(v),
        _ => RawValue::Text(cell.to_string()),
    }
}
