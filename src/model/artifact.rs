//! Model artifact: the single serialized bundle consumed by the service.
//!
//! One JSON file holding the fitted preprocessing transform (`preprocess`),
//! the fitted classifier (`clf`), and the ordered feature name list
//! (`features`). The bundle is created once per training run, loaded
//! read-only at service startup, and never mutated. Resampling objects are
//! deliberately absent: they transform the training matrix only and have no
//! transform for unseen rows.

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::{GradientBoostedTrees, PreprocessError, Preprocessor};
use crate::ports::{RawValue, RiskModel};

/// Error type for artifact operations.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Failed to read artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed artifact: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Inconsistent artifact: {0}")]
    Invalid(String),

    #[error("Preprocessing failed: {0}")]
    Preprocess(#[from] PreprocessError),

    #[error("Prediction produced a non-finite probability")]
    NonFiniteProbability,
}

/// The deployable bundle: preprocessing transform + classifier + feature list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    preprocess: Preprocessor,
    clf: GradientBoostedTrees,
    features: Vec<String>,
}

impl ModelArtifact {
    /// Assemble an artifact from freshly fitted parts.
    ///
    /// # Errors
    /// Returns error if the parts disagree on feature names or widths.
    pub fn new(
        preprocess: Preprocessor,
        clf: GradientBoostedTrees,
        features: Vec<String>,
    ) -> Result<Self, ArtifactError> {
        let artifact = Self {
            preprocess,
            clf,
            features,
        };
        artifact.validate()?;
        Ok(artifact)
    }

    /// Load and validate an artifact from disk.
    ///
    /// Any failure here is a startup failure for the service: the file is
    /// either loadable and internally consistent, or the caller refuses to
    /// serve predictions.
    ///
    /// # Errors
    /// Returns error if the file is missing, malformed, or inconsistent.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let content = std::fs::read_to_string(path)?;
        let artifact: Self = serde_json::from_str(&content)?;
        artifact.validate()?;

        tracing::info!(
            "Loaded model artifact from {:?} ({} features, {} trees)",
            path,
            artifact.features.len(),
            artifact.clf.n_trees()
        );
        Ok(artifact)
    }

    /// Persist the artifact atomically (temp file + rename).
    ///
    /// # Errors
    /// Returns error on serialization or I/O failure.
    pub fn save(&self, path: &Path) -> Result<(), ArtifactError> {
        let json = serde_json::to_string(self)?;

        let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(dir) = dir {
            std::fs::create_dir_all(dir)?;
        }

        let tmp_path = path.with_extension("json.tmp");
        {
            let mut file = std::fs::File::create(&tmp_path)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp_path, path)?;

        tracing::info!("Saved model artifact to {:?}", path);
        Ok(())
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        if self.features.is_empty() {
            return Err(ArtifactError::Invalid("empty feature list".into()));
        }
        if self.preprocess.column_names() != self.features.as_slice() {
            return Err(ArtifactError::Invalid(
                "preprocess columns do not match the feature list".into(),
            ));
        }
        if self.clf.n_features() != self.preprocess.output_dim() {
            return Err(ArtifactError::Invalid(format!(
                "classifier expects {} inputs but the transform produces {}",
                self.clf.n_features(),
                self.preprocess.output_dim()
            )));
        }
        Ok(())
    }
}

impl RiskModel for ModelArtifact {
    type Error = ArtifactError;

    fn feature_names(&self) -> &[String] {
        &self.features
    }

    fn predict_probability(&self, row: &[RawValue]) -> Result<f64, ArtifactError> {
        let transformed = self.preprocess.transform_row(row)?;
        let probability = self.clf.predict_probability(&transformed);
        if !probability.is_finite() {
            return Err(ArtifactError::NonFiniteProbability);
        }
        Ok(probability)
    }
}
