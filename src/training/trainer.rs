//! Offline training pipeline.
//!
//! Orchestrates the full run: load the CSV, fit the preprocessing transform,
//! rebalance the encoded matrix, fit the classifier, and write the single
//! JSON artifact the assessment service consumes. Every stochastic step is
//! driven by one configured seed, so a given dataset and configuration
//! reproduce the same artifact byte for byte.

use std::path::PathBuf;

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::domain::FEATURE_NAMES;
use crate::model::{
    ArtifactError, GbdtError, GbdtParams, GradientBoostedTrees, ModelArtifact, PreprocessError,
    Preprocessor,
};
use crate::training::dataset::{Dataset, DatasetError, DEFAULT_LABEL_COLUMN};
use crate::training::resample::{BorderlineSmote, EditedNearestNeighbours};

/// Error type for a training run.
#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("Preprocessing failed: {0}")]
    Preprocess(#[from] PreprocessError),

    #[error("Rebalancing removed one outcome class entirely")]
    RebalancedToSingleClass,

    #[error("Classifier fitting failed: {0}")]
    Gbdt(#[from] GbdtError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Full configuration for one training run.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    pub dataset_path: PathBuf,
    pub label_column: String,
    pub output_path: PathBuf,
    pub enn_neighbors: usize,
    pub smote_neighbors: usize,
    pub smote_m_neighbors: usize,
    pub seed: u64,
    pub gbdt: GbdtParams,
    /// Feature columns to one-hot encode even when their cells are numeric.
    pub categorical_columns: Vec<String>,
}

impl TrainingConfig {
    pub fn new(dataset_path: PathBuf, output_path: PathBuf) -> Self {
        Self {
            dataset_path,
            label_column: DEFAULT_LABEL_COLUMN.to_string(),
            output_path,
            enn_neighbors: 3,
            smote_neighbors: 5,
            smote_m_neighbors: 10,
            seed: 2025,
            gbdt: GbdtParams::default(),
            categorical_columns: Vec::new(),
        }
    }
}

/// Run the pipeline end to end and write the artifact.
///
/// # Errors
/// Returns error if any stage fails; no artifact is written on failure.
pub fn run(config: &TrainingConfig) -> Result<ModelArtifact, TrainError> {
    let feature_names: Vec<String> = FEATURE_NAMES.iter().map(|s| s.to_string()).collect();

    tracing::info!("Starting training run (seed {})", config.seed);
    let dataset = Dataset::from_csv(&config.dataset_path, &feature_names, &config.label_column)?;

    let kinds = dataset.column_kinds(&config.categorical_columns);
    let preprocess = Preprocessor::fit(&dataset.columns(&kinds))?;
    let x = preprocess.transform_matrix(dataset.rows())?;
    let y = dataset.labels().to_vec();
    log_balance("after preprocessing", &y);

    let enn = EditedNearestNeighbours {
        n_neighbors: config.enn_neighbors,
    };
    let (x, y) = enn.fit_resample(&x, &y);
    log_balance("after neighborhood cleaning", &y);
    ensure_both_classes(&y)?;

    let mut rng = ChaCha20Rng::seed_from_u64(config.seed);
    let smote = BorderlineSmote {
        k_neighbors: config.smote_neighbors,
        m_neighbors: config.smote_m_neighbors,
    };
    let (x, y) = smote.fit_resample(&x, &y, &mut rng);
    log_balance("after oversampling", &y);

    let mut gbdt_params = config.gbdt.clone();
    gbdt_params.seed = config.seed;
    let clf = GradientBoostedTrees::fit(&x, &y, &gbdt_params)?;
    tracing::info!("Fitted {} trees over {} encoded features", clf.n_trees(), clf.n_features());

    let artifact = ModelArtifact::new(preprocess, clf, feature_names)?;
    artifact.save(&config.output_path)?;
    Ok(artifact)
}

fn log_balance(stage: &str, y: &[f64]) {
    let positives = y.iter().filter(|&&v| v == 1.0).count();
    tracing::info!(
        "Class balance {stage}: {} resistant / {} susceptible",
        positives,
        y.len() - positives
    );
}

fn ensure_both_classes(y: &[f64]) -> Result<(), TrainError> {
    let positives = y.iter().filter(|&&v| v == 1.0).count();
    if positives == 0 || positives == y.len() {
        return Err(TrainError::RebalancedToSingleClass);
    }
    Ok(())
}
