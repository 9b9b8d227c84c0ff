//! # crkp-risk
//!
//! Clinical-decision-support demo for carbapenem-resistant Klebsiella
//! pneumoniae (CRKP) risk assessment.
//!
//! This crate provides:
//! - An offline training pipeline: CSV dataset -> preprocessing ->
//!   class rebalancing -> gradient-boosted trees -> model artifact
//! - A terminal form that collects 12 patient indicators and returns the
//!   predicted resistance probability
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (patient indicators, assessments)
//! - `ports`: Trait definition for the model boundary
//! - `model`: Fitted preprocessing transform, classifier, artifact file
//! - `training`: Offline pipeline that produces the artifact
//! - `application`: Use cases orchestrating domain and ports
//! - `tui`: Terminal user interface

pub mod application;
pub mod domain;
pub mod model;
pub mod ports;
pub mod training;
pub mod tui;

pub use domain::{Assessment, PatientIndicators, RiskLevel};

/// Result type for crkp-risk operations
pub type Result<T> = std::result::Result<T, CrkpError>;

/// Main error type for crkp-risk
#[derive(Debug, thiserror::Error)]
pub enum CrkpError {
    #[error("Model artifact error: {0}")]
    Artifact(#[from] model::ArtifactError),

    #[error("Dataset error: {0}")]
    Dataset(#[from] training::DatasetError),

    #[error("Training failed: {0}")]
    Training(#[from] training::TrainError),

    #[error("Invalid patient data: {0}")]
    Validation(String),

    #[error("Prediction failed: {0}")]
    Prediction(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
