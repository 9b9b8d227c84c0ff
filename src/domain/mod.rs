//! Domain layer: Core business types and logic.
//!
//! This module contains pure Rust types with no external dependencies.
//! All types are serializable and implement strict validation.

mod assessment;
mod patient;

pub use assessment::{Assessment, AssessmentResult, RiskLevel};
pub use patient::{BinaryAnswer, PatientIndicators, FEATURE_NAMES, NUM_FEATURES};
