//! Model layer: the fitted preprocessing transform, the gradient-boosted
//! tree classifier, and the artifact file that bundles them.

mod artifact;
mod gbdt;
mod preprocess;

pub use artifact::{ArtifactError, ModelArtifact};
pub use gbdt::{GbdtError, GbdtParams, GradientBoostedTrees};
pub use preprocess::{ColumnKind, ColumnTransform, PreprocessError, Preprocessor};
