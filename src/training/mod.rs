//! Offline training: dataset loading, rebalancing, and pipeline orchestration.

pub mod dataset;
pub mod resample;
pub mod trainer;

pub use dataset::{Dataset, DatasetError, DEFAULT_LABEL_COLUMN};
pub use resample::{BorderlineSmote, EditedNearestNeighbours};
pub use trainer::{run, TrainError, TrainingConfig};
