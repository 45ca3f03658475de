//! Offline Threshold Calibration
//!
//! Converts a labeled dataset of light readings into a single scalar
//! decision threshold:
//! - CSV dataset loading with malformed-row accounting
//! - Deterministic stratified k-fold assignment
//! - Grid search over observed values, scored by held-out F1
//! - Persisted threshold model consumed by the fusion engine at startup

pub mod dataset;
pub mod folds;
pub mod metrics;
pub mod model;
pub mod search;

pub use dataset::{CalibrationSample, LoadReport};
pub use metrics::Confusion;
pub use model::ThresholdModel;
pub use search::{grid_search, ThresholdResult, DEFAULT_FOLDS};

use thiserror::Error;

/// Calibration error types
///
/// All of these are fatal to the offline run; none are retried.
#[derive(Error, Debug)]
pub enum CalibrationError {
    #[error("dataset is empty")]
    EmptyDataset,

    #[error("fold count must be at least 2, got {0}")]
    InvalidFoldCount(usize),

    #[error("fold count {folds} exceeds sample count {samples}")]
    TooFewSamples { folds: usize, samples: usize },

    #[error("dataset contains only the {0} class; both classes are required")]
    SingleClass(&'static str),

    #[error("dataset is missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse dataset: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to encode or decode model: {0}")]
    Model(#[from] serde_json::Error),
}
