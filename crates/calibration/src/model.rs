//! Persisted Threshold Model

use crate::search::ThresholdResult;
use crate::CalibrationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::info;

/// Calibration output consumed by the fusion engine at startup
///
/// Produced once offline, read-only at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdModel {
    /// Decision boundary (V); a reading is anomalous iff it exceeds this
    pub threshold: f64,
    /// Mean held-out F1 across folds
    pub mean_f1: f64,
    /// Held-out F1 per fold
    pub per_fold_f1: Vec<f64>,
    /// Accuracy on the full dataset
    pub accuracy: f64,
    /// Number of cross-validation folds used
    pub folds: usize,
    /// Number of samples the model was calibrated on
    pub samples: usize,
    /// Malformed rows skipped while loading the dataset
    pub skipped_rows: usize,
    /// When the calibration run completed
    pub trained_at: DateTime<Utc>,
}

impl ThresholdModel {
    pub fn from_result(
        result: &ThresholdResult,
        folds: usize,
        samples: usize,
        skipped_rows: usize,
    ) -> Self {
        Self {
            threshold: result.threshold,
            mean_f1: result.mean_f1,
            per_fold_f1: result.per_fold_f1.clone(),
            accuracy: result.accuracy,
            folds,
            samples,
            skipped_rows,
            trained_at: Utc::now(),
        }
    }

    /// Write the model as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<(), CalibrationError> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        info!("threshold model written to {}", path.display());
        Ok(())
    }

    /// Load a previously saved model
    pub fn load(path: &Path) -> Result<Self, CalibrationError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_json_round_trip() {
        let result = ThresholdResult {
            threshold: 0.495627,
            mean_f1: 0.97,
            per_fold_f1: vec![0.95, 0.99, 0.97],
            accuracy: 0.96,
        };
        let model = ThresholdModel::from_result(&result, 3, 120, 2);

        let json = serde_json::to_string(&model).unwrap();
        let decoded: ThresholdModel = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded.threshold, model.threshold);
        assert_eq!(decoded.per_fold_f1, model.per_fold_f1);
        assert_eq!(decoded.folds, 3);
        assert_eq!(decoded.samples, 120);
        assert_eq!(decoded.skipped_rows, 2);
    }
}
