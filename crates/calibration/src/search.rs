//! Grid Search with Stratified K-Fold Cross-Validation

use crate::dataset::CalibrationSample;
use crate::folds::stratified_folds;
use crate::metrics::Confusion;
use crate::CalibrationError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Default number of cross-validation folds
pub const DEFAULT_FOLDS: usize = 5;

/// Distinct observed values are evenly subsampled above this bound,
/// always keeping the extremes so the optimum stays reachable.
const MAX_CANDIDATES: usize = 256;

/// Outcome of a calibration run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdResult {
    /// Selected decision boundary (V); a reading is anomalous iff it
    /// strictly exceeds this value
    pub threshold: f64,
    /// Mean held-out F1 across folds at the selected threshold
    pub mean_f1: f64,
    /// Held-out F1 per fold at the selected threshold
    pub per_fold_f1: Vec<f64>,
    /// Accuracy on the full dataset at the selected threshold
    pub accuracy: f64,
}

/// Build the candidate threshold grid from the observed values
pub fn candidate_grid(samples: &[CalibrationSample]) -> Vec<f64> {
    let mut values: Vec<f64> = samples.iter().map(|s| s.light_value).collect();
    values.sort_by(f64::total_cmp);
    values.dedup();

    if values.len() <= MAX_CANDIDATES {
        return values;
    }

    let last = values.len() - 1;
    let mut grid: Vec<f64> = (0..MAX_CANDIDATES)
        .map(|i| values[i * last / (MAX_CANDIDATES - 1)])
        .collect();
    grid.dedup();
    grid
}

/// Find the threshold with the best mean held-out F1
///
/// The decision rule `light > threshold` is parameter-free, so each
/// candidate is only evaluated, never trained: for every fold, the samples
/// held out of that fold are scored and the per-fold F1 scores averaged.
/// Candidates ascend, so keeping the first maximum resolves ties toward the
/// smallest threshold (the more conservative boundary).
pub fn grid_search(
    samples: &[CalibrationSample],
    k: usize,
) -> Result<ThresholdResult, CalibrationError> {
    validate(samples, k)?;

    let labels: Vec<bool> = samples.iter().map(|s| s.label).collect();
    let fold_of = stratified_folds(&labels, k);
    let candidates = candidate_grid(samples);
    info!(
        "grid search over {} candidates, {} folds, {} samples",
        candidates.len(),
        k,
        samples.len()
    );

    let mut best: Option<(f64, f64, Vec<f64>)> = None;
    for &candidate in &candidates {
        let mut per_fold = Vec::with_capacity(k);
        for fold in 0..k {
            let mut confusion = Confusion::default();
            for (idx, sample) in samples.iter().enumerate() {
                if fold_of[idx] != fold {
                    continue;
                }
                confusion.record(sample.light_value > candidate, sample.label);
            }
            per_fold.push(confusion.f1());
        }
        let mean_f1 = per_fold.iter().sum::<f64>() / k as f64;
        debug!("candidate {:.6} V: mean F1 {:.4}", candidate, mean_f1);

        let better = match &best {
            None => true,
            Some((best_f1, _, _)) => mean_f1 > *best_f1,
        };
        if better {
            best = Some((mean_f1, candidate, per_fold));
        }
    }

    // validate() guarantees a non-empty grid
    let (mean_f1, threshold, per_fold_f1) =
        best.ok_or(CalibrationError::EmptyDataset)?;

    // Aggregate accuracy on the full dataset, for reporting only
    let mut full = Confusion::default();
    for sample in samples {
        full.record(sample.light_value > threshold, sample.label);
    }

    info!(
        "selected threshold {:.6} V (mean F1 {:.4}, full-dataset accuracy {:.4})",
        threshold,
        mean_f1,
        full.accuracy()
    );

    Ok(ThresholdResult {
        threshold,
        mean_f1,
        per_fold_f1,
        accuracy: full.accuracy(),
    })
}

fn validate(samples: &[CalibrationSample], k: usize) -> Result<(), CalibrationError> {
    if samples.is_empty() {
        return Err(CalibrationError::EmptyDataset);
    }
    if k < 2 {
        return Err(CalibrationError::InvalidFoldCount(k));
    }
    if k > samples.len() {
        return Err(CalibrationError::TooFewSamples {
            folds: k,
            samples: samples.len(),
        });
    }
    let positives = samples.iter().filter(|s| s.label).count();
    if positives == 0 {
        return Err(CalibrationError::SingleClass("normal"));
    }
    if positives == samples.len() {
        return Err(CalibrationError::SingleClass("anomaly"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(light_value: f64, label: bool) -> CalibrationSample {
        CalibrationSample { light_value, label }
    }

    fn separable_dataset() -> Vec<CalibrationSample> {
        let mut samples = Vec::new();
        for &v in &[0.10, 0.12, 0.14, 0.16, 0.18, 0.20] {
            samples.push(sample(v, false));
        }
        for &v in &[0.50, 0.52, 0.54, 0.56, 0.58, 0.60] {
            samples.push(sample(v, true));
        }
        samples
    }

    #[test]
    fn test_separable_dataset_is_classified_perfectly() {
        let result = grid_search(&separable_dataset(), 3).unwrap();
        // Largest normal value is the smallest candidate with perfect F1
        assert_eq!(result.threshold, 0.20);
        assert_eq!(result.mean_f1, 1.0);
        assert_eq!(result.accuracy, 1.0);
        assert_eq!(result.per_fold_f1.len(), 3);
        assert!(result.per_fold_f1.iter().all(|&f1| f1 == 1.0));
    }

    #[test]
    fn test_mean_f1_is_arithmetic_mean_of_folds() {
        let result = grid_search(&separable_dataset(), 3).unwrap();
        let mean = result.per_fold_f1.iter().sum::<f64>() / result.per_fold_f1.len() as f64;
        assert!((result.mean_f1 - mean).abs() < 1e-12);
    }

    #[test]
    fn test_deterministic_across_runs() {
        let samples = separable_dataset();
        let first = grid_search(&samples, 4).unwrap();
        let second = grid_search(&samples, 4).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_tie_breaks_toward_smallest_threshold() {
        // Inverted classes: no threshold separates them, every candidate
        // scores F1 = 0, so the smallest must win
        let samples = vec![sample(0.1, true), sample(0.2, false)];
        let result = grid_search(&samples, 2).unwrap();
        assert_eq!(result.threshold, 0.1);
        assert_eq!(result.mean_f1, 0.0);
    }

    #[test]
    fn test_empty_dataset_rejected() {
        assert!(matches!(
            grid_search(&[], 5),
            Err(CalibrationError::EmptyDataset)
        ));
    }

    #[test]
    fn test_fold_count_exceeding_samples_rejected() {
        let samples = vec![sample(0.1, false), sample(0.5, true)];
        assert!(matches!(
            grid_search(&samples, 5),
            Err(CalibrationError::TooFewSamples { folds: 5, samples: 2 })
        ));
    }

    #[test]
    fn test_single_fold_rejected() {
        let samples = vec![sample(0.1, false), sample(0.5, true)];
        assert!(matches!(
            grid_search(&samples, 1),
            Err(CalibrationError::InvalidFoldCount(1))
        ));
    }

    #[test]
    fn test_single_class_rejected() {
        let normals = vec![sample(0.1, false), sample(0.2, false)];
        assert!(matches!(
            grid_search(&normals, 2),
            Err(CalibrationError::SingleClass("normal"))
        ));

        let anomalies = vec![sample(0.5, true), sample(0.6, true)];
        assert!(matches!(
            grid_search(&anomalies, 2),
            Err(CalibrationError::SingleClass("anomaly"))
        ));
    }

    #[test]
    fn test_candidate_grid_spans_full_range() {
        let samples: Vec<_> = (0..1000).map(|i| sample(i as f64 / 1000.0, i % 2 == 0)).collect();
        let grid = candidate_grid(&samples);
        assert!(grid.len() <= MAX_CANDIDATES);
        assert_eq!(grid.first().copied(), Some(0.0));
        assert_eq!(grid.last().copied(), Some(0.999));
    }

    #[test]
    fn test_candidate_grid_deduplicates() {
        let samples = vec![
            sample(0.1, false),
            sample(0.1, false),
            sample(0.5, true),
            sample(0.5, true),
        ];
        assert_eq!(candidate_grid(&samples), vec![0.1, 0.5]);
    }
}
