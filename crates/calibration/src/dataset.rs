//! Labeled Dataset Loading

use crate::CalibrationError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// A single labeled light reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSample {
    /// Photocell voltage (V)
    pub light_value: f64,
    /// True when the sample was captured under tampering
    pub label: bool,
}

/// Outcome of loading a dataset
///
/// Rows that could not be parsed are counted, never silently dropped.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub samples: Vec<CalibrationSample>,
    /// Rows skipped due to missing or non-numeric fields
    pub skipped_rows: usize,
}

impl LoadReport {
    /// Number of anomaly-labeled samples
    pub fn positives(&self) -> usize {
        self.samples.iter().filter(|s| s.label).count()
    }

    /// Number of normal-labeled samples
    pub fn negatives(&self) -> usize {
        self.samples.len() - self.positives()
    }
}

/// Load a dataset from a CSV file
pub fn load_csv_path(path: &Path) -> Result<LoadReport, CalibrationError> {
    let file = File::open(path)?;
    let report = load_csv(file)?;
    info!(
        "loaded {} samples from {} ({} rows skipped)",
        report.samples.len(),
        path.display(),
        report.skipped_rows
    );
    Ok(report)
}

/// Load a dataset from CSV data
///
/// Expects a header row with a `light` (or `light_value`) column and a
/// `label` column. Labels may be `0`/`1` or `normal`/`anomaly`.
pub fn load_csv<R: Read>(reader: R) -> Result<LoadReport, CalibrationError> {
    let mut rdr = csv::Reader::from_reader(reader);

    let headers = rdr.headers()?.clone();
    let light_col = headers
        .iter()
        .position(|h| h == "light" || h == "light_value")
        .ok_or(CalibrationError::MissingColumn("light"))?;
    let label_col = headers
        .iter()
        .position(|h| h == "label")
        .ok_or(CalibrationError::MissingColumn("label"))?;

    let mut samples = Vec::new();
    let mut skipped_rows = 0usize;

    for result in rdr.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                debug!("skipping unreadable row: {}", e);
                skipped_rows += 1;
                continue;
            }
        };

        let light_value = record
            .get(light_col)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite());
        let label = record.get(label_col).and_then(parse_label);

        match (light_value, label) {
            (Some(light_value), Some(label)) => {
                samples.push(CalibrationSample { light_value, label })
            }
            _ => skipped_rows += 1,
        }
    }

    Ok(LoadReport {
        samples,
        skipped_rows,
    })
}

fn parse_label(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "anomaly" => Some(true),
        "0" | "normal" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD_CSV: &str = "light,label\n0.10,0\n0.50,anomaly\n0.20,normal\n0.60,1\n";

    #[test]
    fn test_load_valid_rows() {
        let report = load_csv(GOOD_CSV.as_bytes()).unwrap();
        assert_eq!(report.samples.len(), 4);
        assert_eq!(report.skipped_rows, 0);
        assert_eq!(report.positives(), 2);
        assert_eq!(report.negatives(), 2);
        assert_eq!(report.samples[0].light_value, 0.10);
        assert!(!report.samples[0].label);
        assert!(report.samples[1].label);
    }

    #[test]
    fn test_malformed_rows_are_counted_not_dropped_silently() {
        let csv = "light,label\n0.10,0\noops,1\n0.30,\n0.20,normal\n0.40,maybe\n";
        let report = load_csv(csv.as_bytes()).unwrap();
        assert_eq!(report.samples.len(), 2);
        assert_eq!(report.skipped_rows, 3);
    }

    #[test]
    fn test_light_value_header_alias() {
        let csv = "light_value,label\n0.25,1\n";
        let report = load_csv(csv.as_bytes()).unwrap();
        assert_eq!(report.samples.len(), 1);
        assert!(report.samples[0].label);
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let csv = "voltage,label\n0.25,1\n";
        assert!(matches!(
            load_csv(csv.as_bytes()),
            Err(CalibrationError::MissingColumn("light"))
        ));
    }

    #[test]
    fn test_non_finite_values_skipped() {
        let csv = "light,label\nNaN,0\ninf,1\n0.30,0\n";
        let report = load_csv(csv.as_bytes()).unwrap();
        assert_eq!(report.samples.len(), 1);
        assert_eq!(report.skipped_rows, 2);
    }
}
