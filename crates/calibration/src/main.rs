//! Threshold Calibration CLI

use anyhow::Context;
use calibration::{dataset, grid_search, ThresholdModel, DEFAULT_FOLDS};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "calibrate",
    about = "Light-threshold calibration via grid search with k-fold cross-validation"
)]
struct Args {
    /// Labeled dataset CSV with `light` and `label` columns
    #[arg(long)]
    input: PathBuf,

    /// Number of cross-validation folds
    #[arg(long, default_value_t = DEFAULT_FOLDS)]
    folds: usize,

    /// Where to write the threshold model JSON
    #[arg(long, default_value = "model.json")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let report = dataset::load_csv_path(&args.input)
        .with_context(|| format!("loading {}", args.input.display()))?;
    if report.skipped_rows > 0 {
        warn!("skipped {} malformed rows", report.skipped_rows);
    }
    info!(
        "{} samples ({} normal, {} anomaly)",
        report.samples.len(),
        report.negatives(),
        report.positives()
    );

    let result = grid_search(&report.samples, args.folds)?;
    info!(
        "cross-validated metrics: mean F1 {:.4}, per-fold {:?}",
        result.mean_f1, result.per_fold_f1
    );
    info!("full-dataset accuracy: {:.4}", result.accuracy);

    let model = ThresholdModel::from_result(
        &result,
        args.folds,
        report.samples.len(),
        report.skipped_rows,
    );
    model.save(&args.output)?;

    Ok(())
}
