//! Tamper Sentinel - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, AppState, Settings};
use calibration::ThresholdModel;
use clap::Parser;
use fusion_engine::FusionEngine;
use sensor_io::{ConstantLightSensor, ConstantTiltSensor, LoggingAlertSink};
use std::path::PathBuf;
use std::sync::Arc;
use tamper_state::StatusBoard;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    name = "tamper-sentinel",
    about = "Enclosure tamper detection with a remote kill switch"
)]
struct Args {
    /// Calibrated threshold model JSON (output of `calibrate`)
    #[arg(long, default_value = "model.json")]
    model: PathBuf,

    /// Optional settings file (TOML)
    #[arg(long)]
    settings: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let args = Args::parse();
    let settings = Settings::load(args.settings.as_deref()).context("loading settings")?;
    let model = ThresholdModel::load(&args.model)
        .with_context(|| format!("loading model {}", args.model.display()))?;

    info!("=== Tamper Sentinel v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        "model: threshold {:.6} V, mean F1 {:.4}, trained {}",
        model.threshold, model.mean_f1, model.trained_at
    );

    let board = Arc::new(StatusBoard::new());

    // Bench drivers: constant dark reading, stationary tilt switch, alerts
    // to the log. Hardware deployments plug real drivers into these seams.
    let engine = FusionEngine::new(
        settings.engine_config(model.threshold),
        Box::new(ConstantLightSensor(0.0)),
        Box::new(ConstantTiltSensor(false)),
        Box::new(LoggingAlertSink::default()),
        board.clone(),
    );

    let detection = tokio::spawn(engine.run());
    let state = Arc::new(AppState::new(board, model));

    tokio::select! {
        result = detection => {
            error!("detection loop stopped unexpectedly");
            result??;
        }
        result = run_server(&settings, state) => {
            result?;
        }
    }

    Ok(())
}
