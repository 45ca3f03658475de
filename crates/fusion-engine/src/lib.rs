//! Fusion Engine
//!
//! The onboard detection loop: once per polling period it reads both
//! sensors, evaluates the calibrated light threshold and the shake window,
//! fuses the two signals with a logical OR, steps the alert state machine,
//! drives the actuators, and publishes a consistent snapshot to the status
//! board. Sensor and actuator faults are contained inside the cycle; only a
//! broken status board stops the loop.

pub mod engine;

pub use engine::{AlertPhase, FusionEngine};

use shake_detector::ShakeConfig;
use std::time::Duration;
use tamper_state::StateError;
use thiserror::Error;

/// Engine error types
///
/// Everything transient is handled inside the cycle; what escapes here is
/// fatal by design.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Shared state is unusable, which indicates a concurrency bug
    #[error(transparent)]
    State(#[from] StateError),
}

/// Detection loop configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Calibrated light decision boundary (V); anomalous iff strictly above
    pub light_threshold: f64,
    /// Fixed polling period of the detection loop
    pub poll_period: Duration,
    /// Trailing-mean window for the light sensor; 1 disables smoothing
    pub smoothing_window: usize,
    /// Shake window parameters
    pub shake: ShakeConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // Placeholder boundary; deployments load the calibrated model
            light_threshold: 0.5,
            poll_period: Duration::from_millis(20),
            smoothing_window: 1,
            shake: ShakeConfig::default(),
        }
    }
}
