//! Sensor and Actuator Abstraction
//!
//! The fusion engine only sees the traits in this crate. Real ADC sampling
//! and GPIO toggling are external collaborators behind these seams; the
//! shipped implementations are simulated drivers for tests and bench runs.

pub mod sim;
pub mod smoothing;

pub use sim::{ConstantLightSensor, ConstantTiltSensor, ScriptedLightSensor, ScriptedTiltSensor};
pub use smoothing::MovingAverage;

use thiserror::Error;
use tracing::info;

/// Sensor error types
///
/// Transient by contract: the detection loop recovers by reusing the last
/// known-good value and flagging the sample as stale.
#[derive(Error, Debug)]
pub enum SensorError {
    #[error("light sensor read failed: {0}")]
    Light(String),

    #[error("tilt sensor read failed: {0}")]
    Tilt(String),
}

/// Actuation error types
#[derive(Error, Debug)]
pub enum ActuationError {
    #[error("failed to drive alert output: {0}")]
    Drive(String),
}

/// Ambient light sensor (photocell behind an ADC)
pub trait LightSensor: Send {
    /// Read the current voltage (V)
    fn read_voltage(&mut self) -> Result<f64, SensorError>;
}

/// Enclosure tilt switch (digital input)
pub trait TiltSensor: Send {
    /// Read the current switch state
    fn read_state(&mut self) -> Result<bool, SensorError>;
}

/// Alert actuator (buzzer and LED)
pub trait AlertSink: Send {
    /// Drive the actuators on or off; idempotent
    fn set_active(&mut self, active: bool) -> Result<(), ActuationError>;
}

/// Alert sink that only logs transitions, for headless deployments
#[derive(Debug, Default)]
pub struct LoggingAlertSink {
    active: bool,
}

impl AlertSink for LoggingAlertSink {
    fn set_active(&mut self, active: bool) -> Result<(), ActuationError> {
        if active != self.active {
            self.active = active;
            if active {
                info!("alert actuators ON");
            } else {
                info!("alert actuators OFF");
            }
        }
        Ok(())
    }
}
