//! Simulated Sensor Drivers
//!
//! Scripted drivers replay a fixed sequence of readings (repeating the last
//! one once exhausted) and can inject faults at chosen positions. Constant
//! drivers report a fixed value forever, which is enough for a bench setup
//! with no hardware attached.

use crate::{LightSensor, SensorError, TiltSensor};

/// Light sensor that replays a scripted voltage sequence
#[derive(Debug)]
pub struct ScriptedLightSensor {
    readings: Vec<Result<f64, ()>>,
    position: usize,
}

impl ScriptedLightSensor {
    pub fn new(readings: Vec<f64>) -> Self {
        Self {
            readings: readings.into_iter().map(Ok).collect(),
            position: 0,
        }
    }

    /// Script with faults: `None` entries fail the read
    pub fn with_faults(readings: Vec<Option<f64>>) -> Self {
        Self {
            readings: readings.into_iter().map(|r| r.ok_or(())).collect(),
            position: 0,
        }
    }
}

impl LightSensor for ScriptedLightSensor {
    fn read_voltage(&mut self) -> Result<f64, SensorError> {
        let idx = self.position.min(self.readings.len().saturating_sub(1));
        self.position += 1;
        match self.readings.get(idx) {
            Some(Ok(v)) => Ok(*v),
            _ => Err(SensorError::Light("scripted fault".into())),
        }
    }
}

/// Tilt sensor that replays a scripted state sequence
#[derive(Debug)]
pub struct ScriptedTiltSensor {
    readings: Vec<Result<bool, ()>>,
    position: usize,
}

impl ScriptedTiltSensor {
    pub fn new(readings: Vec<bool>) -> Self {
        Self {
            readings: readings.into_iter().map(Ok).collect(),
            position: 0,
        }
    }

    /// Script with faults: `None` entries fail the read
    pub fn with_faults(readings: Vec<Option<bool>>) -> Self {
        Self {
            readings: readings.into_iter().map(|r| r.ok_or(())).collect(),
            position: 0,
        }
    }
}

impl TiltSensor for ScriptedTiltSensor {
    fn read_state(&mut self) -> Result<bool, SensorError> {
        let idx = self.position.min(self.readings.len().saturating_sub(1));
        self.position += 1;
        match self.readings.get(idx) {
            Some(Ok(v)) => Ok(*v),
            _ => Err(SensorError::Tilt("scripted fault".into())),
        }
    }
}

/// Light sensor that always reads the same voltage
#[derive(Debug, Clone, Copy)]
pub struct ConstantLightSensor(pub f64);

impl LightSensor for ConstantLightSensor {
    fn read_voltage(&mut self) -> Result<f64, SensorError> {
        Ok(self.0)
    }
}

/// Tilt sensor that always reads the same state
#[derive(Debug, Clone, Copy)]
pub struct ConstantTiltSensor(pub bool);

impl TiltSensor for ConstantTiltSensor {
    fn read_state(&mut self) -> Result<bool, SensorError> {
        Ok(self.0)
    }
}
