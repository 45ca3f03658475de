//! Runtime Settings
//!
//! Layered configuration: built-in defaults, then an optional TOML file,
//! then `TAMPER_*` environment variables.

use config::{Config, ConfigError, Environment, File};
use fusion_engine::EngineConfig;
use serde::{Deserialize, Serialize};
use shake_detector::ShakeConfig;
use std::path::Path;
use std::time::Duration;

/// Runtime parameters (configuration, not code)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Address the monitoring server binds to
    pub listen: String,
    /// Detection loop polling period (ms)
    pub poll_period_ms: u64,
    /// Trailing-mean window for the light sensor; 1 disables smoothing
    pub smoothing_window: usize,
    /// Shake window duration (ms)
    pub shake_window_ms: u64,
    /// Minimum spacing between accepted tilt transitions (ms)
    pub shake_debounce_ms: u64,
    /// Transition count at or above which the window is anomalous
    pub shake_change_threshold: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8080".to_string(),
            poll_period_ms: 20,
            smoothing_window: 1,
            shake_window_ms: 2000,
            shake_debounce_ms: 30,
            shake_change_threshold: 3,
        }
    }
}

impl Settings {
    /// Load settings: defaults, optional file, then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        builder
            .add_source(Environment::with_prefix("TAMPER"))
            .build()?
            .try_deserialize()
    }

    /// Engine configuration for a given calibrated threshold
    pub fn engine_config(&self, light_threshold: f64) -> EngineConfig {
        EngineConfig {
            light_threshold,
            poll_period: Duration::from_millis(self.poll_period_ms),
            smoothing_window: self.smoothing_window.max(1),
            shake: ShakeConfig {
                window: Duration::from_millis(self.shake_window_ms),
                debounce: Duration::from_millis(self.shake_debounce_ms),
                change_threshold: self.shake_change_threshold,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameters() {
        let settings = Settings::default();
        assert_eq!(settings.poll_period_ms, 20);
        assert_eq!(settings.shake_window_ms, 2000);
        assert_eq!(settings.shake_debounce_ms, 30);
        assert_eq!(settings.shake_change_threshold, 3);
        assert_eq!(settings.smoothing_window, 1);
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.listen, "0.0.0.0:8080");
        assert_eq!(settings.poll_period_ms, 20);
    }

    #[test]
    fn test_engine_config_carries_threshold_and_timing() {
        let settings = Settings {
            poll_period_ms: 50,
            shake_change_threshold: 5,
            ..Settings::default()
        };
        let engine = settings.engine_config(0.495627);
        assert_eq!(engine.light_threshold, 0.495627);
        assert_eq!(engine.poll_period, Duration::from_millis(50));
        assert_eq!(engine.shake.change_threshold, 5);
    }

    #[test]
    fn test_zero_smoothing_window_is_clamped() {
        let settings = Settings {
            smoothing_window: 0,
            ..Settings::default()
        };
        assert_eq!(settings.engine_config(0.5).smoothing_window, 1);
    }
}
