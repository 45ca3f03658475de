//! Detection Loop Implementation

use crate::{EngineConfig, EngineError};
use sensor_io::{AlertSink, LightSensor, MovingAverage, TiltSensor};
use shake_detector::ShakeDetector;
use std::sync::Arc;
use std::time::Instant;
use tamper_state::{AlertCause, AlertEvent, StatusBoard};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Alert state machine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertPhase {
    #[default]
    Idle,
    Alerting,
}

/// The per-cycle detection engine
///
/// Owns the sensors, the shake detector, and the alert machine; shares only
/// the status board with the rest of the system.
pub struct FusionEngine {
    config: EngineConfig,
    light: Box<dyn LightSensor>,
    tilt: Box<dyn TiltSensor>,
    sink: Box<dyn AlertSink>,
    board: Arc<StatusBoard>,
    shake: ShakeDetector,
    smoothing: MovingAverage,
    phase: AlertPhase,
    last_light: f64,
    last_tilt: bool,
}

impl FusionEngine {
    pub fn new(
        config: EngineConfig,
        light: Box<dyn LightSensor>,
        tilt: Box<dyn TiltSensor>,
        sink: Box<dyn AlertSink>,
        board: Arc<StatusBoard>,
    ) -> Self {
        info!(
            "fusion engine: threshold {:.6} V, poll period {:?}, shake {} changes in {:?}",
            config.light_threshold,
            config.poll_period,
            config.shake.change_threshold,
            config.shake.window
        );
        Self {
            shake: ShakeDetector::new(config.shake.clone()),
            smoothing: MovingAverage::new(config.smoothing_window),
            light,
            tilt,
            sink,
            board,
            phase: AlertPhase::default(),
            last_light: 0.0,
            last_tilt: false,
            config,
        }
    }

    /// Current alert machine phase
    pub fn phase(&self) -> AlertPhase {
        self.phase
    }

    /// Run one detection cycle at `now`
    ///
    /// Bounded regardless of monitoring load: the only shared access is the
    /// status board's short critical section.
    pub fn tick(&mut self, now: Instant) -> Result<(), EngineError> {
        // Sensor reads; a fault reuses the last known-good value and flags
        // the sample as stale rather than aborting the cycle
        let (raw_light, light_stale) = match self.light.read_voltage() {
            Ok(v) => {
                self.last_light = v;
                (v, false)
            }
            Err(e) => {
                warn!("light read failed, reusing last value: {}", e);
                (self.last_light, true)
            }
        };
        let (tilt, tilt_stale) = match self.tilt.read_state() {
            Ok(v) => {
                self.last_tilt = v;
                (v, false)
            }
            Err(e) => {
                warn!("tilt read failed, reusing last value: {}", e);
                (self.last_tilt, true)
            }
        };

        let light_voltage = self.smoothing.filter(raw_light);
        let light_anomaly = light_voltage > self.config.light_threshold;
        let shake_anomaly = self.shake.observe(tilt, now);
        let changes_in_window = self.shake.changes_in_window();
        let is_anomaly = light_anomaly || shake_anomaly;

        let kill_engaged = self.board.kill_switch_engaged();

        // Alert state machine. Non-latching: the alert clears as soon as
        // the fused condition does. The kill switch cancels actuation only;
        // anomaly signals keep being computed and published.
        let mut raised: Option<AlertEvent> = None;
        match self.phase {
            AlertPhase::Idle => {
                if is_anomaly && !kill_engaged {
                    self.phase = AlertPhase::Alerting;
                    let cause = match (light_anomaly, shake_anomaly) {
                        (true, true) => AlertCause::Both,
                        (true, false) => AlertCause::Light,
                        _ => AlertCause::Shake,
                    };
                    info!("alert raised ({:?})", cause);
                    raised = Some(AlertEvent::now(cause));
                }
            }
            AlertPhase::Alerting => {
                if !is_anomaly {
                    info!("alert cleared");
                    self.phase = AlertPhase::Idle;
                } else if kill_engaged {
                    info!("alert suppressed by kill switch");
                    self.phase = AlertPhase::Idle;
                }
            }
        }
        let alert_active = self.phase == AlertPhase::Alerting;

        // Actuation faults are logged and never block the next cycle
        if let Err(e) = self.sink.set_active(alert_active) {
            warn!("actuation failed: {}", e);
        }

        let stale = light_stale || tilt_stale;
        self.board.publish(|state| {
            state.light_voltage = light_voltage;
            state.tilt_state = tilt;
            state.light_anomaly = light_anomaly;
            state.shake_anomaly = shake_anomaly;
            state.is_anomaly = is_anomaly;
            state.alert_active = alert_active;
            state.kill_switch_engaged = kill_engaged;
            state.changes_in_window = changes_in_window;
            state.light_stale = light_stale;
            state.tilt_stale = tilt_stale;
            state.total_readings += 1;
            if light_anomaly {
                state.light_anomalies += 1;
            }
            if shake_anomaly {
                state.shake_anomalies += 1;
            }
            if raised.is_some() {
                state.anomaly_count += 1;
            }
            state.consecutive_faults = if stale {
                state.consecutive_faults + 1
            } else {
                0
            };
        })?;

        if let Some(event) = raised {
            self.board.record_alert(event)?;
        }

        debug!(
            "cycle: light {:.3} V anomaly={} shake={} alert={}",
            light_voltage, light_anomaly, shake_anomaly, alert_active
        );
        Ok(())
    }

    /// Run the detection loop forever at the configured polling period
    ///
    /// Never blocks on anything but the next tick; a `StateError` is a
    /// fatal invariant violation and the only way out.
    pub async fn run(mut self) -> Result<(), EngineError> {
        info!("starting detection loop");
        let mut ticker = tokio::time::interval(self.config.poll_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            self.tick(Instant::now())?;
        }
    }
}
