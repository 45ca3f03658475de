//! Shared System State / Control Plane
//!
//! The `StatusBoard` is the single synchronization point between the fusion
//! engine (writer-of-record) and the monitoring interface (readers plus the
//! narrow kill-switch/counter-reset write path). Every access is a short
//! bounded critical section, so the detection loop never waits on a slow
//! reader and readers never observe a half-written snapshot.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{info, warn};

/// Bounded length of the recent-alert log
const MAX_RECENT_ALERTS: usize = 32;

/// Shared-state error types
///
/// A poisoned lock means a holder panicked mid-update; that is a concurrency
/// bug, not a recoverable condition, and callers treat it as fatal.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("status board lock poisoned")]
    Poisoned,
}

/// What pushed the alert machine into `Alerting`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertCause {
    Light,
    Shake,
    Both,
}

/// One `Idle -> Alerting` edge, kept for counting and display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertEvent {
    /// Wall-clock time of the transition (ms since the Unix epoch)
    pub timestamp_ms: u64,
    pub cause: AlertCause,
}

impl AlertEvent {
    pub fn now(cause: AlertCause) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            timestamp_ms,
            cause,
        }
    }
}

/// Full snapshot published once per detection cycle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemState {
    /// Latest (possibly smoothed) light voltage (V)
    pub light_voltage: f64,
    /// Latest tilt switch state
    pub tilt_state: bool,
    /// Light exceeded the calibrated threshold this cycle
    pub light_anomaly: bool,
    /// Shake window met the change-count threshold this cycle
    pub shake_anomaly: bool,
    /// `light_anomaly OR shake_anomaly`
    pub is_anomaly: bool,
    /// Alert machine is in `Alerting` and actuators are driven
    pub alert_active: bool,
    /// Remote kill switch state as of this cycle
    pub kill_switch_engaged: bool,
    /// Tilt transitions currently inside the shake window
    pub changes_in_window: usize,
    /// Light reading was carried over after a read fault
    pub light_stale: bool,
    /// Tilt reading was carried over after a read fault
    pub tilt_stale: bool,
    /// `Idle -> Alerting` transitions since start (or last reset)
    pub anomaly_count: u64,
    /// Cycles where the light threshold was exceeded
    pub light_anomalies: u64,
    /// Cycles where the shake window was anomalous
    pub shake_anomalies: u64,
    /// Total detection cycles completed
    pub total_readings: u64,
    /// Consecutive cycles with at least one sensor fault
    pub consecutive_faults: u32,
}

/// Concurrency-safe holder of the current `SystemState`
///
/// The kill switch lives in an atomic beside the snapshot mutex so the
/// detection loop can poll it without taking the lock; it is folded into
/// the published snapshot on the next cycle.
#[derive(Debug, Default)]
pub struct StatusBoard {
    state: Mutex<SystemState>,
    kill_switch: AtomicBool,
    recent_alerts: Mutex<VecDeque<AlertEvent>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fully consistent snapshot of the current state
    pub fn snapshot(&self) -> Result<SystemState, StateError> {
        Ok(self.state.lock().map_err(|_| StateError::Poisoned)?.clone())
    }

    /// Apply one cycle's update to the snapshot in a single critical section
    pub fn publish<F>(&self, update: F) -> Result<(), StateError>
    where
        F: FnOnce(&mut SystemState),
    {
        let mut state = self.state.lock().map_err(|_| StateError::Poisoned)?;
        update(&mut state);
        Ok(())
    }

    /// Current kill switch position; lock-free
    pub fn kill_switch_engaged(&self) -> bool {
        self.kill_switch.load(Ordering::SeqCst)
    }

    /// Engage or release the kill switch; idempotent, observed by the
    /// detection loop no later than its next cycle
    pub fn set_kill_switch(&self, engaged: bool) {
        let previous = self.kill_switch.swap(engaged, Ordering::SeqCst);
        if previous != engaged {
            if engaged {
                warn!("kill switch ENGAGED: actuation suppressed, detection continues");
            } else {
                info!("kill switch released");
            }
        }
    }

    /// Zero the anomaly counters without touching the live alert state
    pub fn reset_counters(&self) -> Result<(), StateError> {
        let mut state = self.state.lock().map_err(|_| StateError::Poisoned)?;
        state.anomaly_count = 0;
        state.light_anomalies = 0;
        state.shake_anomalies = 0;
        state.total_readings = 0;
        info!("anomaly counters reset");
        Ok(())
    }

    /// Record an `Idle -> Alerting` edge
    pub fn record_alert(&self, event: AlertEvent) -> Result<(), StateError> {
        let mut alerts = self
            .recent_alerts
            .lock()
            .map_err(|_| StateError::Poisoned)?;
        if alerts.len() == MAX_RECENT_ALERTS {
            alerts.pop_front();
        }
        alerts.push_back(event);
        Ok(())
    }

    /// Recent alert events, oldest first
    pub fn recent_alerts(&self) -> Result<Vec<AlertEvent>, StateError> {
        Ok(self
            .recent_alerts
            .lock()
            .map_err(|_| StateError::Poisoned)?
            .iter()
            .copied()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_snapshot_starts_idle() {
        let board = StatusBoard::new();
        let state = board.snapshot().unwrap();
        assert_eq!(state, SystemState::default());
        assert!(!state.alert_active);
        assert_eq!(state.anomaly_count, 0);
    }

    #[test]
    fn test_publish_then_snapshot() {
        let board = StatusBoard::new();
        board
            .publish(|state| {
                state.light_voltage = 0.42;
                state.light_anomaly = true;
                state.is_anomaly = true;
                state.anomaly_count += 1;
            })
            .unwrap();

        let state = board.snapshot().unwrap();
        assert_eq!(state.light_voltage, 0.42);
        assert!(state.is_anomaly);
        assert_eq!(state.anomaly_count, 1);
    }

    #[test]
    fn test_kill_switch_is_idempotent() {
        let board = StatusBoard::new();
        assert!(!board.kill_switch_engaged());
        board.set_kill_switch(true);
        board.set_kill_switch(true);
        assert!(board.kill_switch_engaged());
        board.set_kill_switch(false);
        assert!(!board.kill_switch_engaged());
    }

    #[test]
    fn test_reset_counters_preserves_alert_state() {
        let board = StatusBoard::new();
        board
            .publish(|state| {
                state.alert_active = true;
                state.is_anomaly = true;
                state.anomaly_count = 5;
                state.light_anomalies = 3;
                state.shake_anomalies = 2;
                state.total_readings = 100;
            })
            .unwrap();

        board.reset_counters().unwrap();

        let state = board.snapshot().unwrap();
        assert_eq!(state.anomaly_count, 0);
        assert_eq!(state.light_anomalies, 0);
        assert_eq!(state.shake_anomalies, 0);
        assert_eq!(state.total_readings, 0);
        assert!(state.alert_active);
        assert!(state.is_anomaly);
    }

    #[test]
    fn test_recent_alerts_are_bounded() {
        let board = StatusBoard::new();
        for _ in 0..(MAX_RECENT_ALERTS + 10) {
            board.record_alert(AlertEvent::now(AlertCause::Light)).unwrap();
        }
        assert_eq!(board.recent_alerts().unwrap().len(), MAX_RECENT_ALERTS);
    }

    #[test]
    fn test_concurrent_readers_see_whole_snapshots() {
        // Writer flips every field between two self-consistent states;
        // readers must never observe a mix of the two
        let board = Arc::new(StatusBoard::new());
        let writer_board = board.clone();

        let writer = std::thread::spawn(move || {
            for i in 0..1000u64 {
                let anomalous = i % 2 == 0;
                writer_board
                    .publish(|state| {
                        state.light_anomaly = anomalous;
                        state.shake_anomaly = anomalous;
                        state.is_anomaly = anomalous;
                        state.anomaly_count = i;
                        state.total_readings = i;
                    })
                    .unwrap();
            }
        });

        for _ in 0..1000 {
            let state = board.snapshot().unwrap();
            assert_eq!(state.light_anomaly, state.is_anomaly);
            assert_eq!(state.shake_anomaly, state.is_anomaly);
            assert_eq!(state.anomaly_count, state.total_readings);
        }

        writer.join().unwrap();
    }
}
