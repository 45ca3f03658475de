//! Shake Window Detector
//!
//! Counts debounced tilt-switch state transitions inside a trailing time
//! window. A burst of transitions means the enclosure is being shaken or
//! moved; a transition count, unlike raw signal variance, is cheap enough
//! to evaluate on every poll and the window bounds both memory and how long
//! old activity keeps influencing the verdict.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::debug;

/// Shake detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShakeConfig {
    /// Trailing window over which transitions are counted
    pub window: Duration,
    /// Minimum spacing between two accepted transitions; filters electrical
    /// noise on the digital input, not genuine shaking
    pub debounce: Duration,
    /// Transition count at or above which the window is anomalous
    pub change_threshold: usize,
}

impl Default for ShakeConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(2),
            debounce: Duration::from_millis(30),
            change_threshold: 3,
        }
    }
}

/// Debounced sliding-window transition counter
///
/// Owns its transition log exclusively; callers only ever see the derived
/// count and verdict.
#[derive(Debug)]
pub struct ShakeDetector {
    config: ShakeConfig,
    last_state: Option<bool>,
    transitions: VecDeque<Instant>,
    last_transition: Option<Instant>,
}

impl ShakeDetector {
    pub fn new(config: ShakeConfig) -> Self {
        Self {
            config,
            last_state: None,
            transitions: VecDeque::new(),
            last_transition: None,
        }
    }

    /// Feed one tilt reading and get the shake verdict for `now`
    ///
    /// The first reading only seeds the tracked state; no transition is
    /// logged for it. A changed reading arriving within the debounce
    /// interval of the last recorded transition is discarded as noise.
    pub fn observe(&mut self, state: bool, now: Instant) -> bool {
        self.prune(now);

        match self.last_state {
            None => {
                self.last_state = Some(state);
            }
            Some(previous) if previous != state => {
                let debounced = self
                    .last_transition
                    .is_some_and(|last| now.duration_since(last) < self.config.debounce);
                if !debounced {
                    self.transitions.push_back(now);
                    self.last_transition = Some(now);
                    debug!(
                        "tilt transition recorded ({} in window)",
                        self.transitions.len()
                    );
                }
                self.last_state = Some(state);
            }
            Some(_) => {}
        }

        self.transitions.len() >= self.config.change_threshold
    }

    /// Transitions currently inside the window
    pub fn changes_in_window(&self) -> usize {
        self.transitions.len()
    }

    fn prune(&mut self, now: Instant) {
        // A transition stops counting once a full window has elapsed
        let horizon = self.config.window;
        while let Some(&oldest) = self.transitions.front() {
            if now.duration_since(oldest) >= horizon {
                self.transitions.pop_front();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector(threshold: usize) -> ShakeDetector {
        ShakeDetector::new(ShakeConfig {
            window: Duration::from_secs(2),
            debounce: Duration::from_millis(30),
            change_threshold: threshold,
        })
    }

    fn at(base: Instant, seconds: f64) -> Instant {
        base + Duration::from_secs_f64(seconds)
    }

    #[test]
    fn test_first_reading_seeds_state_without_transition() {
        let base = Instant::now();
        let mut d = detector(1);
        assert!(!d.observe(true, base));
        assert_eq!(d.changes_in_window(), 0);
    }

    #[test]
    fn test_spaced_transitions_trigger_shake() {
        // Transitions at 0.0, 0.5, 1.0, 1.4s: all spaced beyond debounce,
        // all inside the 2s window, count 4 >= 3
        let base = Instant::now();
        let mut d = detector(3);
        d.observe(false, base);
        d.observe(true, at(base, 0.0));
        d.observe(false, at(base, 0.5));
        d.observe(true, at(base, 1.0));
        let shaking = d.observe(false, at(base, 1.4));
        assert_eq!(d.changes_in_window(), 4);
        assert!(shaking);
    }

    #[test]
    fn test_threshold_met_exactly_is_anomalous() {
        let base = Instant::now();
        let mut d = detector(3);
        d.observe(false, base);
        d.observe(true, at(base, 0.1));
        d.observe(false, at(base, 0.2));
        let shaking = d.observe(true, at(base, 0.3));
        assert_eq!(d.changes_in_window(), 3);
        assert!(shaking);
    }

    #[test]
    fn test_debounce_discards_rapid_transition() {
        // Second change arrives 10ms after the first, inside the 30ms
        // debounce, and must be dropped as noise
        let base = Instant::now();
        let mut d = detector(2);
        d.observe(false, base);
        assert!(!d.observe(true, at(base, 0.0)));
        assert!(!d.observe(false, at(base, 0.01)));
        assert_eq!(d.changes_in_window(), 1);
    }

    #[test]
    fn test_window_pruning_ages_out_old_transitions() {
        let base = Instant::now();
        let mut d = detector(1);
        d.observe(false, base);
        d.observe(true, at(base, 0.0));
        assert_eq!(d.changes_in_window(), 1);

        // Same state, well past the window: the old transition ages out
        assert!(!d.observe(true, at(base, 2.5)));
        assert_eq!(d.changes_in_window(), 0);
    }

    #[test]
    fn test_unchanged_reading_records_nothing() {
        let base = Instant::now();
        let mut d = detector(1);
        d.observe(true, base);
        d.observe(true, at(base, 0.1));
        d.observe(true, at(base, 0.2));
        assert_eq!(d.changes_in_window(), 0);
    }

    #[test]
    fn test_debounce_applies_even_after_pruning() {
        // The debounce compares against the last recorded transition even
        // when that transition has already aged out of the window
        let base = Instant::now();
        let mut d = ShakeDetector::new(ShakeConfig {
            window: Duration::from_millis(50),
            debounce: Duration::from_millis(200),
            change_threshold: 1,
        });
        d.observe(false, base);
        d.observe(true, at(base, 0.0));
        // 100ms later: outside the 50ms window, inside the 200ms debounce
        assert!(!d.observe(false, at(base, 0.1)));
        assert_eq!(d.changes_in_window(), 0);
    }
}
