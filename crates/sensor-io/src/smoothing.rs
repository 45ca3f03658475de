//! Trailing-Mean Smoothing for the Light Sensor

use std::collections::VecDeque;

/// Sliding-window moving average
///
/// Until the window fills, the mean of the samples seen so far is
/// returned. A window of 1 is a pass-through.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    window: VecDeque<f64>,
    size: usize,
}

impl MovingAverage {
    /// Create a moving average over `size` samples
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "window size must be > 0");
        Self {
            window: VecDeque::with_capacity(size),
            size,
        }
    }

    /// Add a value and get the smoothed output
    pub fn filter(&mut self, value: f64) -> f64 {
        if self.window.len() == self.size {
            self.window.pop_front();
        }
        self.window.push_back(value);
        self.window.iter().sum::<f64>() / self.window.len() as f64
    }

    /// Reset the window
    pub fn reset(&mut self) {
        self.window.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_window_averages_what_it_has() {
        let mut avg = MovingAverage::new(3);
        assert_eq!(avg.filter(1.0), 1.0);
        assert_eq!(avg.filter(3.0), 2.0);
    }

    #[test]
    fn test_full_window_drops_oldest() {
        let mut avg = MovingAverage::new(3);
        avg.filter(1.0);
        avg.filter(2.0);
        avg.filter(3.0);
        // Window is now [2, 3, 4]
        assert_eq!(avg.filter(4.0), 3.0);
    }

    #[test]
    fn test_window_of_one_is_pass_through() {
        let mut avg = MovingAverage::new(1);
        assert_eq!(avg.filter(0.10), 0.10);
        assert_eq!(avg.filter(0.20), 0.20);
    }

    #[test]
    fn test_reset() {
        let mut avg = MovingAverage::new(2);
        avg.filter(10.0);
        avg.reset();
        assert_eq!(avg.filter(4.0), 4.0);
    }
}
