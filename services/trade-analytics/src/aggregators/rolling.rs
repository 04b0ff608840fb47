//! Rolling smoothing for charted series

use crate::error::AggregationError;
use std::collections::VecDeque;

/// Fixed-size trailing window using VecDeque for FIFO eviction
#[derive(Debug, Clone)]
pub struct RollingWindow {
    window: VecDeque<f64>,
    capacity: usize,
}

impl RollingWindow {
    /// Create new rolling window with fixed capacity
    pub fn new(capacity: usize) -> Result<Self, AggregationError> {
        if capacity == 0 {
            return Err(AggregationError::InvalidWindow { window: capacity });
        }

        Ok(Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Push a value, evicting the oldest once at capacity
    pub fn add(&mut self, value: f64) {
        if self.window.len() >= self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(value);
    }

    /// Mean of the window, `None` until it holds `capacity` values
    ///
    /// Summed fresh on every call so a window of one returns the value
    /// unchanged and no drift accumulates.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean(&self) -> Option<f64> {
        if !self.is_full() {
            return None;
        }
        Some(self.window.iter().sum::<f64>() / self.window.len() as f64)
    }

    /// Check if the window holds `capacity` values
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.window.len() == self.capacity
    }

    /// Get current window size
    #[must_use]
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// Check if window is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Clear the window
    pub fn clear(&mut self) {
        self.window.clear();
    }
}

/// Trailing rolling mean of `values`
///
/// The first `window - 1` points are undefined. A window of 1 returns the
/// input unchanged.
pub fn rolling_mean(values: &[f64], window: usize) -> Result<Vec<Option<f64>>, AggregationError> {
    let mut rolling = RollingWindow::new(window)?;

    Ok(values
        .iter()
        .map(|&value| {
            rolling.add(value);
            rolling.mean()
        })
        .collect())
}
