//! Time gates for work that should not run every frame.
//!
//! Both are driven by the timestamps a frame callback receives, so they need
//! no timers of their own.

use crate::profiler::PerformanceConfig;

/// Lets an update through at most once per `interval_ms`.
#[derive(Clone, Debug, Default)]
pub struct Throttle {
    interval_ms: f64,
    last_ms: Option<f64>,
}

impl Throttle {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms: interval_ms.max(0.0),
            last_ms: None,
        }
    }

    pub fn from_config(config: &PerformanceConfig) -> Self {
        Self::new(config.throttle_ms)
    }

    /// Returns true (and records `now_ms`) when the interval has elapsed.
    pub fn ready(&mut self, now_ms: f64) -> bool {
        match self.last_ms {
            Some(last) if now_ms - last < self.interval_ms => false,
            _ => {
                self.last_ms = Some(now_ms);
                true
            }
        }
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }
}

/// Fires once after events stop arriving for `delay_ms`.
#[derive(Clone, Debug, Default)]
pub struct Debounce {
    delay_ms: f64,
    deadline_ms: Option<f64>,
}

impl Debounce {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms: delay_ms.max(0.0),
            deadline_ms: None,
        }
    }

    pub fn from_config(config: &PerformanceConfig) -> Self {
        Self::new(config.debounce_ms)
    }

    /// Records an event, pushing the deadline back.
    pub fn trigger(&mut self, now_ms: f64) {
        self.deadline_ms = Some(now_ms + self.delay_ms);
    }

    /// True exactly once when the quiet period has elapsed.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline_ms.is_some()
    }
}
