//! Timer utilities
//!
//! Provides timing helpers and the duration format used in reports.

use std::time::{Duration, Instant};

/// Simple timer for measuring elapsed time
#[derive(Debug)]
pub struct Timer {
    start: Instant,
    label: String,
}

impl Timer {
    /// Create and start a new timer
    pub fn start(label: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            label: label.into(),
        }
    }

    /// Get elapsed time
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop timer and return elapsed time
    pub fn stop(self) -> Duration {
        let elapsed = self.elapsed();
        tracing::debug!("{}: {}", self.label, format_duration(elapsed));
        elapsed
    }
}

/// Format a nanosecond count for display
///
/// Below one second the value is shown in milliseconds with two decimals,
/// otherwise in seconds with three decimals.
pub fn format_ns(nanos: u128) -> String {
    if nanos < 1_000_000_000 {
        format!("{:.2}ms", nanos as f64 / 1_000_000.0)
    } else {
        format!("{:.3}s", nanos as f64 / 1_000_000_000.0)
    }
}

/// Format a [`Duration`] with [`format_ns`]
pub fn format_duration(duration: Duration) -> String {
    format_ns(duration.as_nanos())
}
