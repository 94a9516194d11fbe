//! Host time adapter.
//!
//! Provides monotonic time queries for the control loop, wrapping
//! `std::time::Instant`.  All sim adapters take time as an explicit
//! `now_ms` argument, so this is the single place the wall clock is read.

/// Monotonic clock anchored at construction.
pub struct HostClock {
    start: std::time::Instant,
}

impl Default for HostClock {
    fn default() -> Self {
        Self::new()
    }
}

impl HostClock {
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since construction (monotonic).
    pub fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Microseconds since construction (monotonic, wraps at `u64::MAX`).
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}
