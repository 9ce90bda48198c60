//! # Clock Abstraction for Test Determinism
//!
//! Transcript entries and generated reports are stamped with wall-clock
//! time and derive their identifiers from it. This module provides a
//! Clock trait with real and virtual implementations so that
//! time-dependent code can be tested deterministically.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

/// Clock trait for wall-clock time abstraction
pub trait Clock: Send + Sync {
    /// Get the current wall-clock time
    fn now(&self) -> DateTime<Utc>;
}

/// Real-time clock implementation
pub struct RealClock;

impl Default for RealClock {
    fn default() -> Self {
        Self::new()
    }
}

impl RealClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for RealClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Virtual clock for deterministic testing
pub struct TestClock {
    current_time: Mutex<DateTime<Utc>>,
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TestClock {
    pub fn new() -> Self {
        Self {
            current_time: Mutex::new(Utc::now()),
        }
    }

    pub fn new_with_start_time(start_time: DateTime<Utc>) -> Self {
        Self {
            current_time: Mutex::new(start_time),
        }
    }

    /// Advance the virtual clock by the specified duration
    pub fn advance(&self, duration: Duration) {
        let mut time = self.current_time.lock();
        *time += duration;
    }

    /// Set the virtual clock to a specific time
    pub fn set_time(&self, time: DateTime<Utc>) {
        let mut current = self.current_time.lock();
        *current = time;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current_time.lock()
    }
}

/// Thread-safe clock that can be shared across tasks
pub type SharedClock = Arc<dyn Clock + Send + Sync>;

/// Create a real-time clock
pub fn real_clock() -> SharedClock {
    Arc::new(RealClock::new())
}

/// Create a test clock
pub fn test_clock() -> SharedClock {
    Arc::new(TestClock::new())
}

/// Create a test clock with specific start time
pub fn test_clock_with_start(start_time: DateTime<Utc>) -> SharedClock {
    Arc::new(TestClock::new_with_start_time(start_time))
}
