// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for detection timestamps
//!
//! Timestamps are microseconds since the Unix epoch, the resolution carried
//! by `TEMP` datagrams.

use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A clock that provides the current time in microseconds
pub trait Clock: Clone + Send + Sync {
    fn now_micros(&self) -> u64;
}

/// Real system clock
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_micros(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or(0)
    }
}

/// Fake clock for testing with controllable time
#[derive(Clone)]
pub struct FakeClock {
    current: Arc<Mutex<u64>>,
}

impl FakeClock {
    /// Start at the given microsecond timestamp
    pub fn at(micros: u64) -> Self {
        Self {
            current: Arc::new(Mutex::new(micros)),
        }
    }

    pub fn new() -> Self {
        Self::at(0)
    }

    /// Advance the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current += duration.as_micros() as u64;
    }

    /// Set the clock to a specific timestamp
    pub fn set(&self, micros: u64) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current = micros;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now_micros(&self) -> u64 {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
