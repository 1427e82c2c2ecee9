// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sliding detection window for the fire-detection unit
//!
//! Retains the timestamps (microseconds) of recent over-threshold readings.
//! Every retained timestamp satisfies `timestamp >= now - period`.

use std::collections::VecDeque;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DetectionWindow {
    period: u64,
    min_detections: usize,
    detections: VecDeque<u64>,
}

impl DetectionWindow {
    pub fn new(period: Duration, min_detections: usize) -> Self {
        Self {
            period: period.as_micros() as u64,
            min_detections: min_detections.max(1),
            detections: VecDeque::new(),
        }
    }

    /// Record a detection made at `detected_at`, evaluated at `now`.
    ///
    /// Entries older than `now - period` are evicted first. A detection that
    /// is itself already outside the window is not retained. Returns `true`
    /// when the retained count has reached `min_detections`.
    pub fn record(&mut self, detected_at: u64, now: u64) -> bool {
        let cutoff = now.saturating_sub(self.period);
        self.evict(cutoff);

        if detected_at >= cutoff {
            // Keep the deque ordered even if datagrams arrive out of order
            let at = self.detections.partition_point(|&t| t <= detected_at);
            self.detections.insert(at, detected_at);
        }

        self.detections.len() >= self.min_detections
    }

    /// Drop every detection older than `cutoff`
    fn evict(&mut self, cutoff: u64) {
        while self.detections.front().is_some_and(|&t| t < cutoff) {
            self.detections.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    pub fn min_detections(&self) -> usize {
        self.min_detections
    }

    /// Oldest retained detection
    pub fn oldest(&self) -> Option<u64> {
        self.detections.front().copied()
    }
}

#[cfg(test)]
#[path = "window_tests.rs"]
mod tests;
